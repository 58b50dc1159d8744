//! ghinstall - install R packages straight from GitHub repositories
//!
//! This library clones repositories named by a shorthand such as
//! `owner/repo[branch]@rev#pr/subdir`, builds a source archive from each,
//! stages the archives in a temporary package repository and installs them
//! all with a single call to the host's own installer, so declared
//! dependencies resolve across the staged archives and the user's regular
//! package sources.

pub mod builder;
pub mod config;
pub mod fetcher;
pub mod logging;
pub mod manager;
pub mod package;
pub mod reference;
pub mod repository;
pub mod runtime;
