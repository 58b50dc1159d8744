//! Command implementations.

pub mod common;
pub mod config;
pub mod init;
pub mod install;
pub mod parse;
