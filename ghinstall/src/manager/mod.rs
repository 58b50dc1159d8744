//! Installer orchestration.
//!
//! Ties the other modules together: references are parsed, fetched,
//! built and staged one by one, then installed in a single batched call
//! through the host runtime.
//!
//! # Example
//!
//! ```ignore
//! use ghinstall::builder::RCmdBuilder;
//! use ghinstall::fetcher::{Credentials, GitFetcher};
//! use ghinstall::manager::{InstallOptions, PackageInstaller};
//! use ghinstall::runtime::RscriptRuntime;
//!
//! let installer = PackageInstaller::new(
//!     GitFetcher::new(Credentials::from_token(std::env::var("GITHUB_PAT").ok())),
//!     RCmdBuilder::new(),
//!     RscriptRuntime::new(),
//! );
//!
//! let report = installer.install(&["r-lib/rlang@v1.1.0"], &InstallOptions::default())?;
//! for entry in &report.installed {
//!     println!("{} {:?}", entry.name, entry.version);
//! }
//! ```

mod config;
mod error;
mod installer;
mod report;

pub use config::{InstallOptions, CRAN_PLACEHOLDER, DEFAULT_CRAN_URL};
pub use error::{InstallError, InstallResult};
pub use installer::{InstallProgressCallback, InstallStage, PackageInstaller};
pub use report::{InstallReport, InstallWarning, InstalledVersion};
