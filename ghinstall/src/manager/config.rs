//! Options for an install call.

use std::path::PathBuf;

use crate::builder::effective_build_args;
use crate::reference::DEFAULT_HOST;
use crate::runtime::DependencyKind;

/// Mirror used when no package sources are configured.
pub const DEFAULT_CRAN_URL: &str = "https://cloud.r-project.org";

/// Placeholder the host uses for "the configured CRAN mirror".
pub const CRAN_PLACEHOLDER: &str = "@CRAN@";

/// Options for [`PackageInstaller::install`](super::PackageInstaller::install).
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Hosting service the references point at.
    pub host: String,

    /// Extra flags for the archive build tool.
    pub build_args: Vec<String>,

    /// Whether to build vignettes and other documentation.
    pub build_docs: bool,

    /// Remove existing installs before installing.
    pub uninstall_first: bool,

    /// Promote progress messages from `debug` to `info`.
    pub verbose: bool,

    /// Package repositories searched after the staging repository.
    ///
    /// Empty means the default CRAN mirror.
    pub package_sources: Vec<String>,

    /// Dependency categories installed along with each package.
    pub dependencies: Vec<DependencyKind>,

    /// Installer `type` argument (`source`, `binary`, ...).
    pub install_type: Option<String>,

    /// Extra `key = value` arguments passed verbatim to the installer.
    pub install_options: Vec<String>,

    /// Target library, or the host default when `None`.
    pub library: Option<PathBuf>,

    /// Parent directory for working copies and the staging repository.
    pub temp_dir: PathBuf,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            build_args: Vec::new(),
            build_docs: true,
            uninstall_first: false,
            verbose: false,
            package_sources: Vec::new(),
            dependencies: DependencyKind::defaults(),
            install_type: None,
            install_options: Vec::new(),
            library: None,
            temp_dir: std::env::temp_dir(),
        }
    }
}

impl InstallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hosting service.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the build tool flags.
    pub fn with_build_args(mut self, args: Vec<String>) -> Self {
        self.build_args = args;
        self
    }

    /// Enable or disable documentation builds.
    pub fn with_build_docs(mut self, build_docs: bool) -> Self {
        self.build_docs = build_docs;
        self
    }

    pub fn with_uninstall_first(mut self, uninstall_first: bool) -> Self {
        self.uninstall_first = uninstall_first;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Add a package source after the ones already configured.
    pub fn with_package_source(mut self, url: impl Into<String>) -> Self {
        self.package_sources.push(url.into());
        self
    }

    /// Set the dependency categories to install.
    pub fn with_dependencies(mut self, kinds: Vec<DependencyKind>) -> Self {
        self.dependencies = kinds;
        self
    }

    pub fn with_install_type(mut self, install_type: impl Into<String>) -> Self {
        self.install_type = Some(install_type.into());
        self
    }

    /// Add a verbatim installer argument.
    pub fn with_install_option(mut self, option: impl Into<String>) -> Self {
        self.install_options.push(option.into());
        self
    }

    /// Set the target library.
    pub fn with_library(mut self, library: impl Into<PathBuf>) -> Self {
        self.library = Some(library.into());
        self
    }

    /// Set the parent directory for scratch space.
    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// Build tool flags after applying `build_docs`.
    pub fn effective_build_args(&self) -> Vec<String> {
        effective_build_args(&self.build_args, self.build_docs)
    }

    /// Package sources with `@CRAN@` resolved and the default applied.
    pub fn resolve_sources(&self) -> Vec<String> {
        let sources: Vec<String> = self
            .package_sources
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == CRAN_PLACEHOLDER {
                    DEFAULT_CRAN_URL.to_string()
                } else {
                    s.to_string()
                }
            })
            .collect();

        if sources.is_empty() {
            vec![DEFAULT_CRAN_URL.to_string()]
        } else {
            sources
        }
    }
}
