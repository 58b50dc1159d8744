//! Package installer orchestrating the full workflow.
//!
//! For each requested reference:
//! 1. Parse the shorthand (all inputs, before any network access)
//! 2. Fetch a working copy into its own scratch directory
//! 3. Read the package manifest
//! 4. Warn when the installed version is newer
//! 5. Build a source archive
//! 6. Stage the archive in a temporary repository
//!
//! Then, once for the whole request:
//! 7. Optionally uninstall the existing packages
//! 8. Unload loaded packages
//! 9. Install everything in one batched call
//! 10. Read back installed versions
//! 11. Reload what was unloaded
//!
//! Scratch directories and the staging repository are removed on every
//! exit path.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::warn;

use crate::builder::PackageBuilder;
use crate::fetcher::SourceFetcher;
use crate::package::PackageDescription;
use crate::reference::Reference;
use crate::repository::StagingRepository;
use crate::runtime::{InstallRequest, PackageRuntime};

use super::config::InstallOptions;
use super::error::{InstallError, InstallResult};
use super::report::{InstallReport, InstallWarning, InstalledVersion};

/// Prefix of per-reference scratch directories.
const SCRATCH_DIR_PREFIX: &str = "ghinstall-src-";

/// Log at `info` when verbose, `debug` otherwise.
macro_rules! note {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+)
        } else {
            tracing::debug!($($arg)+)
        }
    };
}

/// Progress callback for installation operations.
///
/// # Arguments
///
/// * `stage` - Current installation stage
/// * `message` - Human-readable message
pub type InstallProgressCallback = Box<dyn Fn(InstallStage, &str) + Send + Sync>;

/// Installation stages for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    /// Parsing references.
    Parsing,
    /// Fetching a working copy.
    Fetching,
    /// Building a source archive.
    Building,
    /// Adding an archive to the staging repository.
    Staging,
    /// Removing existing installs.
    Uninstalling,
    /// Running the batched install.
    Installing,
    /// Loading unloaded packages again.
    Reloading,
    /// Installation complete.
    Complete,
}

impl InstallStage {
    /// Get a human-readable name for the stage.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Parsing => "Parsing",
            Self::Fetching => "Fetching",
            Self::Building => "Building",
            Self::Staging => "Staging",
            Self::Uninstalling => "Uninstalling",
            Self::Installing => "Installing",
            Self::Reloading => "Reloading",
            Self::Complete => "Complete",
        }
    }
}

/// Package installer.
///
/// Generic over its three collaborators so each can be replaced: the
/// fetcher producing working copies, the builder producing archives and
/// the host runtime doing the actual install.
pub struct PackageInstaller<F, B, R> {
    fetcher: F,
    builder: B,
    runtime: R,
}

impl<F, B, R> PackageInstaller<F, B, R>
where
    F: SourceFetcher,
    B: PackageBuilder,
    R: PackageRuntime,
{
    pub fn new(fetcher: F, builder: B, runtime: R) -> Self {
        Self {
            fetcher,
            builder,
            runtime,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Install packages from a list of shorthand references.
    ///
    /// # Returns
    ///
    /// The installed version of every requested package, in request order,
    /// plus any non-fatal warnings.
    pub fn install<S: AsRef<str>>(
        &self,
        refs: &[S],
        options: &InstallOptions,
    ) -> InstallResult<InstallReport> {
        self.install_with_progress(refs, options, None)
    }

    /// Same as [`install`](Self::install), reporting each stage.
    pub fn install_with_progress<S: AsRef<str>>(
        &self,
        refs: &[S],
        options: &InstallOptions,
        on_progress: Option<InstallProgressCallback>,
    ) -> InstallResult<InstallReport> {
        let report_stage = |stage: InstallStage, message: &str| {
            if let Some(ref cb) = on_progress {
                cb(stage, message);
            }
        };
        let verbose = options.verbose;

        // Stage 1: Parse everything up front
        report_stage(InstallStage::Parsing, "Parsing references...");
        let references = parse_references(refs, &options.host)?;
        if references.is_empty() {
            return Err(InstallError::NoReferences);
        }

        fs::create_dir_all(&options.temp_dir).map_err(|e| InstallError::CreateDirFailed {
            path: options.temp_dir.clone(),
            source: e,
        })?;
        let mut staging = StagingRepository::create_in(&options.temp_dir)?;
        note!(verbose, repo = %staging.url(), "Created staging repository");

        let build_args = options.effective_build_args();
        let mut report = InstallReport::default();
        let mut names: Vec<String> = Vec::new();
        let mut origins: HashMap<String, Vec<String>> = HashMap::new();

        // Stages 2-6: Fetch, build and stage each reference
        for (input, reference) in &references {
            let name = self.stage_reference(
                input,
                reference,
                options,
                &build_args,
                &mut staging,
                &mut report.warnings,
                &report_stage,
            )?;

            let sources = origins.entry(name.clone()).or_default();
            sources.push(input.clone());
            if sources.len() == 1 {
                names.push(name);
            } else {
                warn!(
                    package = %name,
                    references = ?sources,
                    "Several references provide the same package; using the last one"
                );
                report.warnings.push(InstallWarning::DuplicatePackage {
                    package: name,
                    references: sources.clone(),
                });
            }
        }

        let library = options.library.as_deref();

        // Stage 7: Uninstall existing packages
        if options.uninstall_first {
            report_stage(InstallStage::Uninstalling, "Removing existing installs...");
            for name in &names {
                if let Err(e) = self.runtime.uninstall(name, library) {
                    note!(verbose, package = %name, error = %e, "Uninstall failed, continuing");
                    report.warnings.push(InstallWarning::UninstallFailed {
                        package: name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        // Stage 8: Unload loaded packages
        let mut unloaded = Vec::new();
        for name in &names {
            if !self.runtime.is_loaded(name) {
                continue;
            }
            match self.runtime.unload(name) {
                Ok(()) => {
                    note!(verbose, package = %name, "Unloaded package");
                    unloaded.push(name.clone());
                }
                Err(e) => {
                    warn!(package = %name, error = %e, "Failed to unload package");
                    report.warnings.push(InstallWarning::UnloadFailed {
                        package: name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        // Stage 9: One batched install
        let mut repos = vec![staging.url()];
        repos.extend(options.resolve_sources());
        let request = InstallRequest {
            packages: names.clone(),
            repos,
            library: options.library.clone(),
            dependencies: options.dependencies.clone(),
            install_type: options.install_type.clone(),
            extra_options: options.install_options.clone(),
        };
        report_stage(
            InstallStage::Installing,
            &format!("Installing {}...", names.join(", ")),
        );
        note!(verbose, packages = ?request.packages, repos = ?request.repos, "Installing");
        let outcome = self.runtime.install_batch(&request);

        // Stage 10: Read back installed versions
        if outcome.is_ok() {
            report.installed = names
                .iter()
                .map(|name| InstalledVersion {
                    name: name.clone(),
                    version: self.runtime.installed_version(name, library),
                })
                .collect();
        }

        // Stage 11: Reload, even after a failed install
        if !unloaded.is_empty() {
            report_stage(InstallStage::Reloading, "Reloading packages...");
        }
        for name in &unloaded {
            if let Err(e) = self.runtime.reload(name) {
                warn!(package = %name, error = %e, "Failed to reload package");
                report.warnings.push(InstallWarning::ReloadFailed {
                    package: name.clone(),
                    reason: e.to_string(),
                });
            }
        }

        outcome.map_err(InstallError::InstallFailed)?;

        if let Err(e) = staging.close() {
            warn!(error = %e, "Failed to remove staging repository");
        }

        report_stage(InstallStage::Complete, "Installation complete");
        Ok(report)
    }

    /// Fetch, build and stage one reference, returning its package name.
    #[allow(clippy::too_many_arguments)]
    fn stage_reference(
        &self,
        input: &str,
        reference: &Reference,
        options: &InstallOptions,
        build_args: &[String],
        staging: &mut StagingRepository,
        warnings: &mut Vec<InstallWarning>,
        report_stage: &dyn Fn(InstallStage, &str),
    ) -> InstallResult<String> {
        let verbose = options.verbose;
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_DIR_PREFIX)
            .tempdir_in(&options.temp_dir)
            .map_err(|e| InstallError::CreateDirFailed {
                path: options.temp_dir.clone(),
                source: e,
            })?;

        // Fetch
        report_stage(InstallStage::Fetching, &format!("Fetching {}...", input));
        let working_copy = self
            .fetcher
            .fetch(reference, &scratch.path().join("source"))
            .map_err(|e| InstallError::FetchFailed {
                reference: input.to_string(),
                source: e,
            })?;
        note!(
            verbose,
            reference = %reference,
            commit = working_copy.short_commit(),
            "Fetched working copy"
        );

        // Manifest
        let package_dir = match &reference.subdir {
            Some(subdir) => working_copy.path.join(subdir),
            None => working_copy.path.clone(),
        };
        let description = read_manifest(input, reference, &package_dir)?;

        // Version check
        if let Some(installed) = self
            .runtime
            .installed_version(description.name(), options.library.as_deref())
        {
            if installed > *description.version() {
                warn!(
                    package = description.name(),
                    installed = %installed,
                    fetched = %description.version(),
                    "Installed version is newer than the one being installed"
                );
                warnings.push(InstallWarning::VersionRegression {
                    package: description.name().to_string(),
                    installed,
                    fetched: description.version().clone(),
                });
            }
        }

        // Build
        report_stage(
            InstallStage::Building,
            &format!("Building {}...", description),
        );
        let out_dir = scratch.path().join("build");
        fs::create_dir_all(&out_dir).map_err(|e| InstallError::CreateDirFailed {
            path: out_dir.clone(),
            source: e,
        })?;
        let archive = self
            .builder
            .build(&package_dir, &description, &out_dir, build_args)
            .map_err(|e| InstallError::BuildFailed {
                reference: input.to_string(),
                source: e,
            })?;

        // Stage
        report_stage(InstallStage::Staging, &format!("Staging {}...", description));
        let staged = staging.insert(&archive, &description)?;
        note!(verbose, archive = %staged.display(), "Staged archive");

        Ok(description.name().to_string())
    }
}

/// Parse every unique input, applying the configured host.
///
/// The first invalid input aborts the whole request.
fn parse_references<S: AsRef<str>>(
    refs: &[S],
    host: &str,
) -> InstallResult<Vec<(String, Reference)>> {
    let mut parsed: Vec<(String, Reference)> = Vec::with_capacity(refs.len());
    for input in refs {
        let input = input.as_ref().trim();
        if parsed.iter().any(|(seen, _)| seen == input) {
            continue;
        }
        let reference = Reference::parse(input)?.with_host(host);
        parsed.push((input.to_string(), reference));
    }
    Ok(parsed)
}

/// Read the manifest at the package root of a working copy.
fn read_manifest(
    input: &str,
    reference: &Reference,
    package_dir: &Path,
) -> InstallResult<PackageDescription> {
    if !package_dir.is_dir() {
        return Err(InstallError::ManifestFailed {
            reference: input.to_string(),
            reason: format!(
                "subdirectory '{}' not found",
                reference.subdir.as_deref().unwrap_or_default()
            ),
        });
    }
    PackageDescription::read_from_dir(package_dir).map_err(|e| InstallError::ManifestFailed {
        reference: input.to_string(),
        reason: e.to_string(),
    })
}
