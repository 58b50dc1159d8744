//! Integration tests for the installer workflow.
//!
//! These tests drive `PackageInstaller` end to end with in-memory
//! collaborators standing in for git, the build tool and the host runtime:
//! - references reach the fetcher with the right selector
//! - archives are staged and indexed before the batched install
//! - uninstall/unload/reload ordering and warnings
//! - scratch directories are gone afterwards
//!
//! Run with: `cargo test --test install_integration`

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use ghinstall::builder::{BuildError, BuildResult, PackageBuilder, NO_BUILD_DOCS_FLAG};
use ghinstall::fetcher::{FetchError, FetchResult, SourceFetcher, WorkingCopy};
use ghinstall::manager::{
    InstallError, InstallOptions, InstallStage, InstallWarning, PackageInstaller, DEFAULT_CRAN_URL,
};
use ghinstall::package::{archive_filename, PackageDescription, PackageVersion};
use ghinstall::reference::{Reference, RevisionSelector};
use ghinstall::repository::{read_index, CONTRIB_PATH, INDEX_FILENAME};
use ghinstall::runtime::{InstallRequest, PackageRuntime, RuntimeError, RuntimeResult};

// ============================================================================
// Stub Collaborators
// ============================================================================

/// Fetcher serving canned manifests keyed by `owner/name`.
#[derive(Default)]
struct StubFetcher {
    packages: HashMap<String, (String, String)>,
    calls: RefCell<Vec<Reference>>,
}

impl StubFetcher {
    fn with(mut self, slug: &str, name: &str, version: &str) -> Self {
        self.packages
            .insert(slug.to_string(), (name.to_string(), version.to_string()));
        self
    }
}

impl SourceFetcher for StubFetcher {
    fn fetch(&self, reference: &Reference, dest: &Path) -> FetchResult<WorkingCopy> {
        self.calls.borrow_mut().push(reference.clone());
        let (name, version) = self
            .packages
            .get(&reference.slug())
            .ok_or_else(|| FetchError::Other(format!("no such repo {}", reference.slug())))?;

        let package_dir = match &reference.subdir {
            Some(subdir) => dest.join(subdir),
            None => dest.to_path_buf(),
        };
        fs::create_dir_all(&package_dir).map_err(|e| FetchError::Io {
            path: package_dir.clone(),
            source: e,
        })?;
        fs::write(
            package_dir.join("DESCRIPTION"),
            format!("Package: {}\nVersion: {}\nTitle: Stub\n", name, version),
        )
        .map_err(|e| FetchError::Io {
            path: package_dir.clone(),
            source: e,
        })?;

        Ok(WorkingCopy::new(dest, "0123456789abcdef"))
    }
}

/// Builder writing a placeholder archive and recording its arguments.
#[derive(Default)]
struct StubBuilder {
    fail_for: Option<String>,
    args_seen: RefCell<Vec<Vec<String>>>,
}

impl PackageBuilder for StubBuilder {
    fn build(
        &self,
        _package_dir: &Path,
        description: &PackageDescription,
        out_dir: &Path,
        build_args: &[String],
    ) -> BuildResult<PathBuf> {
        self.args_seen.borrow_mut().push(build_args.to_vec());
        if self.fail_for.as_deref() == Some(description.name()) {
            return Err(BuildError::Failed {
                status: "exit status: 1".to_string(),
                output: "ERROR: stub build failure".to_string(),
            });
        }
        let archive = out_dir.join(archive_filename(description.name(), description.version()));
        fs::write(&archive, description.to_string()).map_err(|e| BuildError::Io {
            path: archive.clone(),
            source: e,
        })?;
        Ok(archive)
    }
}

/// Host runtime keeping installed and loaded packages in memory.
#[derive(Default)]
struct StubRuntime {
    installed: RefCell<HashMap<String, PackageVersion>>,
    loaded: RefCell<HashSet<String>>,
    events: RefCell<Vec<String>>,
    requests: RefCell<Vec<InstallRequest>>,
    index_at_install: RefCell<Vec<(String, PackageVersion)>>,
    fail_install: bool,
    fail_uninstall: bool,
}

impl StubRuntime {
    fn with_installed(self, name: &str, version: &str) -> Self {
        self.installed
            .borrow_mut()
            .insert(name.to_string(), version.parse().unwrap());
        self
    }

    fn with_loaded(self, name: &str) -> Self {
        self.loaded.borrow_mut().insert(name.to_string());
        self
    }

    fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

impl PackageRuntime for StubRuntime {
    fn installed_version(&self, name: &str, _library: Option<&Path>) -> Option<PackageVersion> {
        self.installed.borrow().get(name).cloned()
    }

    fn is_loaded(&self, name: &str) -> bool {
        self.loaded.borrow().contains(name)
    }

    fn unload(&self, name: &str) -> RuntimeResult<()> {
        self.events.borrow_mut().push(format!("unload:{}", name));
        self.loaded.borrow_mut().remove(name);
        Ok(())
    }

    fn reload(&self, name: &str) -> RuntimeResult<()> {
        self.events.borrow_mut().push(format!("reload:{}", name));
        self.loaded.borrow_mut().insert(name.to_string());
        Ok(())
    }

    fn uninstall(&self, name: &str, _library: Option<&Path>) -> RuntimeResult<()> {
        self.events.borrow_mut().push(format!("uninstall:{}", name));
        if self.fail_uninstall {
            return Err(RuntimeError::Other(format!("{} is not installed", name)));
        }
        self.installed.borrow_mut().remove(name);
        Ok(())
    }

    fn install_batch(&self, request: &InstallRequest) -> RuntimeResult<()> {
        self.events
            .borrow_mut()
            .push(format!("install:{}", request.packages.join(",")));
        self.requests.borrow_mut().push(request.clone());

        let root = request.repos[0].trim_start_matches("file://");
        let contrib = Path::new(root).join(CONTRIB_PATH);
        let index = fs::read_to_string(contrib.join(INDEX_FILENAME))
            .map_err(|e| RuntimeError::Other(e.to_string()))?;
        let entries = read_index(&index);
        *self.index_at_install.borrow_mut() = entries.clone();

        if self.fail_install {
            return Err(RuntimeError::Other("install.packages failed".to_string()));
        }

        for (name, version) in entries {
            assert!(contrib.join(archive_filename(&name, &version)).is_file());
            self.installed.borrow_mut().insert(name, version);
        }
        Ok(())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn options(temp: &TempDir) -> InstallOptions {
    InstallOptions::new().with_temp_dir(temp.path())
}

fn version(s: &str) -> PackageVersion {
    s.parse().unwrap()
}

fn assert_scratch_removed(temp: &TempDir) {
    let leftovers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert!(leftovers.is_empty(), "leftover scratch entries: {:?}", leftovers);
}

// ============================================================================
// Basic Flow
// ============================================================================

#[test]
fn test_single_reference_installs_and_reports_version() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default().with("org/pkg", "pkg", "1.0.0");
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default();

    let report = PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/pkg"], &options(&temp))
        .unwrap();

    assert_eq!(report.installed.len(), 1);
    assert_eq!(report.version_of("pkg"), Some(&version("1.0.0")));
    assert!(report.warnings.is_empty());
    assert_eq!(runtime.events(), vec!["install:pkg"]);
}

#[test]
fn test_revision_reaches_fetcher() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default().with("org/pkg", "pkg", "1.0.0");
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default();

    PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/pkg@deadbeef"], &options(&temp))
        .unwrap();

    let calls = fetcher.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].selector,
        Some(RevisionSelector::Revision("deadbeef".to_string()))
    );
    assert_eq!(calls[0].host, "github.com");
}

#[test]
fn test_host_option_applies_to_references() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default().with("org/pkg", "pkg", "1.0.0");
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default();

    PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/pkg"], &options(&temp).with_host("git.example.com"))
        .unwrap();

    assert_eq!(
        fetcher.calls.borrow()[0].clone_url(),
        "https://git.example.com/org/pkg.git"
    );
}

#[test]
fn test_staged_index_lists_every_package_at_install_time() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default()
        .with("org/a", "a", "1.0")
        .with("org/b", "b", "0.2-1");
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default();

    let report = PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/a", "org/b"], &options(&temp))
        .unwrap();

    assert_eq!(
        *runtime.index_at_install.borrow(),
        vec![
            ("a".to_string(), version("1.0")),
            ("b".to_string(), version("0.2-1")),
        ]
    );
    assert_eq!(report.names().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(runtime.events(), vec!["install:a,b"]);
}

#[test]
fn test_install_request_sources_and_passthrough() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default().with("org/pkg", "pkg", "1.0.0");
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default();

    let opts = options(&temp)
        .with_package_source("@CRAN@")
        .with_package_source("https://r.example.org")
        .with_install_type("source")
        .with_install_option("quiet = TRUE")
        .with_library(temp.path().join("lib"));

    PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/pkg"], &opts)
        .unwrap();

    let requests = runtime.requests.borrow();
    let request = &requests[0];
    assert!(request.repos[0].starts_with("file://"));
    assert_eq!(
        &request.repos[1..],
        &[
            DEFAULT_CRAN_URL.to_string(),
            "https://r.example.org".to_string()
        ]
    );
    assert_eq!(request.install_type.as_deref(), Some("source"));
    assert_eq!(request.extra_options, vec!["quiet = TRUE"]);
    assert_eq!(request.library, Some(temp.path().join("lib")));
}

#[test]
fn test_default_sources_fall_back_to_cran() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default().with("org/pkg", "pkg", "1.0.0");
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default();

    PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/pkg"], &options(&temp))
        .unwrap();

    let requests = runtime.requests.borrow();
    assert_eq!(requests[0].repos.len(), 2);
    assert_eq!(requests[0].repos[1], DEFAULT_CRAN_URL);
}

#[test]
fn test_build_docs_disabled_adds_flag() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default().with("org/pkg", "pkg", "1.0.0");
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default();

    let opts = options(&temp)
        .with_build_args(vec!["--no-manual".to_string()])
        .with_build_docs(false);
    PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/pkg"], &opts)
        .unwrap();

    assert_eq!(
        builder.args_seen.borrow()[0],
        vec!["--no-manual".to_string(), NO_BUILD_DOCS_FLAG.to_string()]
    );
}

#[test]
fn test_subdirectory_is_package_root() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default().with("org/mono", "inner", "3.0");
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default();

    let report = PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/mono/pkgs/inner"], &options(&temp))
        .unwrap();

    assert_eq!(report.version_of("inner"), Some(&version("3.0")));
}

#[test]
fn test_progress_stages_in_order() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default().with("org/pkg", "pkg", "1.0.0");
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default();

    let stages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&stages);

    PackageInstaller::new(&fetcher, &builder, &runtime)
        .install_with_progress(
            &["org/pkg"],
            &options(&temp),
            Some(Box::new(move |stage: InstallStage, _message: &str| {
                sink.lock().unwrap().push(stage);
            })),
        )
        .unwrap();

    assert_eq!(
        *stages.lock().unwrap(),
        vec![
            InstallStage::Parsing,
            InstallStage::Fetching,
            InstallStage::Building,
            InstallStage::Staging,
            InstallStage::Installing,
            InstallStage::Complete,
        ]
    );
}

// ============================================================================
// Duplicates
// ============================================================================

#[test]
fn test_duplicate_inputs_processed_once() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default().with("org/pkg", "pkg", "1.0.0");
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default();

    let report = PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/pkg", "org/pkg"], &options(&temp))
        .unwrap();

    assert_eq!(fetcher.calls.borrow().len(), 1);
    assert_eq!(report.installed.len(), 1);
    assert_eq!(runtime.requests.borrow()[0].packages, vec!["pkg"]);
    assert!(report.warnings.is_empty());
}

#[test]
fn test_two_references_same_package_last_wins() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default()
        .with("org/pkg", "pkg", "1.0.0")
        .with("fork/pkg", "pkg", "1.1.0");
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default();

    let report = PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/pkg", "fork/pkg"], &options(&temp))
        .unwrap();

    assert_eq!(runtime.requests.borrow()[0].packages, vec!["pkg"]);
    assert_eq!(
        *runtime.index_at_install.borrow(),
        vec![("pkg".to_string(), version("1.1.0"))]
    );
    assert_eq!(report.version_of("pkg"), Some(&version("1.1.0")));
    assert_eq!(
        report.warnings,
        vec![InstallWarning::DuplicatePackage {
            package: "pkg".to_string(),
            references: vec!["org/pkg".to_string(), "fork/pkg".to_string()],
        }]
    );
}

// ============================================================================
// Existing Installs
// ============================================================================

#[test]
fn test_version_regression_warns_and_still_installs() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default().with("org/pkg", "pkg", "1.0.0");
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default().with_installed("pkg", "2.0.0");

    let report = PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/pkg"], &options(&temp))
        .unwrap();

    assert_eq!(
        report.warnings,
        vec![InstallWarning::VersionRegression {
            package: "pkg".to_string(),
            installed: version("2.0.0"),
            fetched: version("1.0.0"),
        }]
    );
    assert_eq!(runtime.events(), vec!["install:pkg"]);
    assert_eq!(report.version_of("pkg"), Some(&version("1.0.0")));
}

#[test]
fn test_same_or_older_installed_version_does_not_warn() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default().with("org/pkg", "pkg", "1.0.0");
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default().with_installed("pkg", "1.0");

    let report = PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/pkg"], &options(&temp))
        .unwrap();

    assert!(report.warnings.is_empty());
}

#[test]
fn test_uninstall_first_runs_before_install() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default().with("org/pkg", "pkg", "1.0.0");
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default().with_installed("pkg", "0.9");

    PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/pkg"], &options(&temp).with_uninstall_first(true))
        .unwrap();

    assert_eq!(runtime.events(), vec!["uninstall:pkg", "install:pkg"]);
}

#[test]
fn test_uninstall_failure_is_not_fatal() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default().with("org/pkg", "pkg", "1.0.0");
    let builder = StubBuilder::default();
    let runtime = StubRuntime {
        fail_uninstall: true,
        ..Default::default()
    };

    let report = PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/pkg"], &options(&temp).with_uninstall_first(true))
        .unwrap();

    assert!(matches!(
        report.warnings.as_slice(),
        [InstallWarning::UninstallFailed { package, .. }] if package == "pkg"
    ));
    assert_eq!(report.version_of("pkg"), Some(&version("1.0.0")));
}

#[test]
fn test_loaded_package_unloaded_and_reloaded() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default()
        .with("org/pkg", "pkg", "1.0.0")
        .with("org/other", "other", "1.0.0");
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default().with_loaded("pkg");

    PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/pkg", "org/other"], &options(&temp))
        .unwrap();

    assert_eq!(
        runtime.events(),
        vec!["unload:pkg", "install:pkg,other", "reload:pkg"]
    );
}

#[test]
fn test_reload_attempted_after_failed_install() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default().with("org/pkg", "pkg", "1.0.0");
    let builder = StubBuilder::default();
    let runtime = StubRuntime {
        fail_install: true,
        ..Default::default()
    }
    .with_loaded("pkg");

    let err = PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/pkg"], &options(&temp))
        .unwrap_err();

    assert!(matches!(err, InstallError::InstallFailed(_)));
    assert_eq!(runtime.events(), vec!["unload:pkg", "install:pkg", "reload:pkg"]);
    assert_scratch_removed(&temp);
}

// ============================================================================
// Failures and Cleanup
// ============================================================================

#[test]
fn test_scratch_directories_removed_after_success() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default()
        .with("org/a", "a", "1.0")
        .with("org/b", "b", "1.0");
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default();

    PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/a", "org/b#7"], &options(&temp))
        .unwrap();

    assert_scratch_removed(&temp);
}

#[test]
fn test_invalid_reference_aborts_before_fetching() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default().with("org/pkg", "pkg", "1.0.0");
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default();

    let err = PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/pkg", "missinguser"], &options(&temp))
        .unwrap_err();

    assert!(matches!(err, InstallError::InvalidReference(_)));
    assert!(err.to_string().contains("missinguser"));
    assert!(fetcher.calls.borrow().is_empty());
    assert!(runtime.events().is_empty());
    assert_scratch_removed(&temp);
}

#[test]
fn test_fetch_failure_names_reference() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default();
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default();

    let err = PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/unknown"], &options(&temp))
        .unwrap_err();

    match err {
        InstallError::FetchFailed { reference, .. } => assert_eq!(reference, "org/unknown"),
        other => panic!("unexpected error: {}", other),
    }
    assert!(runtime.events().is_empty());
    assert_scratch_removed(&temp);
}

#[test]
fn test_build_failure_aborts_and_cleans_up() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default()
        .with("org/a", "a", "1.0")
        .with("org/b", "b", "1.0");
    let builder = StubBuilder {
        fail_for: Some("b".to_string()),
        ..Default::default()
    };
    let runtime = StubRuntime::default();

    let err = PackageInstaller::new(&fetcher, &builder, &runtime)
        .install(&["org/a", "org/b"], &options(&temp))
        .unwrap_err();

    assert!(matches!(err, InstallError::BuildFailed { ref reference, .. } if reference == "org/b"));
    assert!(runtime.events().is_empty());
    assert_scratch_removed(&temp);
}

#[test]
fn test_missing_subdirectory_is_manifest_error() {
    let temp = TempDir::new().unwrap();
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default();

    struct EmptyFetcher;
    impl SourceFetcher for EmptyFetcher {
        fn fetch(&self, _reference: &Reference, dest: &Path) -> FetchResult<WorkingCopy> {
            fs::create_dir_all(dest).unwrap();
            Ok(WorkingCopy::new(dest, "abc"))
        }
    }

    let err = PackageInstaller::new(EmptyFetcher, &builder, &runtime)
        .install(&["org/pkg/missing"], &options(&temp))
        .unwrap_err();

    assert!(matches!(err, InstallError::ManifestFailed { .. }));
    assert!(err.to_string().contains("missing"));
    assert_scratch_removed(&temp);
}

#[test]
fn test_no_references() {
    let temp = TempDir::new().unwrap();
    let fetcher = StubFetcher::default();
    let builder = StubBuilder::default();
    let runtime = StubRuntime::default();

    let err = PackageInstaller::new(&fetcher, &builder, &runtime)
        .install::<&str>(&[], &options(&temp))
        .unwrap_err();

    assert!(matches!(err, InstallError::NoReferences));
}
