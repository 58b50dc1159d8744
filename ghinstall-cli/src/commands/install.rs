//! Install command - fetch, build and install packages.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{json, Map, Value};

use ghinstall::builder::RCmdBuilder;
use ghinstall::fetcher::GitFetcher;
use ghinstall::manager::{
    InstallProgressCallback, InstallReport, InstallStage, InstallWarning, PackageInstaller,
};
use ghinstall::runtime::RscriptRuntime;

use super::common::{load_config, resolve_credentials, resolve_install_options};
use crate::error::CliError;
use crate::InstallArgs;

/// Run the install command.
pub fn run(args: InstallArgs) -> Result<(), CliError> {
    let config = load_config();
    let options = resolve_install_options(&args, &config)?;
    let credentials = resolve_credentials(args.token.clone(), &options.host, &config);

    let builder = RCmdBuilder::new();
    if let Err(e) = builder.check_available() {
        return Err(CliError::Config(format!(
            "{}. The R toolchain is required to build packages.",
            e
        )));
    }

    let installer = PackageInstaller::new(
        GitFetcher::new(credentials),
        builder,
        RscriptRuntime::new(),
    );

    // Spinner only when logs are not already showing progress
    let spinner = if args.verbose || args.json {
        None
    } else {
        Some(stage_spinner())
    };
    let on_progress: Option<InstallProgressCallback> = spinner.clone().map(|pb| {
        Box::new(move |stage: InstallStage, message: &str| {
            pb.set_prefix(stage.name());
            pb.set_message(message.to_string());
        }) as InstallProgressCallback
    });

    let result = installer.install_with_progress(&args.refs, &options, on_progress);

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let report = result?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report_json(&report, args.verbose))?
        );
    } else {
        for line in report_lines(&report) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn stage_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.cyan} {prefix:.bold} {msg}")
    {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Warnings included in `--json` output.
///
/// Uninstall failures are expected when the package was never installed and
/// only surface with `--verbose`.
fn reported_warnings(report: &InstallReport, verbose: bool) -> Vec<&InstallWarning> {
    report
        .warnings
        .iter()
        .filter(|w| verbose || !matches!(w, InstallWarning::UninstallFailed { .. }))
        .collect()
}

/// `{"installed": {"name": "version" | null}, "warnings": [...]}`, packages
/// in request order.
fn report_json(report: &InstallReport, verbose: bool) -> Value {
    let installed: Map<String, Value> = report
        .installed
        .iter()
        .map(|entry| {
            let version = entry
                .version
                .as_ref()
                .map(|v| Value::String(v.to_string()))
                .unwrap_or(Value::Null);
            (entry.name.clone(), version)
        })
        .collect();

    json!({
        "installed": installed,
        "warnings": reported_warnings(report, verbose),
    })
}

/// One `name version` line per requested package.
///
/// Warnings are not repeated here: the installer already logged each one
/// as it happened.
fn report_lines(report: &InstallReport) -> Vec<String> {
    report
        .installed
        .iter()
        .map(|entry| match &entry.version {
            Some(version) => format!("{} {}", style(&entry.name).green(), version),
            None => format!("{} {}", style(&entry.name).red(), style("absent").dim()),
        })
        .collect()
}
