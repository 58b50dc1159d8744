//! Common utilities shared across CLI commands.

use std::env;

use ghinstall::builder::split_build_args;
use ghinstall::config::ConfigFile;
use ghinstall::fetcher::Credentials;
use ghinstall::manager::InstallOptions;
use ghinstall::runtime::DependencyKind;

use crate::error::CliError;
use crate::InstallArgs;

/// Environment variables consulted for an access token, in order.
pub const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_PAT", "GITHUB_TOKEN"];

/// Load config or return default.
pub fn load_config() -> ConfigFile {
    ConfigFile::load().unwrap_or_default()
}

/// Resolve the access token.
///
/// CLI takes precedence, then the environment, then config.
pub fn resolve_token(cli_token: Option<String>, config: &ConfigFile) -> Option<String> {
    resolve_token_with(cli_token, config, |name| env::var(name).ok())
}

fn resolve_token_with<E>(cli_token: Option<String>, config: &ConfigFile, env_var: E) -> Option<String>
where
    E: Fn(&str) -> Option<String>,
{
    cli_token
        .or_else(|| TOKEN_ENV_VARS.into_iter().find_map(&env_var))
        .or_else(|| config.github.token.clone())
        .filter(|token| !token.trim().is_empty())
}

/// Credentials for the fetcher talking to `host`.
pub fn resolve_credentials(
    cli_token: Option<String>,
    host: &str,
    config: &ConfigFile,
) -> Credentials {
    Credentials::for_host(resolve_token(cli_token, config), host)
}

/// Parse `--dependencies` values.
pub fn parse_dependencies(values: &[String]) -> Result<Vec<DependencyKind>, CliError> {
    values
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<DependencyKind>().map_err(CliError::Config))
        .collect()
}

/// Install options from config, overridden by CLI arguments.
pub fn resolve_install_options(
    args: &InstallArgs,
    config: &ConfigFile,
) -> Result<InstallOptions, CliError> {
    let mut options = config.install_options().with_verbose(args.verbose);

    if let Some(host) = &args.host {
        options = options.with_host(host.clone());
    }
    if let Some(build_args) = &args.build_args {
        options = options.with_build_args(split_build_args(build_args));
    }
    if args.no_build_docs {
        options = options.with_build_docs(false);
    }
    if args.uninstall_first {
        options = options.with_uninstall_first(true);
    }
    if !args.repos.is_empty() {
        options.package_sources = args.repos.clone();
    }
    if let Some(dependencies) = &args.dependencies {
        options = options.with_dependencies(parse_dependencies(dependencies)?);
    }
    if let Some(library) = &args.library {
        options = options.with_library(library.clone());
    }
    if let Some(install_type) = &args.install_type {
        options = options.with_install_type(install_type.clone());
    }
    for opt in &args.install_opts {
        options = options.with_install_option(opt.clone());
    }
    if let Some(temp_dir) = &args.temp_dir {
        options = options.with_temp_dir(temp_dir.clone());
    }

    Ok(options)
}
