//! Building host expressions for `Rscript -e`.
//!
//! Every caller-controlled value goes through [`r_string`], so package
//! names, paths and URLs cannot break out of their string literal.
//! Passthrough installer options are the one exception: they are inserted
//! verbatim.

use std::path::Path;

use super::InstallRequest;

/// Quote a value as a double-quoted string literal.
///
/// # Examples
///
/// ```
/// use ghinstall::runtime::r_string;
///
/// assert_eq!(r_string("pkg"), r#""pkg""#);
/// assert_eq!(r_string(r#"a"b\c"#), r#""a\"b\\c""#);
/// ```
pub fn r_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Quote values as a character vector `c("a", "b")`.
pub fn r_string_vector<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let items: Vec<String> = values.into_iter().map(|v| r_string(v.as_ref())).collect();
    format!("c({})", items.join(", "))
}

fn path_literal(path: &Path) -> String {
    r_string(&path.to_string_lossy())
}

/// Expression installing every requested package in one call.
///
/// # Examples
///
/// ```
/// use ghinstall::runtime::{install_packages_call, DependencyKind, InstallRequest};
///
/// let request = InstallRequest {
///     packages: vec!["pkg".into()],
///     repos: vec!["file:///tmp/repo".into(), "https://cloud.r-project.org".into()],
///     library: None,
///     dependencies: DependencyKind::defaults(),
///     install_type: None,
///     extra_options: vec![],
/// };
///
/// assert_eq!(
///     install_packages_call(&request),
///     r#"utils::install.packages(c("pkg"), repos = c("file:///tmp/repo", "https://cloud.r-project.org"), dependencies = c("Depends", "Imports"))"#
/// );
/// ```
pub fn install_packages_call(request: &InstallRequest) -> String {
    let mut args = vec![
        r_string_vector(&request.packages),
        format!("repos = {}", r_string_vector(&request.repos)),
    ];

    if let Some(library) = &request.library {
        args.push(format!("lib = {}", path_literal(library)));
    }

    let kinds: Vec<&str> = request.dependencies.iter().map(|k| k.field_name()).collect();
    if kinds.is_empty() {
        args.push("dependencies = FALSE".to_string());
    } else {
        args.push(format!("dependencies = {}", r_string_vector(kinds)));
    }

    if let Some(install_type) = &request.install_type {
        args.push(format!("type = {}", r_string(install_type)));
    }

    args.extend(
        request
            .extra_options
            .iter()
            .map(|opt| opt.trim())
            .filter(|opt| !opt.is_empty())
            .map(str::to_string),
    );

    format!("utils::install.packages({})", args.join(", "))
}

/// Expression removing one installed package.
pub fn remove_packages_call(name: &str, library: Option<&Path>) -> String {
    match library {
        Some(lib) => format!(
            "utils::remove.packages({}, lib = {})",
            r_string(name),
            path_literal(lib)
        ),
        None => format!("utils::remove.packages({})", r_string(name)),
    }
}

/// Expression printing the library search path, one entry per line.
pub(crate) fn lib_paths_call() -> &'static str {
    r#"cat(.libPaths(), sep = "\n")"#
}
