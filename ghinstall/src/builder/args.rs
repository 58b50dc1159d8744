//! Build argument handling.

/// Flag telling the build tool to skip long-form documentation (vignettes).
pub const NO_BUILD_DOCS_FLAG: &str = "--no-build-vignettes";

/// Split a caller-supplied argument string on whitespace.
///
/// # Examples
///
/// ```
/// use ghinstall::builder::split_build_args;
///
/// assert_eq!(split_build_args("  --no-manual   --resave-data "), vec!["--no-manual", "--resave-data"]);
/// assert!(split_build_args("").is_empty());
/// ```
pub fn split_build_args(args: &str) -> Vec<String> {
    args.split_whitespace().map(str::to_string).collect()
}

/// Arguments actually passed to the build tool.
///
/// When `build_docs` is false, [`NO_BUILD_DOCS_FLAG`] is appended unless the
/// caller already asked for it.
pub fn effective_build_args(build_args: &[String], build_docs: bool) -> Vec<String> {
    let mut args = build_args.to_vec();
    if !build_docs && !args.iter().any(|a| a == NO_BUILD_DOCS_FLAG) {
        args.push(NO_BUILD_DOCS_FLAG.to_string());
    }
    args
}
