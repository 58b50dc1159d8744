//! Shorthand repository reference parsing.
//!
//! Parses strings in the form `owner/name[branch]@ref#pull/subdir`, where
//! every qualifier after `owner/name` is optional and may appear in any
//! order. Qualifiers are stripped from the input one kind at a time until
//! only `owner/name[/subdir]` remains.
//!
//! Examples:
//! - `r-lib/rlang`
//! - `r-lib/rlang[main]`
//! - `tidyverse/ggplot2@v3.4.0`
//! - `r-lib/cli#612`
//! - `cran/monorepo/pkgs/inner@abc123`

use std::sync::OnceLock;

use regex::Regex;

use super::{Reference, ReferenceError, RevisionSelector, DEFAULT_HOST};

/// Bracketed branch name: `[branch]`. May contain `/`.
fn branch_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[([^\[\]\s]+)\]").unwrap())
}

/// Pull request number: `#123`.
fn pull_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"#(\d+)").unwrap())
}

/// Commit or tag: `@abc123`, `@v1.0.0`. Stops at `/` so a trailing
/// subdirectory is left in place.
fn revision_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"@([^\[\]#@/\s]+)").unwrap())
}

/// What is left once every qualifier is stripped: `owner/name[/subdir]`.
fn repository_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // ([^/...]+)   - owner
        // /            - separator
        // ([^/...]+)   - repository name
        // (?:/(...))?  - optional subdirectory, may span several segments
        Regex::new(r"^([^/\s\[\]@#]+)/([^/\s\[\]@#]+)(?:/([^\s\[\]@#]*))?$").unwrap()
    })
}

/// Remove the single match of `pattern` from `remaining` and return its
/// first capture group.
///
/// Returns `Ok(None)` when the qualifier is absent and an error when it
/// appears more than once.
fn strip_qualifier(
    input: &str,
    remaining: &mut String,
    pattern: &Regex,
    qualifier: &'static str,
) -> Result<Option<String>, ReferenceError> {
    let (whole, value) = {
        let mut matches = pattern.captures_iter(remaining);
        let Some(first) = matches.next() else {
            return Ok(None);
        };
        if matches.next().is_some() {
            return Err(ReferenceError::DuplicateQualifier {
                input: input.to_string(),
                qualifier,
            });
        }
        (first.get(0).unwrap().range(), first[1].to_string())
    };

    remaining.replace_range(whole, "");
    Ok(Some(value))
}

/// Parse a shorthand repository reference.
///
/// The host defaults to [`DEFAULT_HOST`]; use [`Reference::with_host`] to
/// target an enterprise instance.
///
/// # Errors
///
/// - [`ReferenceError::Invalid`] when the input is not `owner/name` plus
///   recognized qualifiers
/// - [`ReferenceError::DuplicateQualifier`] when a qualifier is repeated
/// - [`ReferenceError::ConflictingSelectors`] when more than one of
///   branch, ref and pull request is given
/// - [`ReferenceError::InvalidSubdir`] when the subdirectory has `.` or
///   `..` segments
///
/// # Examples
///
/// ```
/// use ghinstall::reference::{parse_reference, RevisionSelector};
///
/// let a = parse_reference("o/n[dev]/R").unwrap();
/// let b = parse_reference("o/n/R[dev]").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.selector, Some(RevisionSelector::Branch("dev".into())));
/// assert_eq!(a.subdir.as_deref(), Some("R"));
///
/// assert!(parse_reference("missinguser").is_err());
/// ```
pub fn parse_reference(input: &str) -> Result<Reference, ReferenceError> {
    let trimmed = input.trim();
    let mut remaining = trimmed.to_string();

    // Branch goes first: its brackets may enclose `@` or `#`.
    let branch = strip_qualifier(trimmed, &mut remaining, branch_pattern(), "[branch]")?;
    let pull = strip_qualifier(trimmed, &mut remaining, pull_pattern(), "#pull")?;
    let revision = strip_qualifier(trimmed, &mut remaining, revision_pattern(), "@ref")?;

    let pull = pull
        .map(|n| {
            n.parse::<u64>()
                .map_err(|_| ReferenceError::InvalidPullRequest {
                    input: trimmed.to_string(),
                    value: n.clone(),
                })
        })
        .transpose()?;

    let selectors = [
        branch.map(RevisionSelector::Branch),
        revision.map(RevisionSelector::Revision),
        pull.map(RevisionSelector::PullRequest),
    ];
    let mut given = selectors.into_iter().flatten();
    let selector = given.next();
    if given.next().is_some() {
        return Err(ReferenceError::ConflictingSelectors {
            input: trimmed.to_string(),
        });
    }

    let captures =
        repository_pattern()
            .captures(&remaining)
            .ok_or_else(|| ReferenceError::Invalid {
                input: trimmed.to_string(),
                remainder: remaining.clone(),
            })?;

    let subdir = captures
        .get(3)
        .map(|m| m.as_str().trim_matches('/'))
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    if let Some(subdir) = &subdir {
        if subdir.split('/').any(|part| part == "." || part == "..") {
            return Err(ReferenceError::InvalidSubdir {
                input: trimmed.to_string(),
                subdir: subdir.clone(),
            });
        }
    }

    Ok(Reference {
        owner: captures[1].to_string(),
        name: captures[2].to_string(),
        subdir,
        selector,
        host: DEFAULT_HOST.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Reference {
        parse_reference(input).unwrap()
    }

    #[test]
    fn test_parse_owner_and_name() {
        let r = parse("r-lib/rlang");
        assert_eq!(r.owner, "r-lib");
        assert_eq!(r.name, "rlang");
        assert_eq!(r.subdir, None);
        assert_eq!(r.selector, None);
        assert_eq!(r.host, DEFAULT_HOST);
    }

    #[test]
    fn test_parse_dotted_names() {
        let r = parse("Rdatatable/data.table");
        assert_eq!(r.name, "data.table");
    }

    #[test]
    fn test_parse_branch() {
        let r = parse("o/n[feature/login]");
        assert_eq!(
            r.selector,
            Some(RevisionSelector::Branch("feature/login".to_string()))
        );
        assert_eq!(r.subdir, None);
    }

    #[test]
    fn test_parse_revision() {
        let r = parse("o/n@v1.2.0");
        assert_eq!(
            r.selector,
            Some(RevisionSelector::Revision("v1.2.0".to_string()))
        );
    }

    #[test]
    fn test_parse_pull_request() {
        let r = parse("o/n#42");
        assert_eq!(r.selector, Some(RevisionSelector::PullRequest(42)));
    }

    #[test]
    fn test_parse_subdir() {
        let r = parse("o/n/pkg/inner");
        assert_eq!(r.subdir.as_deref(), Some("pkg/inner"));
    }

    #[test]
    fn test_parse_subdir_trailing_slash() {
        assert_eq!(parse("o/n/R/").subdir.as_deref(), Some("R"));
        assert_eq!(parse("o/n/").subdir, None);
    }

    #[test]
    fn test_subdir_cannot_leave_repository() {
        for input in ["o/n/../../etc", "o/n/pkg/..", "o/n/./pkg", "o/n@v1/../x"] {
            let err = parse_reference(input).unwrap_err();
            assert!(
                matches!(err, ReferenceError::InvalidSubdir { .. }),
                "{} should be rejected, got {:?}",
                input,
                err
            );
        }
        assert_eq!(parse("o/n/..pkg").subdir.as_deref(), Some("..pkg"));
    }

    #[test]
    fn test_qualifier_order_does_not_matter() {
        let expected = parse("o/n@abc123/R");
        assert_eq!(parse("o/n/R@abc123"), expected);
        assert_eq!(expected.subdir.as_deref(), Some("R"));
        assert_eq!(
            expected.selector,
            Some(RevisionSelector::Revision("abc123".to_string()))
        );
    }

    #[test]
    fn test_branch_may_contain_at_and_hash() {
        let r = parse("o/n[release@2#x]");
        assert_eq!(
            r.selector,
            Some(RevisionSelector::Branch("release@2#x".to_string()))
        );
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(parse("  o/n@v1  "), parse("o/n@v1"));
    }

    #[test]
    fn test_missing_separator_is_invalid() {
        let err = parse_reference("missinguser").unwrap_err();
        assert!(matches!(err, ReferenceError::Invalid { .. }));
        assert!(err.to_string().contains("missinguser"));
    }

    #[test]
    fn test_empty_owner_or_name_is_invalid() {
        assert!(parse_reference("/name").is_err());
        assert!(parse_reference("owner/").is_err());
        assert!(parse_reference("").is_err());
        assert!(parse_reference("/").is_err());
    }

    #[test]
    fn test_inner_whitespace_is_invalid() {
        assert!(parse_reference("o/n @v1").is_err());
        assert!(parse_reference("o /n").is_err());
    }

    #[test]
    fn test_empty_qualifiers_are_invalid() {
        assert!(parse_reference("o/n[]").is_err());
        assert!(parse_reference("o/n@").is_err());
        assert!(parse_reference("o/n#").is_err());
        assert!(parse_reference("o/n#abc").is_err());
    }

    #[test]
    fn test_duplicate_qualifier() {
        let err = parse_reference("o/n@a@b").unwrap_err();
        assert!(matches!(
            err,
            ReferenceError::DuplicateQualifier {
                qualifier: "@ref",
                ..
            }
        ));

        let err = parse_reference("o/n[a][b]").unwrap_err();
        assert!(matches!(
            err,
            ReferenceError::DuplicateQualifier {
                qualifier: "[branch]",
                ..
            }
        ));
    }

    #[test]
    fn test_conflicting_selectors() {
        for input in ["o/n[dev]@abc123", "o/n@abc123#4", "o/n[dev]#4", "o/n[a]@b#1/R"] {
            let err = parse_reference(input).unwrap_err();
            assert!(
                matches!(err, ReferenceError::ConflictingSelectors { .. }),
                "{} should conflict, got {:?}",
                input,
                err
            );
        }
    }

    #[test]
    fn test_pull_request_out_of_range() {
        let err = parse_reference("o/n#99999999999999999999999").unwrap_err();
        assert!(matches!(err, ReferenceError::InvalidPullRequest { .. }));
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn segment() -> impl Strategy<Value = String> {
            "[A-Za-z0-9][A-Za-z0-9_.-]{0,15}"
        }

        proptest! {
            #[test]
            fn test_plain_pair_parses_exactly(owner in segment(), name in segment()) {
                let r = parse_reference(&format!("{}/{}", owner, name))?;
                prop_assert_eq!(r.owner, owner);
                prop_assert_eq!(r.name, name);
                prop_assert_eq!(r.subdir, None);
                prop_assert_eq!(r.selector, None);
            }

            #[test]
            fn test_qualifier_position_is_irrelevant(
                owner in segment(),
                name in segment(),
                subdir in segment(),
                revision in "[0-9a-f]{7,40}",
                selector_first in any::<bool>(),
            ) {
                let input = if selector_first {
                    format!("{}/{}@{}/{}", owner, name, revision, subdir)
                } else {
                    format!("{}/{}/{}@{}", owner, name, subdir, revision)
                };
                let r = parse_reference(&input)?;
                prop_assert_eq!(r.owner, owner);
                prop_assert_eq!(r.name, name);
                prop_assert_eq!(r.subdir, Some(subdir));
                prop_assert_eq!(r.selector, Some(RevisionSelector::Revision(revision)));
            }

            #[test]
            fn test_display_round_trips(
                owner in segment(),
                name in segment(),
                branch in "[a-z][a-z0-9/_-]{0,12}",
            ) {
                let r = parse_reference(&format!("{}/{}[{}]", owner, name, branch))?;
                prop_assert_eq!(parse_reference(&r.to_string())?, r);
            }
        }
    }
}
