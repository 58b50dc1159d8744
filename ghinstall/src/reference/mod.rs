//! Repository references.
//!
//! A [`Reference`] identifies a source repository on a hosting service plus
//! an optional revision selector and an optional subdirectory holding the
//! package. References are parsed from shorthand strings with
//! [`parse_reference`].

mod parser;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub use parser::parse_reference;

/// Hosting service used when none is given.
pub const DEFAULT_HOST: &str = "github.com";

/// Errors produced while parsing a reference string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    /// The input is not `owner/name` plus recognized qualifiers.
    #[error(
        "invalid repository reference '{input}': could not interpret '{remainder}' \
         as owner/name[/subdir]"
    )]
    Invalid { input: String, remainder: String },

    /// A qualifier appeared more than once.
    #[error("invalid repository reference '{input}': {qualifier} given more than once")]
    DuplicateQualifier {
        input: String,
        qualifier: &'static str,
    },

    /// More than one of branch, ref and pull request was given.
    #[error(
        "invalid repository reference '{input}': only one of [branch], @ref and #pull \
         may be given"
    )]
    ConflictingSelectors { input: String },

    /// The subdirectory would leave the repository (`..`) or is not relative.
    #[error(
        "invalid repository reference '{input}': subdirectory '{subdir}' must stay \
         inside the repository"
    )]
    InvalidSubdir { input: String, subdir: String },

    /// Pull request number does not fit.
    #[error("invalid repository reference '{input}': pull request '{value}' is out of range")]
    InvalidPullRequest { input: String, value: String },
}

/// Which snapshot of the repository to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RevisionSelector {
    /// A branch name (`[branch]`).
    Branch(String),
    /// A commit id or tag name (`@ref`), resolved at fetch time.
    Revision(String),
    /// A pull request number (`#123`).
    PullRequest(u64),
}

impl fmt::Display for RevisionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevisionSelector::Branch(branch) => write!(f, "[{}]", branch),
            RevisionSelector::Revision(rev) => write!(f, "@{}", rev),
            RevisionSelector::PullRequest(number) => write!(f, "#{}", number),
        }
    }
}

/// A parsed repository reference.
///
/// `owner` and `name` are always non-empty. At most one selector is set;
/// `None` means the default branch.
///
/// # Example
///
/// ```
/// use ghinstall::reference::Reference;
///
/// let reference = Reference::parse("r-lib/rlang@v1.1.0")
///     .unwrap()
///     .with_host("github.example.com");
///
/// assert_eq!(reference.slug(), "r-lib/rlang");
/// assert_eq!(reference.clone_url(), "https://github.example.com/r-lib/rlang.git");
/// assert_eq!(reference.to_string(), "r-lib/rlang@v1.1.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Reference {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub name: String,

    /// Path inside the repository holding the package, if not the root.
    pub subdir: Option<String>,

    /// Branch, commit/tag or pull request to check out.
    pub selector: Option<RevisionSelector>,

    /// Hosting service hostname.
    pub host: String,
}

impl Reference {
    /// Parse a shorthand string. See [`parse_reference`].
    pub fn parse(input: &str) -> Result<Self, ReferenceError> {
        parse_reference(input)
    }

    /// Set the hosting service (builder pattern).
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// `owner/name`.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Clone URL on the configured host.
    ///
    /// A bare hostname is reached over HTTPS. A host that already carries a
    /// scheme (`ssh://git@github.com`, `http://git.local:3000`,
    /// `file:///srv/mirrors`) is used as the base URL as given.
    pub fn clone_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.contains("://") {
            format!("{}/{}/{}.git", host, self.owner, self.name)
        } else {
            format!("https://{}/{}/{}.git", host, self.owner, self.name)
        }
    }

    /// Whether the host is reached over SSH.
    pub fn uses_ssh(&self) -> bool {
        self.host.starts_with("ssh://")
    }
}

/// Canonical shorthand form. Parsing the output yields an equal reference
/// (apart from the host, which the shorthand does not carry).
impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)?;
        if let Some(selector) = &self.selector {
            write!(f, "{}", selector)?;
        }
        if let Some(subdir) = &self.subdir {
            write!(f, "/{}", subdir)?;
        }
        Ok(())
    }
}
