//! Credentials handed to the version-control client.

use std::fmt;

use git2::{Cred, CredentialType};

/// Username sent alongside a personal access token.
const TOKEN_USERNAME: &str = "x-access-token";

/// Authentication for fetching repositories.
///
/// The installer passes these through to the fetcher unmodified. `Debug`
/// never prints secrets.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Credentials {
    /// No authentication; public repositories only.
    #[default]
    Anonymous,

    /// Personal access token sent over HTTPS basic auth.
    Token(String),

    /// Explicit username and password.
    UserPass { username: String, password: String },

    /// Keys offered by the running SSH agent.
    SshAgent,
}

impl Credentials {
    /// Token credentials, or anonymous when `token` is `None` or blank.
    pub fn from_token(token: Option<String>) -> Self {
        match token {
            Some(token) if !token.trim().is_empty() => Credentials::Token(token.trim().to_string()),
            _ => Credentials::Anonymous,
        }
    }

    /// Credentials for a host: the token when one is given, otherwise the
    /// SSH agent for `ssh://` hosts and anonymous access for the rest.
    pub fn for_host(token: Option<String>, host: &str) -> Self {
        match Self::from_token(token) {
            Credentials::Anonymous if host.starts_with("ssh://") => Credentials::SshAgent,
            credentials => credentials,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Credentials::Anonymous)
    }

    /// Produce a libgit2 credential for a request.
    ///
    /// Returns an error when these credentials cannot satisfy any of the
    /// allowed types, which makes libgit2 fail the operation instead of
    /// retrying.
    pub(crate) fn to_git(
        &self,
        username_from_url: Option<&str>,
        allowed: CredentialType,
    ) -> Result<Cred, git2::Error> {
        match self {
            Credentials::Token(token) if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) => {
                Cred::userpass_plaintext(TOKEN_USERNAME, token)
            }
            Credentials::UserPass { username, password }
                if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) =>
            {
                Cred::userpass_plaintext(username, password)
            }
            Credentials::SshAgent if allowed.contains(CredentialType::SSH_KEY) => {
                Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"))
            }
            _ if allowed.contains(CredentialType::DEFAULT) => Cred::default(),
            _ => Err(git2::Error::from_str(&format!(
                "no usable credentials for this remote ({:?} required)",
                allowed
            ))),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Anonymous => write!(f, "Anonymous"),
            Credentials::Token(_) => write!(f, "Token(<redacted>)"),
            Credentials::UserPass { username, .. } => f
                .debug_struct("UserPass")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::SshAgent => write!(f, "SshAgent"),
        }
    }
}
