//! libgit2-backed fetcher.

use std::fs;
use std::path::Path;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{AutotagOption, Cred, CredentialType, FetchOptions, RemoteCallbacks, Repository};
use tracing::debug;

use super::{Credentials, FetchError, FetchResult, SourceFetcher, WorkingCopy};
use crate::reference::{Reference, RevisionSelector};

/// How many times one operation may ask for credentials before giving up.
///
/// libgit2 calls the credentials callback again after every rejected
/// attempt, so without a cap a bad token loops forever.
const MAX_CREDENTIAL_ATTEMPTS: u32 = 1;

/// Clones repositories with libgit2 over whatever transport the
/// reference's clone URL names (HTTPS, SSH, local `file://`).
///
/// - default branch: plain clone
/// - `[branch]`: clone that branch
/// - `@ref`: clone, resolve the commit or tag, check it out detached
/// - `#pull`: clone, fetch `refs/pull/{n}/head`, check it out detached
#[derive(Debug, Clone, Default)]
pub struct GitFetcher {
    credentials: Credentials,
}

impl GitFetcher {
    /// Create a fetcher using the given credentials for every remote.
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Fetch options carrying a bounded credentials callback.
    ///
    /// Tags are always downloaded so `@tag` resolves after the clone.
    fn fetch_options(&self) -> FetchOptions<'static> {
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(credential_callback(self.credentials.clone()));

        let mut options = FetchOptions::new();
        options.remote_callbacks(callbacks);
        options.download_tags(AutotagOption::All);
        options
    }

    fn fetch_pull_request(&self, repo: &Repository, number: u64) -> FetchResult<()> {
        let local_ref = pull_request_ref(number);
        let refspec = format!("+refs/pull/{}/head:{}", number, local_ref);
        debug!(refspec = %refspec, "Fetching pull request head");

        let mut remote = repo.find_remote("origin")?;
        remote
            .fetch(&[refspec.as_str()], Some(&mut self.fetch_options()), None)
            .map_err(|e| match e.code() {
                git2::ErrorCode::NotFound => FetchError::RevisionNotFound(format!("#{}", number)),
                _ => FetchError::Git(e),
            })?;

        checkout_detached(repo, &local_ref)
    }
}

/// Credentials callback that answers at most [`MAX_CREDENTIAL_ATTEMPTS`]
/// times, then fails the operation.
fn credential_callback(
    credentials: Credentials,
) -> impl FnMut(&str, Option<&str>, CredentialType) -> Result<Cred, git2::Error> {
    let mut attempts = 0u32;
    move |_url: &str, username_from_url: Option<&str>, allowed: CredentialType| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("authentication failed"));
        }
        credentials.to_git(username_from_url, allowed)
    }
}

/// Local ref name a pull request head is fetched into.
fn pull_request_ref(number: u64) -> String {
    format!("refs/remotes/origin/pr/{}", number)
}

/// Resolve `revision` to a commit and check it out with a detached HEAD.
///
/// Tries the name as given (commit id, tag, full ref) and then as a
/// remote-tracking branch.
fn checkout_detached(repo: &Repository, revision: &str) -> FetchResult<()> {
    let object = repo
        .revparse_single(revision)
        .or_else(|_| repo.revparse_single(&format!("origin/{}", revision)))
        .map_err(|_| FetchError::RevisionNotFound(revision.to_string()))?;
    let commit = object
        .peel_to_commit()
        .map_err(|_| FetchError::RevisionNotFound(revision.to_string()))?;

    let mut checkout = CheckoutBuilder::new();
    checkout.force();
    repo.checkout_tree(commit.as_object(), Some(&mut checkout))?;
    repo.set_head_detached(commit.id())?;
    Ok(())
}

impl SourceFetcher for GitFetcher {
    fn fetch(&self, reference: &Reference, dest: &Path) -> FetchResult<WorkingCopy> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| FetchError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let url = reference.clone_url();
        debug!(url = %url, dest = %dest.display(), "Cloning repository");

        let mut builder = RepoBuilder::new();
        builder.fetch_options(self.fetch_options());
        if let Some(RevisionSelector::Branch(branch)) = &reference.selector {
            builder.branch(branch);
        }
        let repo = builder.clone(&url, dest)?;

        match &reference.selector {
            Some(RevisionSelector::Revision(revision)) => checkout_detached(&repo, revision)?,
            Some(RevisionSelector::PullRequest(number)) => {
                self.fetch_pull_request(&repo, *number)?
            }
            Some(RevisionSelector::Branch(_)) | None => {}
        }

        let commit = repo.head()?.peel_to_commit()?.id().to_string();
        Ok(WorkingCopy::new(dest, commit))
    }
}
