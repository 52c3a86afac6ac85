//! Git data-plane operations performed as a GitHub App installation.
//!
//! Every operation is a single REST call. Before that call the client
//! resolves the installation bound to the repository and exchanges it for a
//! fresh installation token (see [`GitHubClient::installation_session`]).
//! Responses are returned as parsed JSON, unchanged.

use async_trait::async_trait;
use octocrab::Result as OctocrabResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::contents::ContentsQuery;
use crate::{
    encode_segment, map_octocrab_error, repo_route, with_timeout, Error, GitHubClient,
    InstallationId, PutContentsRequest, DEFAULT_CONTENTS_REF,
};

#[cfg(test)]
#[path = "git_data_tests.rs"]
mod tests;

/// File mode GitHub uses for a regular, non-executable file.
const REGULAR_FILE_MODE: &str = "100644";

/// Author or committer identity attached to a commit.
///
/// # Examples
///
/// ```rust
/// use github_client::CommitAuthor;
///
/// let author = CommitAuthor::new("Mona Octocat", "octocat@github.com")
///     .with_date("2008-07-09T16:13:30+12:00");
/// assert_eq!(author.date.as_deref(), Some("2008-07-09T16:13:30+12:00"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    /// Name of the author
    pub name: String,
    /// Email of the author
    pub email: String,
    /// ISO 8601 timestamp of the authorship
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl CommitAuthor {
    /// Creates an author without a timestamp.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            date: None,
        }
    }

    /// Sets the authorship timestamp.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
}

/// A commit to create with `create_commit`.
#[derive(Debug, Clone)]
pub struct CreateCommitRequest {
    /// Commit message
    pub message: String,
    /// SHA of the tree the commit points to
    pub tree: String,
    /// SHA of the parent commit; a root commit when absent
    pub parent: Option<String>,
    /// Commit author; `date` defaults to the current time
    pub author: CommitAuthor,
}

#[derive(Debug, Serialize)]
struct CreateRefPayload<'a> {
    #[serde(rename = "ref")]
    reference: &'a str,
    sha: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateRefPayload<'a> {
    sha: &'a str,
    force: bool,
}

#[derive(Debug, Serialize)]
struct CreateBlobPayload<'a> {
    content: &'a str,
    encoding: &'a str,
}

#[derive(Debug, Serialize)]
struct TreeEntryPayload<'a> {
    path: &'a str,
    mode: &'a str,
    #[serde(rename = "type")]
    entry_type: &'a str,
    sha: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateTreePayload<'a> {
    base_tree: &'a str,
    tree: Vec<TreeEntryPayload<'a>>,
}

#[derive(Debug, Serialize)]
struct CreateCommitPayload<'a> {
    message: &'a str,
    tree: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parents: Option<Vec<&'a str>>,
    author: CommitAuthor,
}

impl CreateCommitRequest {
    fn to_payload(&self) -> CreateCommitPayload<'_> {
        let mut author = self.author.clone();
        if author.date.is_none() {
            author.date = Some(chrono::Utc::now().to_rfc3339());
        }

        CreateCommitPayload {
            message: &self.message,
            tree: &self.tree,
            parents: self.parent.as_deref().map(|p| vec![p]),
            author,
        }
    }
}

/// Trait for Git data operations (branches, refs, trees, blobs, commits,
/// contents) on a repository the app is installed on.
#[async_trait]
pub trait GitDataOperations: Send + Sync {
    /// Lists the branches of a repository.
    async fn list_branches(&self, owner: &str, repo: &str) -> Result<Value, Error>;

    /// Gets a single reference, e.g. `heads/master`.
    async fn get_ref(&self, owner: &str, repo: &str, reference: &str) -> Result<Value, Error>;

    /// Creates a fully qualified reference, e.g. `refs/heads/feature`.
    async fn create_ref(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
    ) -> Result<Value, Error>;

    /// Points an existing reference (e.g. `heads/master`) at `sha`.
    ///
    /// `force` allows a non fast-forward update.
    async fn update_ref(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
        force: bool,
    ) -> Result<Value, Error>;

    /// Gets the tree with the given SHA.
    async fn get_tree(&self, owner: &str, repo: &str, sha: &str) -> Result<Value, Error>;

    /// Creates a blob from `content` in the given encoding (`utf-8` or `base64`).
    async fn create_blob(
        &self,
        owner: &str,
        repo: &str,
        content: &str,
        encoding: &str,
    ) -> Result<Value, Error>;

    /// Creates a tree that overlays a single file blob onto `base_tree`.
    async fn create_tree(
        &self,
        owner: &str,
        repo: &str,
        base_tree: &str,
        path: &str,
        blob_sha: &str,
    ) -> Result<Value, Error>;

    /// Creates a commit object.
    async fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        request: &CreateCommitRequest,
    ) -> Result<Value, Error>;

    /// Creates or updates a file through the Contents API.
    async fn put_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        request: &PutContentsRequest,
    ) -> Result<Value, Error>;

    /// Gets a file or directory. `reference` defaults to `master`.
    async fn get_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: Option<&str>,
    ) -> Result<Value, Error>;

    /// Removes an installation of the app.
    async fn delete_installation(&self, installation_id: InstallationId) -> Result<(), Error>;
}

#[async_trait]
impl GitDataOperations for GitHubClient {
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    async fn list_branches(&self, owner: &str, repo: &str) -> Result<Value, Error> {
        let client = self.installation_session(owner, repo).await?;
        let path = repo_route(owner, repo, "branches");

        let response: OctocrabResult<Value> =
            with_timeout(self.timeout(), client.get(path, None::<&()>)).await?;
        finish(response, "Failed to list branches", owner, repo)
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    async fn get_ref(&self, owner: &str, repo: &str, reference: &str) -> Result<Value, Error> {
        let client = self.installation_session(owner, repo).await?;
        let path = repo_route(owner, repo, &format!("git/ref/{}", encode_path(reference)));

        let response: OctocrabResult<Value> =
            with_timeout(self.timeout(), client.get(path, None::<&()>)).await?;
        finish(response, "Failed to get reference", owner, repo)
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    async fn create_ref(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
    ) -> Result<Value, Error> {
        let client = self.installation_session(owner, repo).await?;
        let path = repo_route(owner, repo, "git/refs");
        let payload = CreateRefPayload { reference, sha };

        let response: OctocrabResult<Value> =
            with_timeout(self.timeout(), client.post(path, Some(&payload))).await?;
        finish(response, "Failed to create reference", owner, repo)
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    async fn update_ref(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
        force: bool,
    ) -> Result<Value, Error> {
        let client = self.installation_session(owner, repo).await?;
        let path = repo_route(owner, repo, &format!("git/refs/{}", encode_path(reference)));
        let payload = UpdateRefPayload { sha, force };

        let response: OctocrabResult<Value> =
            with_timeout(self.timeout(), client.patch(path, Some(&payload))).await?;
        finish(response, "Failed to update reference", owner, repo)
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    async fn get_tree(&self, owner: &str, repo: &str, sha: &str) -> Result<Value, Error> {
        let client = self.installation_session(owner, repo).await?;
        let path = repo_route(owner, repo, &format!("git/trees/{}", encode_segment(sha)));

        let response: OctocrabResult<Value> =
            with_timeout(self.timeout(), client.get(path, None::<&()>)).await?;
        finish(response, "Failed to get tree", owner, repo)
    }

    #[instrument(skip(self, content), fields(owner = %owner, repo = %repo))]
    async fn create_blob(
        &self,
        owner: &str,
        repo: &str,
        content: &str,
        encoding: &str,
    ) -> Result<Value, Error> {
        let client = self.installation_session(owner, repo).await?;
        let path = repo_route(owner, repo, "git/blobs");
        let payload = CreateBlobPayload { content, encoding };

        let response: OctocrabResult<Value> =
            with_timeout(self.timeout(), client.post(path, Some(&payload))).await?;
        finish(response, "Failed to create blob", owner, repo)
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    async fn create_tree(
        &self,
        owner: &str,
        repo: &str,
        base_tree: &str,
        path: &str,
        blob_sha: &str,
    ) -> Result<Value, Error> {
        let client = self.installation_session(owner, repo).await?;
        let route = repo_route(owner, repo, "git/trees");
        let payload = CreateTreePayload {
            base_tree,
            tree: vec![TreeEntryPayload {
                path,
                mode: REGULAR_FILE_MODE,
                entry_type: "blob",
                sha: blob_sha,
            }],
        };

        let response: OctocrabResult<Value> =
            with_timeout(self.timeout(), client.post(route, Some(&payload))).await?;
        finish(response, "Failed to create tree", owner, repo)
    }

    #[instrument(skip(self, request), fields(owner = %owner, repo = %repo))]
    async fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        request: &CreateCommitRequest,
    ) -> Result<Value, Error> {
        let client = self.installation_session(owner, repo).await?;
        let path = repo_route(owner, repo, "git/commits");
        let payload = request.to_payload();

        let response: OctocrabResult<Value> =
            with_timeout(self.timeout(), client.post(path, Some(&payload))).await?;
        finish(response, "Failed to create commit", owner, repo)
    }

    #[instrument(skip(self, request), fields(owner = %owner, repo = %repo, path = %path))]
    async fn put_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        request: &PutContentsRequest,
    ) -> Result<Value, Error> {
        let client = self.installation_session(owner, repo).await?;
        let route = repo_route(owner, repo, &format!("contents/{}", encode_path(path)));
        let payload = request.to_payload();

        let response: OctocrabResult<Value> =
            with_timeout(self.timeout(), client.put(route, Some(&payload))).await?;
        finish(response, "Failed to write file contents", owner, repo)
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo, path = %path))]
    async fn get_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: Option<&str>,
    ) -> Result<Value, Error> {
        let client = self.installation_session(owner, repo).await?;
        let route = repo_route(owner, repo, &format!("contents/{}", encode_path(path)));
        let query = ContentsQuery {
            reference: reference.unwrap_or(DEFAULT_CONTENTS_REF),
        };

        let response: OctocrabResult<Value> =
            with_timeout(self.timeout(), client.get(route, Some(&query))).await?;
        finish(response, "Failed to get file contents", owner, repo)
    }

    async fn delete_installation(&self, installation_id: InstallationId) -> Result<(), Error> {
        GitHubClient::delete_installation(self, installation_id).await
    }
}

/// Logs the outcome of a Git data call and maps failures.
fn finish(
    response: OctocrabResult<Value>,
    message: &str,
    owner: &str,
    repo: &str,
) -> Result<Value, Error> {
    match response {
        Ok(value) => {
            info!(owner = owner, repo = repo, "Git data request succeeded");
            Ok(value)
        }
        Err(e) => {
            error!(owner = owner, repo = repo, "{}", message);
            Err(map_octocrab_error(message, e))
        }
    }
}

/// Percent-encodes each segment of a slash separated path, keeping the slashes.
fn encode_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}
