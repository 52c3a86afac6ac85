//! Repository contents types.
//!
//! Request bodies for the Contents API and helpers to turn a contents
//! response into something a person can read.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::git_data::CommitAuthor;

#[cfg(test)]
#[path = "contents_tests.rs"]
mod tests;

/// Git ref used by `get_contents` when the caller does not name one.
pub const DEFAULT_CONTENTS_REF: &str = "master";

/// Query string of `GET /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ContentsQuery<'a> {
    #[serde(rename = "ref")]
    pub(crate) reference: &'a str,
}

/// A file to create or update through `PUT /repos/{owner}/{repo}/contents/{path}`.
///
/// The raw bytes are base64 encoded when the request is sent.
///
/// # Examples
///
/// ```rust
/// use github_client::PutContentsRequest;
///
/// let request = PutContentsRequest::new("Add README", b"# widgets\n".to_vec())
///     .with_branch("main");
/// assert_eq!(request.branch.as_deref(), Some("main"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PutContentsRequest {
    /// Commit message
    pub message: String,
    /// New file content, unencoded
    pub content: Vec<u8>,
    /// Blob SHA of the file being replaced; required when updating
    pub sha: Option<String>,
    /// Branch to commit to; the repository default branch when absent
    pub branch: Option<String>,
    /// Commit author; the installation when absent
    pub author: Option<CommitAuthor>,
}

impl PutContentsRequest {
    /// Creates a request that writes `content` with the given commit message.
    pub fn new(message: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            message: message.into(),
            content,
            ..Default::default()
        }
    }

    /// Sets the blob SHA of the file being replaced.
    pub fn with_sha(mut self, sha: impl Into<String>) -> Self {
        self.sha = Some(sha.into());
        self
    }

    /// Sets the branch to commit to.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Sets the commit author.
    pub fn with_author(mut self, author: CommitAuthor) -> Self {
        self.author = Some(author);
        self
    }

    pub(crate) fn to_payload(&self) -> PutContentsPayload<'_> {
        PutContentsPayload {
            message: &self.message,
            content: STANDARD.encode(&self.content),
            sha: self.sha.as_deref(),
            branch: self.branch.as_deref(),
            author: self.author.as_ref(),
        }
    }
}

/// Wire form of [`PutContentsRequest`].
#[derive(Debug, Serialize)]
pub(crate) struct PutContentsPayload<'a> {
    pub(crate) message: &'a str,
    pub(crate) content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) branch: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) author: Option<&'a CommitAuthor>,
}

/// The fields of a contents response needed to show a file.
#[derive(Debug, Deserialize)]
struct FileContents {
    #[serde(rename = "type")]
    entry_type: String,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// Decodes the body of a single-file contents response to UTF-8 text.
///
/// Returns `None` for directory listings, symlinks, submodules, files that
/// are not base64 encoded, and content that is not valid UTF-8.
pub fn decode_file_content(contents: &serde_json::Value) -> Option<String> {
    let file: FileContents = serde_json::from_value(contents.clone()).ok()?;
    if file.entry_type != "file" || file.encoding.as_deref() != Some("base64") {
        return None;
    }

    // GitHub wraps base64 content at 60 columns.
    let encoded: String = file
        .content?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let bytes = STANDARD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}
