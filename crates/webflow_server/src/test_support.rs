//! In-memory collaborators shared by the handler and router tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use auth_handler::{AuthError, AuthResult, WebFlowHandler, WebFlowProvider};
use github_client::{
    CreateCommitRequest, Error, GitDataOperations, Installation, InstallationId,
    PutContentsRequest, Repository, UserAccessToken,
};
use serde_json::{json, Value};
use template_engine::{IndexView, ViewRenderer};

use crate::AppState;

/// What a fake Git data call answers with.
#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    Ok(Value),
    NotInstalled,
    Upstream(u16, &'static str),
}

/// Git data operations answering every call with one outcome.
#[derive(Debug)]
pub(crate) struct FakeGitData {
    outcome: Outcome,
    calls: Mutex<Vec<String>>,
}

impl FakeGitData {
    pub(crate) fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, call: String, owner: &str, repo: &str) -> Result<Value, Error> {
        self.calls.lock().unwrap().push(call);
        match &self.outcome {
            Outcome::Ok(value) => Ok(value.clone()),
            Outcome::NotInstalled => Err(Error::NotInstalled {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            Outcome::Upstream(status, message) => Err(Error::UpstreamHttp {
                status: *status,
                message: message.to_string(),
            }),
        }
    }
}

#[async_trait]
impl GitDataOperations for FakeGitData {
    async fn list_branches(&self, owner: &str, repo: &str) -> Result<Value, Error> {
        self.answer(format!("list_branches {owner}/{repo}"), owner, repo)
    }

    async fn get_ref(&self, owner: &str, repo: &str, reference: &str) -> Result<Value, Error> {
        self.answer(format!("get_ref {owner}/{repo} {reference}"), owner, repo)
    }

    async fn create_ref(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
    ) -> Result<Value, Error> {
        self.answer(
            format!("create_ref {owner}/{repo} {reference} {sha}"),
            owner,
            repo,
        )
    }

    async fn update_ref(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
        force: bool,
    ) -> Result<Value, Error> {
        self.answer(
            format!("update_ref {owner}/{repo} {reference} {sha} {force}"),
            owner,
            repo,
        )
    }

    async fn get_tree(&self, owner: &str, repo: &str, sha: &str) -> Result<Value, Error> {
        self.answer(format!("get_tree {owner}/{repo} {sha}"), owner, repo)
    }

    async fn create_blob(
        &self,
        owner: &str,
        repo: &str,
        _content: &str,
        encoding: &str,
    ) -> Result<Value, Error> {
        self.answer(format!("create_blob {owner}/{repo} {encoding}"), owner, repo)
    }

    async fn create_tree(
        &self,
        owner: &str,
        repo: &str,
        base_tree: &str,
        path: &str,
        _blob_sha: &str,
    ) -> Result<Value, Error> {
        self.answer(
            format!("create_tree {owner}/{repo} {base_tree} {path}"),
            owner,
            repo,
        )
    }

    async fn create_commit(
        &self,
        owner: &str,
        repo: &str,
        request: &CreateCommitRequest,
    ) -> Result<Value, Error> {
        self.answer(
            format!("create_commit {owner}/{repo} {}", request.message),
            owner,
            repo,
        )
    }

    async fn put_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        _request: &PutContentsRequest,
    ) -> Result<Value, Error> {
        self.answer(format!("put_contents {owner}/{repo} {path}"), owner, repo)
    }

    async fn get_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: Option<&str>,
    ) -> Result<Value, Error> {
        self.answer(
            format!("get_contents {owner}/{repo} {path} {reference:?}"),
            owner,
            repo,
        )
    }

    async fn delete_installation(&self, installation_id: InstallationId) -> Result<(), Error> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("delete_installation {installation_id}"));
        Ok(())
    }
}

/// Web flow provider granting `acme/widgets` through installation 42.
#[derive(Debug, Default)]
pub(crate) struct FakeWebFlow {
    pub(crate) reject_code: bool,
}

#[async_trait]
impl WebFlowProvider for FakeWebFlow {
    async fn exchange_code(&self, code: &str) -> AuthResult<UserAccessToken> {
        if self.reject_code {
            return Err(AuthError::TokenExchange(format!("bad code {code}")));
        }
        Ok(UserAccessToken::new("tok1"))
    }

    async fn list_installations(&self, _token: &UserAccessToken) -> AuthResult<Vec<Installation>> {
        Ok(serde_json::from_value(json!([{"id": 42}])).unwrap())
    }

    async fn list_repositories(
        &self,
        _token: &UserAccessToken,
        _installation_id: InstallationId,
    ) -> AuthResult<Vec<Repository>> {
        Ok(serde_json::from_value(json!([
            {"name": "widgets", "owner": {"login": "acme"}}
        ]))
        .unwrap())
    }
}

pub(crate) fn index_view() -> IndexView {
    IndexView::new(
        "webflow-demo",
        "Iv1.8a61f9b3a7aba766",
        "https://github.com",
        "https://github.com/login/oauth/authorize?client_id=Iv1.8a61f9b3a7aba766",
    )
}

pub(crate) fn test_state(git_data: Arc<FakeGitData>, web_flow: FakeWebFlow) -> AppState {
    AppState::new(
        git_data,
        WebFlowHandler::new(Arc::new(web_flow)),
        ViewRenderer::new().unwrap(),
        index_view(),
    )
}
