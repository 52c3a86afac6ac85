use super::*;
use crate::tests::{create_test_client, mount_installation};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn installed_server() -> MockServer {
    let mock_server = MockServer::start().await;
    mount_installation(&mock_server, "acme", "widgets").await;
    mock_server
}

#[tokio::test]
async fn test_list_branches_uses_installation_token() {
    let mock_server = installed_server().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/branches"))
        .and(header_regex("authorization", "ghs_installation_token$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "master", "commit": {"sha": "c5b97d5ae6c19d5c5df71a34c7fbeeda2479ccbc"}, "protected": false}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let branches = client.list_branches("acme", "widgets").await.unwrap();

    assert_eq!(branches[0]["name"], "master");
}

#[tokio::test]
async fn test_each_operation_resolves_a_fresh_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/installation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/app/installations/42/access_tokens"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"token": "ghs_t"})))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/branches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    client.list_branches("acme", "widgets").await.unwrap();
    client.list_branches("acme", "widgets").await.unwrap();
}

#[tokio::test]
async fn test_operation_on_uninstalled_repository() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/gadgets/installation"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not Found",
            "documentation_url": "https://docs.github.com/rest"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/gadgets/branches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let result = client.list_branches("acme", "gadgets").await;

    assert!(matches!(result, Err(Error::NotInstalled { .. })));
}

#[tokio::test]
async fn test_get_ref() {
    let mock_server = installed_server().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/git/ref/heads/master"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/master",
            "object": {"type": "commit", "sha": "aa218f56b14c9653891f9e74264a383fa43fefbd"}
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let reference = client
        .get_ref("acme", "widgets", "heads/master")
        .await
        .unwrap();

    assert_eq!(
        reference["object"]["sha"],
        "aa218f56b14c9653891f9e74264a383fa43fefbd"
    );
}

#[tokio::test]
async fn test_create_ref() {
    let mock_server = installed_server().await;

    Mock::given(method("POST"))
        .and(path("/repos/acme/widgets/git/refs"))
        .and(body_json(json!({
            "ref": "refs/heads/feature",
            "sha": "aa218f56b14c9653891f9e74264a383fa43fefbd"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "ref": "refs/heads/feature"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let created = client
        .create_ref(
            "acme",
            "widgets",
            "refs/heads/feature",
            "aa218f56b14c9653891f9e74264a383fa43fefbd",
        )
        .await
        .unwrap();

    assert_eq!(created["ref"], "refs/heads/feature");
}

#[tokio::test]
async fn test_create_ref_conflict() {
    let mock_server = installed_server().await;

    Mock::given(method("POST"))
        .and(path("/repos/acme/widgets/git/refs"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Reference already exists",
            "documentation_url": "https://docs.github.com/rest/git/refs#create-a-reference"
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let result = client
        .create_ref("acme", "widgets", "refs/heads/master", "abc")
        .await;

    match result {
        Err(Error::UpstreamHttp { status, message }) => {
            assert_eq!(status, 422);
            assert_eq!(message, "Reference already exists");
        }
        other => panic!("Expected UpstreamHttp, got {other:?}"),
    }
}

#[tokio::test]
async fn test_update_ref_with_force() {
    let mock_server = installed_server().await;

    Mock::given(method("PATCH"))
        .and(path("/repos/acme/widgets/git/refs/heads/master"))
        .and(body_json(json!({"sha": "def456", "force": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/master",
            "object": {"sha": "def456"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let updated = client
        .update_ref("acme", "widgets", "heads/master", "def456", true)
        .await
        .unwrap();

    assert_eq!(updated["object"]["sha"], "def456");
}

#[tokio::test]
async fn test_get_tree() {
    let mock_server = installed_server().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/git/trees/9fb037999f264ba9a7fc6274d15fa3ae2ab98312"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": "9fb037999f264ba9a7fc6274d15fa3ae2ab98312",
            "tree": [{"path": "README.md", "mode": "100644", "type": "blob"}],
            "truncated": false
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let tree = client
        .get_tree("acme", "widgets", "9fb037999f264ba9a7fc6274d15fa3ae2ab98312")
        .await
        .unwrap();

    assert_eq!(tree["tree"][0]["path"], "README.md");
}

#[tokio::test]
async fn test_get_tree_encodes_sha_as_one_segment() {
    let mock_server = installed_server().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/git/trees/..%2F..%2Finstallation"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not Found",
            "documentation_url": "https://docs.github.com/rest/git/trees#get-a-tree"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let result = client
        .get_tree("acme", "widgets", "../../installation")
        .await;

    assert!(matches!(result, Err(Error::UpstreamHttp { status: 404, .. })));
}

#[tokio::test]
async fn test_create_blob() {
    let mock_server = installed_server().await;

    Mock::given(method("POST"))
        .and(path("/repos/acme/widgets/git/blobs"))
        .and(body_json(json!({"content": "Content of the blob", "encoding": "utf-8"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "sha": "3a0f86fb8db8eea7ccbb9a95f325ddbedfb25e15"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let blob = client
        .create_blob("acme", "widgets", "Content of the blob", "utf-8")
        .await
        .unwrap();

    assert_eq!(blob["sha"], "3a0f86fb8db8eea7ccbb9a95f325ddbedfb25e15");
}

#[tokio::test]
async fn test_create_tree_overlays_single_file() {
    let mock_server = installed_server().await;

    Mock::given(method("POST"))
        .and(path("/repos/acme/widgets/git/trees"))
        .and(body_json(json!({
            "base_tree": "9fb037999f264ba9a7fc6274d15fa3ae2ab98312",
            "tree": [{
                "path": "docs/guide.md",
                "mode": "100644",
                "type": "blob",
                "sha": "3a0f86fb8db8eea7ccbb9a95f325ddbedfb25e15"
            }]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "sha": "cd8274d15fa3ae2ab983129fb037999f264ba9a7"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let tree = client
        .create_tree(
            "acme",
            "widgets",
            "9fb037999f264ba9a7fc6274d15fa3ae2ab98312",
            "docs/guide.md",
            "3a0f86fb8db8eea7ccbb9a95f325ddbedfb25e15",
        )
        .await
        .unwrap();

    assert_eq!(tree["sha"], "cd8274d15fa3ae2ab983129fb037999f264ba9a7");
}

#[tokio::test]
async fn test_create_commit_with_parent() {
    let mock_server = installed_server().await;

    Mock::given(method("POST"))
        .and(path("/repos/acme/widgets/git/commits"))
        .and(body_json(json!({
            "message": "my commit message",
            "tree": "827efc6d56897b048c772eb4087f854f46256132",
            "parents": ["7d1b31e74ee336d15cbd21741bc88a537ed063a0"],
            "author": {
                "name": "Mona Octocat",
                "email": "octocat@github.com",
                "date": "2008-07-09T16:13:30+12:00"
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "sha": "7638417db6d59f3c431d3e1f261cc637155684cd"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let request = CreateCommitRequest {
        message: "my commit message".to_string(),
        tree: "827efc6d56897b048c772eb4087f854f46256132".to_string(),
        parent: Some("7d1b31e74ee336d15cbd21741bc88a537ed063a0".to_string()),
        author: CommitAuthor::new("Mona Octocat", "octocat@github.com")
            .with_date("2008-07-09T16:13:30+12:00"),
    };

    let commit = client
        .create_commit("acme", "widgets", &request)
        .await
        .unwrap();

    assert_eq!(commit["sha"], "7638417db6d59f3c431d3e1f261cc637155684cd");
}

#[test]
fn test_commit_payload_without_parent_omits_parents() {
    let request = CreateCommitRequest {
        message: "initial".to_string(),
        tree: "827efc6d".to_string(),
        parent: None,
        author: CommitAuthor::new("Mona Octocat", "octocat@github.com"),
    };

    let payload = serde_json::to_value(request.to_payload()).unwrap();

    assert!(payload.get("parents").is_none());
    let date = payload["author"]["date"].as_str().expect("date is set");
    assert!(chrono::DateTime::parse_from_rfc3339(date).is_ok());
}

#[tokio::test]
async fn test_put_contents() {
    let mock_server = installed_server().await;

    Mock::given(method("PUT"))
        .and(path("/repos/acme/widgets/contents/docs/guide.md"))
        .and(body_partial_json(json!({
            "message": "Add guide",
            "content": "aGVsbG8=",
            "author": {"name": "Mona Octocat", "email": "octocat@github.com"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "content": {"name": "guide.md", "path": "docs/guide.md"},
            "commit": {"sha": "7638417db6d59f3c431d3e1f261cc637155684cd"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let request = PutContentsRequest::new("Add guide", b"hello".to_vec())
        .with_author(CommitAuthor::new("Mona Octocat", "octocat@github.com"));

    let result = client
        .put_contents("acme", "widgets", "docs/guide.md", &request)
        .await
        .unwrap();

    assert_eq!(result["content"]["path"], "docs/guide.md");
}

#[tokio::test]
async fn test_get_contents_defaults_ref_to_master() {
    let mock_server = installed_server().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/contents/README.md"))
        .and(query_param("ref", "master"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "file",
            "encoding": "base64",
            "name": "README.md",
            "path": "README.md",
            "content": "IyB3aWRnZXRzCg=="
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let contents = client
        .get_contents("acme", "widgets", "README.md", None)
        .await
        .unwrap();

    assert_eq!(contents["name"], "README.md");
}

#[tokio::test]
async fn test_get_contents_with_explicit_ref() {
    let mock_server = installed_server().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/contents/src"))
        .and(query_param("ref", "develop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"type": "file", "name": "lib.rs", "path": "src/lib.rs"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let contents = client
        .get_contents("acme", "widgets", "src", Some("develop"))
        .await
        .unwrap();

    assert!(contents.is_array());
}

#[tokio::test]
async fn test_delete_installation_through_trait() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/app/installations/42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client: Box<dyn GitDataOperations> = Box::new(create_test_client(&mock_server));

    assert!(client.delete_installation(42).await.is_ok());
}

#[test]
fn test_encode_path() {
    assert_eq!(encode_path("README.md"), "README.md");
    assert_eq!(encode_path("/docs/guide.md"), "docs/guide.md");
    assert_eq!(encode_path("docs/my guide.md"), "docs/my%20guide.md");
    assert_eq!(encode_path(""), "");
    assert_eq!(encode_path("docs/a?b#c.md"), "docs/a%3Fb%23c.md");
    assert_eq!(encode_path("../secrets"), "%2E%2E/secrets");
    assert_eq!(encode_path("heads/feature/x"), "heads/feature/x");
}
