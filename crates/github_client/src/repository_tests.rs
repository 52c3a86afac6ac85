use super::*;
use serde_json::from_str;

#[test]
fn test_repository_ref_display() {
    let repo = RepositoryRef::new("acme", "widgets");

    assert_eq!(repo.to_string(), "acme/widgets");
    assert_eq!(repo.full_name(), "acme/widgets");
}

#[test]
fn test_repository_deserialization() {
    let json_str = r#"{
        "id": 1296269,
        "name": "widgets",
        "full_name": "acme/widgets",
        "owner": {"login": "acme", "id": 1, "type": "Organization"},
        "private": true,
        "default_branch": "master"
    }"#;

    let repo: Repository = from_str(json_str).expect("Failed to deserialize Repository");

    assert_eq!(repo.name, "widgets");
    assert_eq!(repo.owner.login, "acme");
    assert!(repo.private);
    assert_eq!(repo.to_ref(), RepositoryRef::new("acme", "widgets"));
}

#[test]
fn test_repository_list_deserialization() {
    let json_str = r#"{
        "total_count": 1,
        "repositories": [{"owner": {"login": "acme"}, "name": "widgets"}]
    }"#;

    let list: RepositoryList = from_str(json_str).unwrap();

    assert_eq!(list.total_count, 1);
    assert_eq!(list.repositories[0].to_ref().full_name(), "acme/widgets");
}

#[test]
fn test_repository_list_without_total_count() {
    let list: RepositoryList = from_str(r#"{"repositories": []}"#).unwrap();

    assert_eq!(list.total_count, 0);
    assert!(list.repositories.is_empty());
}
