// Tests for vault export parsing

use serde_json::json;
use std::io::Write;
use tempfile::{Builder, NamedTempFile};
use vaultprivacy_core::{MultiPartSuffixes, VaultError, extract_domains, extract_domains_with, extract_uris};

fn json_vault(body: serde_json::Value) -> NamedTempFile {
    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, "{}", body).unwrap();
    file
}

fn vault_with_uris(uris: &[&[&str]]) -> NamedTempFile {
    let items: Vec<serde_json::Value> = uris
        .iter()
        .map(|item| {
            json!({
                "type": 1,
                "login": {"uris": item.iter().map(|uri| json!({"match": null, "uri": uri})).collect::<Vec<_>>()}
            })
        })
        .collect();
    json_vault(json!({"encrypted": false, "folders": [], "items": items}))
}

#[test]
fn test_extract_domains_json() {
    let vault = vault_with_uris(&[&["https://example.com", "https://test.org"]]);
    let domains = extract_domains(vault.path()).unwrap();

    assert_eq!(domains, vec!["example.com", "test.org"]);
}

#[test]
fn test_extract_domains_empty_vault() {
    let vault = json_vault(json!({"encrypted": false, "folders": [], "items": []}));
    assert!(extract_domains(vault.path()).unwrap().is_empty());
}

#[test]
fn test_shared_url_across_items_appears_once() {
    let vault = vault_with_uris(&[&["https://example.com"], &["https://example.com"]]);
    assert_eq!(extract_domains(vault.path()).unwrap(), vec!["example.com"]);
}

#[test]
fn test_different_urls_same_root_appear_once() {
    let vault = vault_with_uris(&[
        &["https://accounts.google.com/login"],
        &["https://github.com", "mail.google.com"],
        &["user@example.com", "  "],
    ]);

    assert_eq!(extract_domains(vault.path()).unwrap(), vec!["google.com", "github.com"]);

    let raw = extract_uris(vault.path()).unwrap();
    assert_eq!(raw.len(), 4);
}

#[test]
fn test_custom_suffixes_apply_during_extraction() {
    let vault = vault_with_uris(&[&["https://shop.store.co.nz"]]);

    assert_eq!(extract_domains(vault.path()).unwrap(), vec!["co.nz"]);

    let mut suffixes = MultiPartSuffixes::default();
    suffixes.extend_from_str("co.nz\n");
    assert_eq!(
        extract_domains_with(vault.path(), &suffixes).unwrap(),
        vec!["store.co.nz"]
    );
}

#[test]
fn test_extract_domains_csv() {
    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "folder,favorite,type,name,notes,fields,reprompt,login_uri,login_username,login_password,login_totp").unwrap();
    writeln!(file, ",,login,GitHub,,,0,https://github.com/login,me,pw,").unwrap();
    writeln!(file, ",,login,Bank,,,0,\"https://www.bank.co.uk,https://m.github.com\",me,pw,").unwrap();

    assert_eq!(
        extract_domains(file.path()).unwrap(),
        vec!["github.com", "bank.co.uk"]
    );
}

#[test]
fn test_missing_file_is_an_error() {
    let result = extract_domains(std::path::Path::new("/definitely/not/here.json"));
    assert!(matches!(result, Err(VaultError::Io { .. })));
}

#[test]
fn test_invalid_json_is_an_error() {
    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, "{{\"items\": [").unwrap();

    assert!(matches!(extract_domains(file.path()), Err(VaultError::Json(_))));
}

#[test]
fn test_unsupported_extension_is_an_error() {
    let file = Builder::new().suffix(".txt").tempfile().unwrap();
    assert!(matches!(
        extract_domains(file.path()),
        Err(VaultError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_top_level_array_is_an_error() {
    let file = json_vault(json!([
        {"login": {"uris": [{"uri": "https://example.com"}]}}
    ]));

    assert!(matches!(
        extract_domains(file.path()),
        Err(VaultError::InvalidStructure(_))
    ));
}
