use std::io::Write;
use tally_core::foundation::LedgerError;
use tally_core::infrastructure::config::{identity_directory, load_config_from_file};
use tally_core::infrastructure::identity::IdentityResolver;

fn sample_key(fill: u8) -> String {
    let key = ed25519_dalek::SigningKey::from_bytes(&[fill; 32]);
    hex::encode(key.verifying_key().to_bytes())
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().expect("tempfile");
    file.write_all(contents.as_bytes()).expect("write");
    file
}

#[test]
fn loads_a_complete_config_and_builds_the_directory() {
    let contents = format!(
        r#"
party = "alice"
notary = "notary"
session_timeout_seconds = 30
log_filters = "debug"

[[peers]]
name = "alice"
public_key = "{}"

[[peers]]
name = "notary"
public_key = "{}"
"#,
        sample_key(1),
        sample_key(2),
    );
    let file = write_config(&contents);

    let config = load_config_from_file(file.path()).expect("load");
    assert_eq!(config.party, "alice");
    assert_eq!(config.notary, "notary");
    assert_eq!(config.session_timeout_seconds, 30);
    assert_eq!(config.log_filters, "debug");
    assert_eq!(config.peers.len(), 2);

    let directory = identity_directory(&config).expect("directory");
    directory.resolve("alice").expect("alice resolvable");
    assert!(directory.resolve("ghost").is_err());

    let settings = tally_core::application::CommitSettings::from_config(&config);
    assert_eq!(settings.notary_party.as_str(), "notary");
    assert_eq!(settings.session_timeout, std::time::Duration::from_secs(30));
}

#[test]
fn defaults_fill_in_optional_fields() {
    let contents = format!(
        r#"
party = "alice"
notary = "notary"

[[peers]]
name = "notary"
public_key = "{}"
"#,
        sample_key(3),
    );
    let file = write_config(&contents);

    let config = load_config_from_file(file.path()).expect("load");
    assert_eq!(config.session_timeout_seconds, 60);
    assert_eq!(config.log_filters, "info");
    assert!(config.log_dir.is_none());
}

#[test]
fn invalid_configs_are_rejected_with_a_config_error() {
    // Missing notary entirely.
    let file = write_config("party = \"alice\"\n");
    assert!(matches!(load_config_from_file(file.path()), Err(LedgerError::ConfigError(_))));

    // Notary not present in the peer list.
    let contents = format!(
        r#"
party = "alice"
notary = "notary"

[[peers]]
name = "alice"
public_key = "{}"
"#,
        sample_key(4),
    );
    let file = write_config(&contents);
    assert!(matches!(load_config_from_file(file.path()), Err(LedgerError::ConfigError(_))));

    // Malformed public key.
    let contents = r#"
party = "alice"
notary = "notary"

[[peers]]
name = "notary"
public_key = "not-hex"
"#;
    let file = write_config(contents);
    assert!(matches!(load_config_from_file(file.path()), Err(LedgerError::ConfigError(_))));
}
