use crate::foundation::constants::{MAX_SESSION_TIMEOUT_SECONDS, MIN_SESSION_TIMEOUT_SECONDS};
use crate::foundation::util::encoding::decode_hex;
use crate::foundation::{LedgerError, PartyId};
use crate::infrastructure::config::types::NodeConfig;
use crate::infrastructure::identity::StaticDirectory;
use ed25519_dalek::VerifyingKey;
use std::collections::HashSet;

pub fn validate_config(config: &NodeConfig) -> Result<(), LedgerError> {
    if config.party.trim().is_empty() {
        return Err(LedgerError::ConfigError("party name is required".to_string()));
    }
    if config.notary.trim().is_empty() {
        return Err(LedgerError::ConfigError("notary name is required".to_string()));
    }
    if config.session_timeout_seconds < MIN_SESSION_TIMEOUT_SECONDS
        || config.session_timeout_seconds > MAX_SESSION_TIMEOUT_SECONDS
    {
        return Err(LedgerError::ConfigError(format!(
            "session_timeout_seconds must be within [{}, {}], got {}",
            MIN_SESSION_TIMEOUT_SECONDS, MAX_SESSION_TIMEOUT_SECONDS, config.session_timeout_seconds
        )));
    }

    let mut seen = HashSet::new();
    for peer in &config.peers {
        if peer.name.trim().is_empty() {
            return Err(LedgerError::ConfigError("peer name must not be empty".to_string()));
        }
        if !seen.insert(peer.name.as_str()) {
            return Err(LedgerError::ConfigError(format!("duplicate peer entry: {}", peer.name)));
        }
        parse_verifying_key(&peer.name, &peer.public_key)?;
    }
    if !seen.contains(config.notary.as_str()) {
        return Err(LedgerError::ConfigError(format!("notary {} is not listed in peers", config.notary)));
    }
    Ok(())
}

/// Build the static identity directory from the validated peer list.
pub fn identity_directory(config: &NodeConfig) -> Result<StaticDirectory, LedgerError> {
    let mut entries = Vec::with_capacity(config.peers.len());
    for peer in &config.peers {
        entries.push((PartyId::from(peer.name.as_str()), parse_verifying_key(&peer.name, &peer.public_key)?));
    }
    Ok(StaticDirectory::from_entries(entries))
}

fn parse_verifying_key(name: &str, public_key_hex: &str) -> Result<VerifyingKey, LedgerError> {
    let bytes = decode_hex(public_key_hex.trim())
        .map_err(|err| LedgerError::ConfigError(format!("peer {} public_key is not hex: {}", name, err)))?;
    let array: [u8; 32] = bytes
        .try_into()
        .map_err(|_| LedgerError::ConfigError(format!("peer {} public_key must be 32 bytes", name)))?;
    VerifyingKey::from_bytes(&array)
        .map_err(|err| LedgerError::ConfigError(format!("peer {} public_key invalid: {}", name, err)))
}
