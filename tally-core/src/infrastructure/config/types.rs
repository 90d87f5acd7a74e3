use crate::foundation::constants::DEFAULT_SESSION_TIMEOUT_SECONDS;
use serde::{Deserialize, Serialize};

/// Base configuration for a party node.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Logical name of the local party.
    #[serde(default)]
    pub party: String,
    /// Fixed notarizing authority this node submits to.
    ///
    /// The authority identity is configuration, not discovery; it must also
    /// appear in `peers` so its stamp can be attributed.
    #[serde(default)]
    pub notary: String,
    /// How long the coordinator waits at the signature-collection barrier.
    #[serde(default = "default_session_timeout_seconds")]
    pub session_timeout_seconds: u64,
    /// Optional directory for log files. Console-only when absent.
    #[serde(default)]
    pub log_dir: Option<String>,
    /// Log filter expression, e.g. `"info"` or `"tally_core=debug"`.
    #[serde(default = "default_log_filters")]
    pub log_filters: String,
    /// Known parties and their verification keys.
    #[serde(default)]
    pub peers: Vec<PeerEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeerEntry {
    pub name: String,
    /// Ed25519 verification key, hex encoded (32 bytes).
    pub public_key: String,
}

fn default_session_timeout_seconds() -> u64 {
    DEFAULT_SESSION_TIMEOUT_SECONDS
}

fn default_log_filters() -> String {
    "info".to_string()
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            party: String::new(),
            notary: String::new(),
            session_timeout_seconds: default_session_timeout_seconds(),
            log_dir: None,
            log_filters: default_log_filters(),
            peers: Vec::new(),
        }
    }
}
