//! System-wide constants for the tally commit protocol.

/// Nanoseconds per second (10^9).
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Minimum signature-collection timeout in seconds.
///
/// Sessions shorter than this are rejected at config validation time to
/// give remote signers time to validate proposals.
pub const MIN_SESSION_TIMEOUT_SECONDS: u64 = 1;

/// Maximum signature-collection timeout in seconds (1 hour).
///
/// Sessions longer than this are rejected to prevent indefinite resource holds.
pub const MAX_SESSION_TIMEOUT_SECONDS: u64 = 60 * 60;

/// Default signature-collection timeout in seconds.
pub const DEFAULT_SESSION_TIMEOUT_SECONDS: u64 = 60;

/// Blake3 hash size in bytes.
pub const HASH_SIZE: usize = 32;

/// Ed25519 signature size in bytes.
pub const ED25519_SIGNATURE_SIZE: usize = 64;

/// Ed25519 public key size in bytes.
pub const ED25519_PUBKEY_SIZE: usize = 32;

/// Capacity of a mock transport inbox channel.
pub const INBOX_CHANNEL_CAPACITY: usize = 256;

/// Env var overriding wall-clock time in tests (nanoseconds since epoch).
pub const TEST_NOW_NANOS_ENV_VAR: &str = "TALLY_TEST_NOW_NANOS";
