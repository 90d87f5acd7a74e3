use crate::foundation::types::PartyId;
use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    MalformedIntent,
    ConservationViolation,
    ArithmeticOverflow,
    SignerMissing,
    Irrelevant,
    PeerUnreachable,
    NotarizationRejected,
    UnknownOperation,
    InvalidStateTransition,
    IdentityUnknown,
    SignatureInvalid,
    RecordMissing,
    DuplicateSignature,
    ConfigError,
    StorageError,
    TransportError,
    SerializationError,
    EncodingError,
    Message,
}

#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub code: ErrorCode,
    pub message: String,
}

/// The structural/conservation rule a rejected transition violated.
///
/// Signer-coverage failures are reported as [`LedgerError::SignerMissing`]
/// and summation overflow as [`LedgerError::ArithmeticOverflow`]; this enum
/// only names the shape and balance rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationRule {
    IssueConsumesRecords,
    IssueProducesNothing,
    MoveConsumesNothing,
    MoveProducesNothing,
    RedeemConsumesNothing,
    RedeemProducesRecords,
    QuantityNotPositive { quantity: i64 },
    IssuerSetChanged,
    IssuerSumChanged { issuer: PartyId, consumed: i64, produced: i64 },
}

impl std::fmt::Display for ConservationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IssueConsumesRecords => write!(f, "an issue must not consume records"),
            Self::IssueProducesNothing => write!(f, "an issue must produce records"),
            Self::MoveConsumesNothing => write!(f, "a move must consume records"),
            Self::MoveProducesNothing => write!(f, "a move must produce records"),
            Self::RedeemConsumesNothing => write!(f, "a redeem must consume records"),
            Self::RedeemProducesRecords => write!(f, "a redeem must not produce records"),
            Self::QuantityNotPositive { quantity } => write!(f, "record quantity must be positive, got {}", quantity),
            Self::IssuerSetChanged => write!(f, "consumed and produced issuer sets differ"),
            Self::IssuerSumChanged { issuer, consumed, produced } => {
                write!(f, "sum for issuer {} not conserved: consumed {}, produced {}", issuer, consumed, produced)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("malformed intent: {0}")]
    MalformedIntent(String),

    #[error("conservation violation: {rule}")]
    ConservationViolation { rule: ConservationRule },

    #[error("balance summation overflow for issuer {issuer}")]
    ArithmeticOverflow { issuer: PartyId },

    #[error("required signer missing: {party}")]
    SignerMissing { party: PartyId },

    #[error("party {party} has no stake in this transition")]
    Irrelevant { party: PartyId },

    #[error("peer {party} unreachable: {details}")]
    PeerUnreachable { party: PartyId, details: String },

    #[error("notarization rejected: {reason}")]
    NotarizationRejected { reason: String },

    #[error("unknown operation tag: {tag}")]
    UnknownOperation { tag: String },

    #[error("invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("unknown party identity: {party}")]
    IdentityUnknown { party: PartyId },

    #[error("invalid signature from {party}")]
    SignatureInvalid { party: PartyId },

    #[error("record not found: {reference}")]
    RecordMissing { reference: String },

    #[error("duplicate signature from {party}")]
    DuplicateSignature { party: PartyId },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("storage error during {operation}: {details}")]
    StorageError { operation: String, details: String },

    #[error("transport error during {operation}: {details}")]
    TransportError { operation: String, details: String },

    #[error("{format} serialization error: {details}")]
    SerializationError { format: String, details: String },

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LedgerError::MalformedIntent(_) => ErrorCode::MalformedIntent,
            LedgerError::ConservationViolation { .. } => ErrorCode::ConservationViolation,
            LedgerError::ArithmeticOverflow { .. } => ErrorCode::ArithmeticOverflow,
            LedgerError::SignerMissing { .. } => ErrorCode::SignerMissing,
            LedgerError::Irrelevant { .. } => ErrorCode::Irrelevant,
            LedgerError::PeerUnreachable { .. } => ErrorCode::PeerUnreachable,
            LedgerError::NotarizationRejected { .. } => ErrorCode::NotarizationRejected,
            LedgerError::UnknownOperation { .. } => ErrorCode::UnknownOperation,
            LedgerError::InvalidStateTransition { .. } => ErrorCode::InvalidStateTransition,
            LedgerError::IdentityUnknown { .. } => ErrorCode::IdentityUnknown,
            LedgerError::SignatureInvalid { .. } => ErrorCode::SignatureInvalid,
            LedgerError::RecordMissing { .. } => ErrorCode::RecordMissing,
            LedgerError::DuplicateSignature { .. } => ErrorCode::DuplicateSignature,
            LedgerError::ConfigError(_) => ErrorCode::ConfigError,
            LedgerError::StorageError { .. } => ErrorCode::StorageError,
            LedgerError::TransportError { .. } => ErrorCode::TransportError,
            LedgerError::SerializationError { .. } => ErrorCode::SerializationError,
            LedgerError::EncodingError(_) => ErrorCode::EncodingError,
            LedgerError::Message(_) => ErrorCode::Message,
        }
    }

    pub fn context(&self) -> ErrorContext {
        ErrorContext { code: self.code(), message: self.to_string() }
    }

    pub fn violation(rule: ConservationRule) -> Self {
        LedgerError::ConservationViolation { rule }
    }
}

impl From<hex::FromHexError> for LedgerError {
    fn from(err: hex::FromHexError) -> Self {
        LedgerError::EncodingError(format!("hex decode error: {}", err))
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::ConfigError(format!("TOML parsing error: {}", err))
    }
}

impl From<bincode::Error> for LedgerError {
    fn from(err: bincode::Error) -> Self {
        LedgerError::SerializationError { format: "bincode".to_string(), details: err.to_string() }
    }
}

impl From<io::Error> for LedgerError {
    fn from(err: io::Error) -> Self {
        LedgerError::StorageError { operation: "io".to_string(), details: err.to_string() }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::SerializationError { format: "json".to_string(), details: err.to_string() }
    }
}

// NOTE: Avoid adding generic "stringly" error conversions here.
// Use structured `LedgerError` variants at the call site to preserve context.
