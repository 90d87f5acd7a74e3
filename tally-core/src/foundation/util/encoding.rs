use crate::foundation::{Hash32, LedgerError};

pub fn decode_hex(s: &str) -> Result<Vec<u8>, LedgerError> {
    hex::decode(s).map_err(|e| e.into())
}

/// Parse a 32-byte identifier from hex, with or without a `0x` prefix.
pub fn parse_hex_32bytes(s: &str) -> Result<Hash32, LedgerError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes = decode_hex(stripped)?;
    let array: Hash32 = bytes
        .try_into()
        .map_err(|_| LedgerError::EncodingError(format!("expected 32 bytes of hex, got {} chars", stripped.len())))?;
    Ok(array)
}
