use thiserror::Error;

/// Failure modes surfaced while parsing the wire format.
///
/// Every variant carries the byte offset at which the decoder detected the
/// problem, which is more useful to a caller debugging a malformed frame
/// than a formatted prose string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("invalid format byte {byte:#04x} at offset {offset}")]
    InvalidFormat { offset: usize, byte: u8 },

    #[error("dictionary keys out of canonical order at offset {offset}")]
    NonCanonicalDict { offset: usize },

    #[error("set elements out of canonical order at offset {offset}")]
    NonCanonicalSet { offset: usize },

    #[error("decimal literal overflowed supported big-integer width at offset {offset}")]
    DecimalOverflow { offset: usize },

    #[error("invalid utf-8 in string or symbol at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("unknown record label at offset {offset}")]
    UnknownLabel { offset: usize },

    #[error("trailing bytes after a complete value (offset {offset})")]
    TrailingBytes { offset: usize },
}

impl DecodeError {
    pub fn offset(&self) -> usize {
        match *self {
            DecodeError::UnexpectedEof { offset }
            | DecodeError::InvalidFormat { offset, .. }
            | DecodeError::NonCanonicalDict { offset }
            | DecodeError::NonCanonicalSet { offset }
            | DecodeError::DecimalOverflow { offset }
            | DecodeError::InvalidUtf8 { offset }
            | DecodeError::UnknownLabel { offset }
            | DecodeError::TrailingBytes { offset } => offset,
        }
    }
}
