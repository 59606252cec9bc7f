use thiserror::Error;

/// Failure modes the sync engine surfaces to its caller. None of these are
/// fatal to the engine instance — decoding is total, and apply is only
/// ever entered after a frame has decoded successfully.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("frame or ack record has the wrong label, field count, or field kinds")]
    InvalidLabel,

    #[error("packed cell payload ended mid-record or contained an illegal sentinel")]
    MalformedPayload,

    #[error("codec decode failed: {0}")]
    DecodeError(#[from] cellsync_proto::DecodeError),
}
