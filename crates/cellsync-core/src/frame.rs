//! The frame record (C7): wraps a packed diff payload inside a codec
//! record, plus the `cell-ack` record (§4.6.9).

use cellsync_proto::{BigInt, Value};

use crate::error::SyncError;

pub const FRAME_LABEL: &str = "cell-frame";
pub const ACK_LABEL: &str = "cell-ack";

/// The on-wire shape of a committed snapshot: generation, geometry,
/// source identity, cursor, and the packed cell payload, in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireFrame {
    pub generation: u64,
    pub cols: u32,
    pub rows: u32,
    pub source: u64,
    pub cursor_x: u32,
    pub cursor_y: u32,
    pub packed: Vec<u8>,
}

impl WireFrame {
    pub fn to_value(&self) -> Value {
        Value::record(
            Value::symbol(FRAME_LABEL),
            vec![
                value_from_u64(self.generation),
                Value::Int(self.cols as i64),
                Value::Int(self.rows as i64),
                value_from_u64(self.source),
                Value::Int(self.cursor_x as i64),
                Value::Int(self.cursor_y as i64),
                Value::Bytes(self.packed.clone()),
            ],
        )
    }

    pub fn from_value(value: &Value) -> Result<Self, SyncError> {
        let (label, fields) = as_record(value)?;
        if label.as_symbol() != Some(FRAME_LABEL) || fields.len() < 7 {
            return Err(SyncError::InvalidLabel);
        }
        Ok(WireFrame {
            generation: field_u64(&fields[0])?,
            cols: field_u32(&fields[1])?,
            rows: field_u32(&fields[2])?,
            source: field_u64(&fields[3])?,
            cursor_x: field_u32(&fields[4])?,
            cursor_y: field_u32(&fields[5])?,
            packed: field_bytes(&fields[6])?.to_vec(),
        })
    }

    /// Extracts only the cursor position, without touching the packed
    /// payload — for peers that render locally and just need to track a
    /// remote cursor cheaply.
    pub fn cursor_only(value: &Value) -> Result<(u32, u32), SyncError> {
        let (label, fields) = as_record(value)?;
        if label.as_symbol() != Some(FRAME_LABEL) || fields.len() < 6 {
            return Err(SyncError::InvalidLabel);
        }
        Ok((field_u32(&fields[4])?, field_u32(&fields[5])?))
    }
}

/// The `cell-ack` record: `[node_id, generation]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub node_id: u64,
    pub generation: u64,
}

impl Ack {
    pub fn to_value(&self) -> Value {
        Value::record(
            Value::symbol(ACK_LABEL),
            vec![value_from_u64(self.node_id), value_from_u64(self.generation)],
        )
    }

    pub fn from_value(value: &Value) -> Result<Self, SyncError> {
        let (label, fields) = as_record(value)?;
        if label.as_symbol() != Some(ACK_LABEL) || fields.len() < 2 {
            return Err(SyncError::InvalidLabel);
        }
        Ok(Ack {
            node_id: field_u64(&fields[0])?,
            generation: field_u64(&fields[1])?,
        })
    }
}

fn as_record(value: &Value) -> Result<(&Value, &[Value]), SyncError> {
    match value {
        Value::Record { label, fields } => Ok((label.as_ref(), fields.as_slice())),
        _ => Err(SyncError::InvalidLabel),
    }
}

/// `source`/`node_id`/`generation` are documented `unsigned 64` (§3.3/§3.5):
/// values at or below `i64::MAX` ride as a plain integer, larger ones
/// promote to a positive big-integer rather than reinterpreting the high
/// bit as a sign (§3.6).
fn value_from_u64(v: u64) -> Value {
    if v <= i64::MAX as u64 {
        Value::Int(v as i64)
    } else {
        Value::BigInt(BigInt::from_parts(false, v.to_be_bytes().to_vec()))
    }
}

fn field_u64(value: &Value) -> Result<u64, SyncError> {
    match value {
        Value::Int(i) if *i >= 0 => Ok(*i as u64),
        Value::BigInt(b) if !b.negative && b.magnitude.len() <= 8 => {
            let mut buf = [0u8; 8];
            buf[8 - b.magnitude.len()..].copy_from_slice(&b.magnitude);
            Ok(u64::from_be_bytes(buf))
        }
        _ => Err(SyncError::InvalidLabel),
    }
}

fn field_u32(value: &Value) -> Result<u32, SyncError> {
    value.as_int().map(|i| i as u32).ok_or(SyncError::InvalidLabel)
}

fn field_bytes(value: &Value) -> Result<&[u8], SyncError> {
    value.as_bytes().ok_or(SyncError::InvalidLabel)
}
