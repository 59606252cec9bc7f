//! The encoder (C2): turns a [`Value`] into its canonical wire bytes.
//!
//! The encoder trusts its caller that dictionaries and sets are already in
//! canonical order (see the `canonical` module) — it never sorts.

use std::io;

use crate::value::{BigInt, Value};

const TAG_ERROR_SYMBOL: &str = "desc:error";
const TAG_TAGGED_SYMBOL: &str = "desc:tag";
const TAG_UNDEFINED_SYMBOL: &str = "undefined";
const TAG_NULL_SYMBOL: &str = "null";

/// Encode a value to an owned byte vector, pre-sized via [`encoded_len`].
pub fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(value));
    write_value(value, &mut out);
    out
}

/// Encode a value directly into a `Write` sink, for callers who want to
/// avoid the intermediate buffer (e.g. writing straight onto a socket).
pub fn encode_into<W: io::Write>(value: &Value, writer: &mut W) -> io::Result<()> {
    writer.write_all(&encode(value))
}

/// Exact encoded byte length of a value without allocating, mirroring the
/// teacher's `ToxSize::flat_len` — used to pre-size the output buffer.
pub fn encoded_len(value: &Value) -> usize {
    match value {
        Value::Bool(_) => 1,
        Value::Int(i) => int_decimal_len(*i) + 1,
        Value::BigInt(b) => bigint_encoded_len(b),
        Value::F32(_) => 5,
        Value::F64(_) => 9,
        Value::Bytes(b) => len_prefixed_len(b.len()),
        Value::Str(s) => len_prefixed_len(s.len()),
        Value::Symbol(s) => len_prefixed_len(s.len()),
        Value::List(items) => 2 + items.iter().map(encoded_len).sum::<usize>(),
        Value::Dict(entries) => {
            2 + entries
                .iter()
                .map(|(k, v)| encoded_len(k) + encoded_len(v))
                .sum::<usize>()
        }
        Value::Set(items) => 2 + items.iter().map(encoded_len).sum::<usize>(),
        Value::Record { label, fields } => {
            2 + encoded_len(label) + fields.iter().map(encoded_len).sum::<usize>()
        }
        Value::Tagged { tag, payload } => {
            2 + len_prefixed_len(TAG_TAGGED_SYMBOL.len())
                + len_prefixed_len(tag.len())
                + encoded_len(payload)
        }
        Value::Error { message, id, data } => {
            let data_len = 2
                + data
                    .iter()
                    .map(|(k, v)| encoded_len(k) + encoded_len(v))
                    .sum::<usize>();
            2 + len_prefixed_len(TAG_ERROR_SYMBOL.len())
                + len_prefixed_len(message.len())
                + len_prefixed_len(id.len())
                + data_len
        }
        Value::Undefined => 2 + len_prefixed_len(TAG_UNDEFINED_SYMBOL.len()),
        Value::Null => 2 + len_prefixed_len(TAG_NULL_SYMBOL.len()),
    }
}

fn int_decimal_len(i: i64) -> usize {
    if i == 0 {
        return 1;
    }
    i.unsigned_abs().to_string().len()
}

fn bigint_encoded_len(b: &BigInt) -> usize {
    if b.is_zero() {
        return 1;
    }
    if b.magnitude.len() <= 16 {
        let val = magnitude_to_u128(&b.magnitude).expect("trimmed magnitude <= 16 bytes fits u128");
        val.to_string().len() + 1
    } else {
        let len = b.magnitude.len() + 1;
        1 + len.to_string().len() + 1 + len
    }
}

fn len_prefixed_len(content_len: usize) -> usize {
    content_len.to_string().len() + 1 + content_len
}

fn write_value(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Bool(b) => out.push(if *b { b't' } else { b'f' }),
        Value::Int(i) => write_i64(*i, out),
        Value::BigInt(b) => write_bigint(b, out),
        Value::F32(f) => {
            out.push(b'F');
            out.extend_from_slice(&f.to_be_bytes());
        }
        Value::F64(f) => {
            out.push(b'D');
            out.extend_from_slice(&f.to_be_bytes());
        }
        Value::Bytes(b) => write_len_prefixed(b, b':', out),
        Value::Str(s) => write_len_prefixed(s.as_bytes(), b'"', out),
        Value::Symbol(s) => write_len_prefixed(s.as_bytes(), b'\'', out),
        Value::List(items) => {
            out.push(b'[');
            for item in items {
                write_value(item, out);
            }
            out.push(b']');
        }
        Value::Dict(entries) => {
            out.push(b'{');
            for (k, v) in entries {
                write_value(k, out);
                write_value(v, out);
            }
            out.push(b'}');
        }
        Value::Set(items) => {
            out.push(b'#');
            for item in items {
                write_value(item, out);
            }
            out.push(b'$');
        }
        Value::Record { label, fields } => {
            out.push(b'<');
            write_value(label, out);
            for field in fields {
                write_value(field, out);
            }
            out.push(b'>');
        }
        Value::Tagged { tag, payload } => {
            out.push(b'<');
            write_len_prefixed(TAG_TAGGED_SYMBOL.as_bytes(), b'\'', out);
            write_len_prefixed(tag.as_bytes(), b'"', out);
            write_value(payload, out);
            out.push(b'>');
        }
        Value::Error { message, id, data } => {
            out.push(b'<');
            write_len_prefixed(TAG_ERROR_SYMBOL.as_bytes(), b'\'', out);
            write_len_prefixed(message.as_bytes(), b'"', out);
            write_len_prefixed(id, b':', out);
            out.push(b'{');
            for (k, v) in data {
                write_value(k, out);
                write_value(v, out);
            }
            out.push(b'}');
            out.push(b'>');
        }
        Value::Undefined => {
            out.push(b'<');
            write_len_prefixed(TAG_UNDEFINED_SYMBOL.as_bytes(), b'\'', out);
            out.push(b'>');
        }
        Value::Null => {
            out.push(b'<');
            write_len_prefixed(TAG_NULL_SYMBOL.as_bytes(), b'\'', out);
            out.push(b'>');
        }
    }
}

fn write_i64(i: i64, out: &mut Vec<u8>) {
    if i == 0 {
        out.extend_from_slice(b"0+");
        return;
    }
    let negative = i < 0;
    out.extend_from_slice(i.unsigned_abs().to_string().as_bytes());
    out.push(if negative { b'-' } else { b'+' });
}

fn write_bigint(b: &BigInt, out: &mut Vec<u8>) {
    if b.is_zero() {
        out.extend_from_slice(b"0+");
        return;
    }
    if b.magnitude.len() <= 16 {
        let val = magnitude_to_u128(&b.magnitude).expect("trimmed magnitude <= 16 bytes fits u128");
        out.extend_from_slice(val.to_string().as_bytes());
        out.push(if b.negative { b'-' } else { b'+' });
    } else {
        out.push(b'B');
        let len = b.magnitude.len() + 1;
        out.extend_from_slice(len.to_string().as_bytes());
        out.push(b':');
        out.push(if b.negative { b'-' } else { b'+' });
        out.extend_from_slice(&b.magnitude);
    }
}

fn write_len_prefixed(bytes: &[u8], marker: u8, out: &mut Vec<u8>) {
    out.extend_from_slice(bytes.len().to_string().as_bytes());
    out.push(marker);
    out.extend_from_slice(bytes);
}

fn magnitude_to_u128(magnitude: &[u8]) -> Option<u128> {
    if magnitude.len() > 16 {
        return None;
    }
    let mut buf = [0u8; 16];
    buf[16 - magnitude.len()..].copy_from_slice(magnitude);
    Some(u128::from_be_bytes(buf))
}
