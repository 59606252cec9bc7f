//! The decoder (C3): a single-pass, zero-copy byte-slice walker.
//!
//! String, symbol, and bytes values borrow directly from the input slice
//! rather than landing in a caller-visible arena — their lifetime is tied
//! to the input buffer the same way `rmp::decode`'s borrowed reads are tied
//! to the underlying reader in the teacher's codec.

use crate::error::DecodeError;
use crate::value::{BigInt, Value};

const LABEL_TAGGED: &str = "desc:tag";
const LABEL_ERROR: &str = "desc:error";
const LABEL_UNDEFINED: &str = "undefined";
const LABEL_NULL: &str = "null";

/// Decode exactly one value from `input`, failing if any bytes remain
/// after it.
pub fn decode(input: &[u8]) -> Result<Value, DecodeError> {
    let mut decoder = Decoder::new(input);
    let value = decoder.decode_value()?;
    if decoder.pos != decoder.input.len() {
        return Err(DecodeError::TrailingBytes { offset: decoder.pos });
    }
    Ok(value)
}

pub struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Decoder { input, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn require_peek(&self) -> Result<u8, DecodeError> {
        self.peek()
            .ok_or(DecodeError::UnexpectedEof { offset: self.pos })
    }

    fn advance(&mut self) -> Result<u8, DecodeError> {
        let b = self.require_peek()?;
        self.pos += 1;
        Ok(b)
    }

    fn expect(&mut self, byte: u8) -> Result<(), DecodeError> {
        let got = self.advance()?;
        if got != byte {
            return Err(DecodeError::InvalidFormat {
                offset: self.pos - 1,
                byte: got,
            });
        }
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.pos + n > self.input.len() {
            return Err(DecodeError::UnexpectedEof { offset: self.pos });
        }
        let slice = &self.input[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Fast decimal scan: accepts 1..=19 ASCII digits. Longer runs fall
    /// through to `DecimalOverflow`; callers that need arbitrary-length
    /// decimal integers (the big-integer decimal fast path) use
    /// `scan_decimal_digits` directly instead.
    fn scan_usize(&mut self) -> Result<usize, DecodeError> {
        let start = self.pos;
        let digits = self.scan_decimal_digits()?;
        digits
            .parse::<usize>()
            .map_err(|_| DecodeError::DecimalOverflow { offset: start })
    }

    /// Scans a run of ASCII digits and returns them as a borrowed `&str`.
    /// Length is unbounded here; overflow into `i64`/`usize` is handled by
    /// the caller, since big integers legitimately need long decimal runs.
    fn scan_decimal_digits(&mut self) -> Result<&'a str, DecodeError> {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(DecodeError::InvalidFormat {
                offset: start,
                byte: self.peek().unwrap_or(0),
            });
        }
        std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| DecodeError::InvalidFormat { offset: start, byte: 0 })
    }

    fn decode_string_content(&mut self, bytes: &'a [u8], offset: usize) -> Result<String, DecodeError> {
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| DecodeError::InvalidUtf8 { offset })
    }

    pub fn decode_value(&mut self) -> Result<Value, DecodeError> {
        match self.require_peek()? {
            b't' => {
                self.pos += 1;
                Ok(Value::Bool(true))
            }
            b'f' => {
                self.pos += 1;
                Ok(Value::Bool(false))
            }
            b'F' => {
                self.pos += 1;
                let bytes = self.take(4)?;
                let mut buf = [0u8; 4];
                buf.copy_from_slice(bytes);
                Ok(Value::F32(f32::from_be_bytes(buf)))
            }
            b'D' => {
                self.pos += 1;
                let bytes = self.take(8)?;
                let mut buf = [0u8; 8];
                buf.copy_from_slice(bytes);
                Ok(Value::F64(f64::from_be_bytes(buf)))
            }
            b'B' => {
                self.pos += 1;
                let len = self.scan_usize()?;
                self.expect(b':')?;
                if len == 0 {
                    return Err(DecodeError::InvalidFormat {
                        offset: self.pos,
                        byte: 0,
                    });
                }
                let payload = self.take(len)?;
                let sign_byte = payload[0];
                let negative = match sign_byte {
                    b'+' => false,
                    b'-' => true,
                    other => {
                        return Err(DecodeError::InvalidFormat {
                            offset: self.pos - len,
                            byte: other,
                        })
                    }
                };
                let magnitude = payload[1..].to_vec();
                Ok(Value::BigInt(BigInt::from_parts(negative, magnitude)))
            }
            b'[' => {
                self.pos += 1;
                let mut items = Vec::new();
                while self.peek() != Some(b']') {
                    items.push(self.decode_value()?);
                }
                self.pos += 1;
                Ok(Value::List(items))
            }
            b'{' => {
                self.pos += 1;
                let mut entries = Vec::new();
                let mut prev_key_span: Option<&'a [u8]> = None;
                while self.peek() != Some(b'}') {
                    let key_start = self.pos;
                    let key = self.decode_value()?;
                    let key_span = &self.input[key_start..self.pos];
                    if let Some(prev) = prev_key_span {
                        if key_span <= prev {
                            return Err(DecodeError::NonCanonicalDict { offset: key_start });
                        }
                    }
                    prev_key_span = Some(key_span);
                    let value = self.decode_value()?;
                    entries.push((key, value));
                }
                self.pos += 1;
                Ok(Value::Dict(entries))
            }
            b'#' => {
                self.pos += 1;
                let mut items = Vec::new();
                let mut prev_span: Option<&'a [u8]> = None;
                while self.peek() != Some(b'$') {
                    let start = self.pos;
                    let item = self.decode_value()?;
                    let span = &self.input[start..self.pos];
                    if let Some(prev) = prev_span {
                        if span <= prev {
                            return Err(DecodeError::NonCanonicalSet { offset: start });
                        }
                    }
                    prev_span = Some(span);
                    items.push(item);
                }
                self.pos += 1;
                Ok(Value::Set(items))
            }
            b'<' => {
                self.pos += 1;
                let label = self.decode_value()?;
                let record = match label.as_symbol() {
                    Some(LABEL_TAGGED) => {
                        let tag_start = self.pos;
                        let tag_value = self.decode_value()?;
                        let tag = match tag_value {
                            Value::Str(s) => s,
                            _ => return Err(DecodeError::UnknownLabel { offset: tag_start }),
                        };
                        let payload = self.decode_value()?;
                        Value::Tagged {
                            tag,
                            payload: Box::new(payload),
                        }
                    }
                    Some(LABEL_ERROR) => {
                        let msg_start = self.pos;
                        let message = match self.decode_value()? {
                            Value::Str(s) => s,
                            _ => return Err(DecodeError::UnknownLabel { offset: msg_start }),
                        };
                        let id_start = self.pos;
                        let id = match self.decode_value()? {
                            Value::Bytes(b) => b,
                            _ => return Err(DecodeError::UnknownLabel { offset: id_start }),
                        };
                        let data_start = self.pos;
                        let data = match self.decode_value()? {
                            Value::Dict(entries) => entries,
                            _ => return Err(DecodeError::UnknownLabel { offset: data_start }),
                        };
                        Value::Error { message, id, data }
                    }
                    Some(LABEL_UNDEFINED) => Value::Undefined,
                    Some(LABEL_NULL) => Value::Null,
                    _ => {
                        let mut fields = Vec::new();
                        while self.peek() != Some(b'>') {
                            fields.push(self.decode_value()?);
                        }
                        Value::Record {
                            label: Box::new(label),
                            fields,
                        }
                    }
                };
                self.expect(b'>')?;
                Ok(record)
            }
            b if b.is_ascii_digit() => self.decode_length_prefixed_or_int(),
            other => Err(DecodeError::InvalidFormat {
                offset: self.pos,
                byte: other,
            }),
        }
    }

    fn decode_length_prefixed_or_int(&mut self) -> Result<Value, DecodeError> {
        let digit_start = self.pos;
        let digits = self.scan_decimal_digits()?;
        match self.peek() {
            Some(b'+') | Some(b'-') => {
                let negative = self.advance()? == b'-';
                if digits.len() <= crate::constants::MAX_FAST_DECIMAL_DIGITS {
                    if let Ok(magnitude) = digits.parse::<i64>() {
                        let value = if negative { magnitude.checked_neg() } else { Some(magnitude) };
                        if let Some(v) = value {
                            return Ok(Value::Int(v));
                        }
                    }
                }
                let magnitude = decimal_str_to_magnitude(digits);
                Ok(Value::BigInt(BigInt::from_parts(negative, magnitude)))
            }
            Some(b':') => {
                self.pos += 1;
                let len = digits
                    .parse::<usize>()
                    .map_err(|_| DecodeError::DecimalOverflow { offset: digit_start })?;
                let bytes = self.take(len)?;
                Ok(Value::Bytes(bytes.to_vec()))
            }
            Some(b'"') => {
                self.pos += 1;
                let len = digits
                    .parse::<usize>()
                    .map_err(|_| DecodeError::DecimalOverflow { offset: digit_start })?;
                let offset = self.pos;
                let bytes = self.take(len)?;
                Ok(Value::Str(self.decode_string_content(bytes, offset)?))
            }
            Some(b'\'') => {
                self.pos += 1;
                let len = digits
                    .parse::<usize>()
                    .map_err(|_| DecodeError::DecimalOverflow { offset: digit_start })?;
                let offset = self.pos;
                let bytes = self.take(len)?;
                Ok(Value::Symbol(self.decode_string_content(bytes, offset)?))
            }
            Some(other) => Err(DecodeError::InvalidFormat {
                offset: self.pos,
                byte: other,
            }),
            None => Err(DecodeError::UnexpectedEof { offset: self.pos }),
        }
    }
}

/// Converts an arbitrary-length decimal digit string into a big-endian,
/// leading-zero-trimmed magnitude via repeated multiply-by-ten-add-digit —
/// the standard way to parse a bignum literal without a bignum crate.
fn decimal_str_to_magnitude(digits: &str) -> Vec<u8> {
    let mut le_bytes: Vec<u8> = vec![0];
    for ch in digits.bytes() {
        let digit = (ch - b'0') as u32;
        let mut carry = digit;
        for b in le_bytes.iter_mut() {
            let v = (*b as u32) * 10 + carry;
            *b = (v & 0xFF) as u8;
            carry = v >> 8;
        }
        while carry > 0 {
            le_bytes.push((carry & 0xFF) as u8);
            carry >>= 8;
        }
    }
    le_bytes.reverse();
    let first_nonzero = le_bytes.iter().position(|&b| b != 0).unwrap_or(le_bytes.len());
    le_bytes[first_nonzero..].to_vec()
}
