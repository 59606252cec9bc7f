//! The tagged value model (C1): every wire-representable kind, plus the
//! canonical ordering, equality, and hashing rules that the encoder, decoder
//! and canonical builders all agree on.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Arbitrary-precision signed integer, used once a value's magnitude no
/// longer fits in an `i64`. Magnitude is big-endian with no leading zero
/// bytes; zero is represented with an empty magnitude and `negative = false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigInt {
    pub negative: bool,
    pub magnitude: Vec<u8>,
}

impl BigInt {
    pub fn from_parts(negative: bool, magnitude: Vec<u8>) -> Self {
        let trimmed = trim_leading_zeros(&magnitude);
        let negative = negative && !trimmed.is_empty();
        BigInt {
            negative,
            magnitude: trimmed,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_empty()
    }
}

fn trim_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[first_nonzero..].to_vec()
}

/// A codec value. Dictionaries and sets are stored as plain vectors; it is
/// the caller's responsibility (see `canonical` module) to have sorted them
/// before constructing a value that will be encoded — the encoder does not
/// re-sort, it trusts canonical order exactly as `merkle_tox_core`'s DAG
/// nodes trust their caller to have sorted parent hashes before hashing.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    BigInt(BigInt),
    F32(f32),
    F64(f64),
    Bytes(Vec<u8>),
    Str(String),
    Symbol(String),
    List(Vec<Value>),
    Dict(Vec<(Value, Value)>),
    Set(Vec<Value>),
    Record {
        label: Box<Value>,
        fields: Vec<Value>,
    },
    Tagged {
        tag: String,
        payload: Box<Value>,
    },
    Error {
        message: String,
        id: Vec<u8>,
        data: Vec<(Value, Value)>,
    },
    Undefined,
    Null,
}

impl Value {
    pub fn symbol(s: impl Into<String>) -> Value {
        Value::Symbol(s.into())
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value::Str(s.into())
    }

    pub fn record(label: Value, fields: Vec<Value>) -> Value {
        Value::Record {
            label: Box::new(label),
            fields,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// The wire-ordering rank used as the primary sort key (§4.1).
    fn rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Int(_) | Value::BigInt(_) => 1,
            Value::F32(_) => 2,
            Value::F64(_) => 3,
            Value::Bytes(_) => 4,
            Value::Str(_) => 5,
            Value::Symbol(_) => 6,
            Value::List(_) => 7,
            Value::Dict(_) => 8,
            Value::Set(_) => 9,
            Value::Record { .. }
            | Value::Tagged { .. }
            | Value::Error { .. }
            | Value::Undefined
            | Value::Null => 10,
        }
    }

    /// Synthetic (label, fields) projection used to compare the five
    /// record-like kinds against each other uniformly (§4.1).
    fn record_like_repr(&self) -> (Value, Vec<Value>) {
        match self {
            Value::Record { label, fields } => ((**label).clone(), fields.clone()),
            Value::Tagged { tag, payload } => (
                Value::symbol("desc:tag"),
                vec![Value::string(tag.clone()), (**payload).clone()],
            ),
            Value::Error { message, id, data } => (
                Value::symbol("desc:error"),
                vec![
                    Value::string(message.clone()),
                    Value::Bytes(id.clone()),
                    Value::Dict(data.clone()),
                ],
            ),
            Value::Undefined => (Value::symbol("undefined"), vec![]),
            Value::Null => (Value::symbol("null"), vec![]),
            _ => unreachable!("record_like_repr called on a non-record-like value"),
        }
    }
}

/// Length-prefixed comparison rule: compare the decimal string of the
/// length first, then the raw bytes. This is what makes a length-9 token
/// sort after a length-10 token — "9" > "10" as ASCII strings even though
/// 9 < 10 numerically.
fn compare_len_prefixed(a: &[u8], b: &[u8]) -> Ordering {
    let len_order = a.len().to_string().cmp(&b.len().to_string());
    if len_order != Ordering::Equal {
        return len_order;
    }
    a.cmp(b)
}

fn to_signed_magnitude(v: &Value) -> (bool, Vec<u8>) {
    match v {
        Value::Int(i) => {
            if *i == 0 {
                (false, Vec::new())
            } else {
                let negative = *i < 0;
                let magnitude = trim_leading_zeros(&i.unsigned_abs().to_be_bytes());
                (negative, magnitude)
            }
        }
        Value::BigInt(b) => (b.negative, b.magnitude.clone()),
        _ => unreachable!("to_signed_magnitude called on a non-integer value"),
    }
}

fn magnitude_cmp(a: &[u8], b: &[u8]) -> Ordering {
    match a.len().cmp(&b.len()) {
        Ordering::Equal => a.cmp(b),
        other => other,
    }
}

fn int_cmp(a: &Value, b: &Value) -> Ordering {
    let (a_neg, a_mag) = to_signed_magnitude(a);
    let (b_neg, b_mag) = to_signed_magnitude(b);
    let a_zero = a_mag.is_empty();
    let b_zero = b_mag.is_empty();
    if a_zero && b_zero {
        return Ordering::Equal;
    }
    let a_neg = a_neg && !a_zero;
    let b_neg = b_neg && !b_zero;
    match (a_neg, b_neg) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) => magnitude_cmp(&b_mag, &a_mag),
        (false, false) => magnitude_cmp(&a_mag, &b_mag),
    }
}

/// Canonical total order on values (§4.1). Used both by the canonical
/// builders (C4), to sort dictionary keys and set elements, and indirectly
/// by the decoder's raw-byte-span check (which compares the already
/// length-prefixed wire bytes directly — `tests::raw_span_order_matches_structural_order`
/// asserts the two routes agree).
pub fn compare(a: &Value, b: &Value) -> Ordering {
    let (ra, rb) = (a.rank(), b.rank());
    if ra != rb {
        return ra.cmp(&rb);
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Int(_) | Value::BigInt(_), Value::Int(_) | Value::BigInt(_)) => int_cmp(a, b),
        (Value::F32(x), Value::F32(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::F64(x), Value::F64(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::Bytes(x), Value::Bytes(y)) => compare_len_prefixed(x, y),
        (Value::Str(x), Value::Str(y)) => compare_len_prefixed(x.as_bytes(), y.as_bytes()),
        (Value::Symbol(x), Value::Symbol(y)) => compare_len_prefixed(x.as_bytes(), y.as_bytes()),
        (Value::List(x), Value::List(y)) => x.cmp(y),
        (Value::Dict(x), Value::Dict(y)) => x.cmp(y),
        (Value::Set(x), Value::Set(y)) => x.cmp(y),
        _ => {
            let (la, fa) = a.record_like_repr();
            let (lb, fb) = b.record_like_repr();
            match compare(&la, &lb) {
                Ordering::Equal => fa.cmp(&fb),
                other => other,
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        crate::encode::encode(self) == crate::encode::encode(other)
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(compare(self, other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        crate::encode::encode(self).hash(state);
    }
}
