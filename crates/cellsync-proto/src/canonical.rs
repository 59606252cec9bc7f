//! Canonical builders (C4): sort dictionary keys and set elements into
//! wire-canonical order, and compute the content identifier of a value.
//!
//! Grounded in `merkle_tox_core::dag::MerkleNode::hash` (serialize, then
//! hash the bytes, then newtype-wrap the digest) — but using SHA-256
//! rather than the teacher's blake3, per this protocol's choice of hash.

use std::cmp::Ordering;
use std::fmt;

use sha2::{Digest, Sha256};

use crate::constants::SMALL_CONTAINER_THRESHOLD;
use crate::value::{compare, Value};

/// Build a canonical dictionary value from unsorted entries, sorting by
/// key and dropping duplicate keys (last write wins).
pub fn build_dict(mut entries: Vec<(Value, Value)>) -> Value {
    sort_by(&mut entries, |a, b| compare(&a.0, &b.0));
    entries.dedup_by(|a, b| compare(&a.0, &b.0) == Ordering::Equal);
    Value::Dict(entries)
}

/// Build a canonical set value from unsorted elements, sorting and
/// deduplicating by the §4.1 comparator.
pub fn build_set(mut elements: Vec<Value>) -> Value {
    sort_by(&mut elements, compare);
    elements.dedup_by(|a, b| compare(a, b) == Ordering::Equal);
    Value::Set(elements)
}

fn sort_by<T>(items: &mut [T], cmp: impl Fn(&T, &T) -> Ordering) {
    if items.len() <= SMALL_CONTAINER_THRESHOLD {
        insertion_sort_by(items, cmp);
    } else {
        items.sort_by(cmp);
    }
}

fn insertion_sort_by<T>(items: &mut [T], cmp: impl Fn(&T, &T) -> Ordering) {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && cmp(&items[j - 1], &items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// SHA-256 over a value's canonical encoded bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentId(pub [u8; 32]);

impl ContentId {
    pub fn hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.hex())
    }
}

pub fn content_id(value: &Value) -> ContentId {
    let encoded = crate::encode::encode(value);
    let digest = Sha256::digest(&encoded);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    ContentId(out)
}
