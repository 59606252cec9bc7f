//! Canonical self-describing binary serialization codec.
//!
//! This is the wire format shared by every frame the cell-sync engine
//! produces: a tagged [`Value`] model (C1), an [`encode`]r (C2), a
//! [`decode`]r (C3), and canonical builders for sorted dictionaries, sorted
//! sets, and content-addressable hashing (C4).

pub mod canonical;
pub mod constants;
pub mod decode;
pub mod encode;
pub mod error;
pub mod value;

pub use canonical::{build_dict, build_set, content_id, ContentId};
pub use decode::{decode as decode_value, Decoder};
pub use encode::{encode as encode_value, encode_into, encoded_len};
pub use error::DecodeError;
pub use value::{compare, BigInt, Value};
