use cellsync_proto::{build_dict, encoded_len, encode_value, Value};

#[test]
fn encoded_len_matches_actual_encoding() {
    let dict = build_dict(vec![
        (Value::string("cols"), Value::Int(80)),
        (Value::string("rows"), Value::Int(24)),
    ]);
    assert_eq!(encoded_len(&dict), encode_value(&dict).len());
}

#[test]
fn small_integers_stay_compact() {
    // Single-digit non-negative integers should never cost more than 2 bytes
    // (one digit, one sign character).
    for i in 0..10 {
        assert_eq!(encode_value(&Value::Int(i)).len(), 2);
    }
}

#[test]
fn bytes_overhead_is_length_prefix_only() {
    let payload = vec![0xABu8; 128];
    let v = Value::Bytes(payload.clone());
    let bytes = encode_value(&v);
    // "128:" is 4 bytes, plus the 128-byte payload.
    assert_eq!(bytes.len(), 4 + payload.len());
}
