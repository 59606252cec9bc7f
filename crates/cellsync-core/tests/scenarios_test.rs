use cellsync_core::{Cell, CellAttrs, CellGrid, SyncEngine};

fn letter(c: char, fg: u32) -> Cell {
    Cell::new(c as u32, fg, 0, CellAttrs::empty())
}

#[test]
fn s1_tiny_frame() {
    let mut engine = SyncEngine::new(1, CellGrid::new(80, 24));
    engine.write_cell(0, 0, letter('A', 0xFF0000));
    engine.write_cell(1, 0, letter('B', 0x00FF00));
    let snapshot = engine.commit();
    assert_eq!(snapshot.generation, 1);
    assert!(snapshot.diffs.len() >= 2);
    let packed = snapshot.packed_cache.unwrap();
    assert!(packed.len() <= 28);
}

#[test]
fn s2_rle_for_blank_screen() {
    let mut engine = SyncEngine::new(1, CellGrid::new(80, 24));
    for y in 0..24 {
        for x in 0..80 {
            engine.write_cell(x, y, letter(' ', 0xFFFFFF));
        }
    }
    let snapshot = engine.commit();
    let packed = snapshot.packed_cache.unwrap();
    assert!(packed.len() < 26880 / 10);
}

#[test]
fn s3_cross_peer_apply() {
    let mut node_a = SyncEngine::new(1, CellGrid::new(20, 10));
    let mut node_b = SyncEngine::new(2, CellGrid::new(20, 10));

    node_a.write_cell(5, 3, letter('!', 0xFF0000));
    let snapshot = node_a.commit();
    let wire = node_a.snapshot_to_wire(&snapshot);

    node_b.apply_from_wire(&wire).unwrap();
    let cell = node_b.grid().get_cell(5, 3).unwrap();
    assert_eq!(cell.char(), Some('!'));
    assert_eq!(cell.fg, 0xFF0000);
}

#[test]
fn s4_ack_regression_is_ignored() {
    let mut engine = SyncEngine::new(1, CellGrid::new(4, 4));
    engine.ack(42, 5);
    engine.ack(42, 10);
    engine.ack(42, 7);
    assert_eq!(engine.peer_state(42).unwrap().acked_gen, 10);
}

#[test]
fn s5_retransmission_returns_smallest_generation_greater_than_requested() {
    let mut engine = SyncEngine::new(1, CellGrid::new(4, 4));
    engine.write_cell(0, 0, letter('1', 0));
    let gen1 = engine.commit();
    let gen1_packed = gen1.packed_cache.unwrap().to_vec();
    engine.write_cell(0, 0, letter('2', 0));
    engine.commit();
    engine.write_cell(0, 0, letter('3', 0));
    let gen3 = engine.commit();
    let gen3_packed = gen3.packed_cache.unwrap().to_vec();

    assert_eq!(engine.packed_since(2).unwrap(), gen3_packed.as_slice());
    assert_eq!(engine.packed_since(0).unwrap(), gen1_packed.as_slice());
}

#[test]
fn s6_cursor_plumbing() {
    let mut node_a = SyncEngine::new(1, CellGrid::new(20, 10));
    node_a.grid_mut().set_cursor(7, 3);
    node_a.write_cell(0, 0, letter('x', 0));
    let snapshot = node_a.commit();
    let wire = node_a.snapshot_to_wire(&snapshot);

    let (x, y) = cellsync_core::WireFrame::cursor_only(&wire).unwrap();
    assert_eq!((x, y), (7, 3));
}

#[test]
fn s7_canonical_rejection() {
    // A dictionary with "b" sorted before "a" is not canonical.
    let mut bytes = Vec::new();
    bytes.push(b'{');
    bytes.extend_from_slice(b"1\"b");
    bytes.extend_from_slice(b"0+");
    bytes.extend_from_slice(b"1\"a");
    bytes.extend_from_slice(b"0+");
    bytes.push(b'}');
    let err = cellsync_proto::decode_value(&bytes).unwrap_err();
    assert!(matches!(err, cellsync_proto::DecodeError::NonCanonicalDict { .. }));
}
