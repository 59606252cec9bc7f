//! The cell packer (C5): pack/unpack the 14-byte cell records and 4-byte
//! run markers that make up a packed diff stream (§3.2, §4.5).

use tracing::warn;

use crate::cell::{Cell, CellAttrs, CellDiff};
use crate::constants::{CELL_RECORD_LEN, RESERVED_X, RUN_MARKER_LEN};
use crate::error::SyncError;
use crate::grid::DamageGrid;

fn write_cell_record(diff: &CellDiff, out: &mut Vec<u8>) {
    out.extend_from_slice(&diff.x.to_be_bytes());
    out.extend_from_slice(&diff.y.to_be_bytes());
    out.extend_from_slice(&diff.cell.codepoint.to_be_bytes()[1..4]);
    out.extend_from_slice(&diff.cell.fg.to_be_bytes()[1..4]);
    out.extend_from_slice(&diff.cell.bg.to_be_bytes()[1..4]);
    out.push(diff.cell.attrs.bits());
}

fn read_cell_record(bytes: &[u8]) -> CellDiff {
    debug_assert_eq!(bytes.len(), CELL_RECORD_LEN);
    let x = u16::from_be_bytes([bytes[0], bytes[1]]);
    let y = u16::from_be_bytes([bytes[2], bytes[3]]);
    let codepoint = u32::from_be_bytes([0, bytes[4], bytes[5], bytes[6]]);
    let fg = u32::from_be_bytes([0, bytes[7], bytes[8], bytes[9]]);
    let bg = u32::from_be_bytes([0, bytes[10], bytes[11], bytes[12]]);
    let attrs = CellAttrs::from_bits_truncate(bytes[13]);
    CellDiff {
        x,
        y,
        cell: Cell {
            codepoint,
            fg,
            bg,
            attrs,
        },
    }
}

/// Pack a row-major-ordered diff sequence into the wire stream, collapsing
/// maximal contiguous identical runs into a 4-byte marker (§4.5).
pub fn pack(diffs: &[CellDiff]) -> Vec<u8> {
    let mut out = Vec::with_capacity(diffs.len() * (CELL_RECORD_LEN + RUN_MARKER_LEN));
    let mut i = 0;
    while i < diffs.len() {
        let base = diffs[i];
        write_cell_record(&base, &mut out);

        let mut run: u32 = 0;
        while run < u16::MAX as u32 {
            let Some(candidate) = diffs.get(i + 1 + run as usize) else {
                break;
            };
            let expected_x = base.x as u32 + 1 + run;
            if expected_x > u16::MAX as u32
                || candidate.y != base.y
                || candidate.x as u32 != expected_x
                || candidate.cell != base.cell
            {
                break;
            }
            run += 1;
        }

        if run > 0 {
            out.extend_from_slice(&[0xFF, 0xFF]);
            out.extend_from_slice(&(run as u16).to_be_bytes());
        }
        i += 1 + run as usize;
    }
    out
}

/// Strict unpack: every byte must belong to a complete cell record or run
/// marker, and `x = 0xFFFF` may never appear as a literal coordinate.
/// Two passes, per §4.5: the first only counts, to right-size the output.
pub fn unpack(bytes: &[u8]) -> Result<Vec<CellDiff>, SyncError> {
    let total = count_diffs(bytes)?;
    let mut out = Vec::with_capacity(total);
    let mut i = 0;
    while i < bytes.len() {
        let record = &bytes[i..i + CELL_RECORD_LEN];
        let base = read_cell_record(record);
        if base.x == RESERVED_X {
            return Err(SyncError::MalformedPayload);
        }
        i += CELL_RECORD_LEN;
        out.push(base);

        if is_run_marker(bytes, i) {
            let run = read_run_count(bytes, i);
            for j in 0..run {
                out.push(CellDiff {
                    x: base.x + 1 + j as u16,
                    y: base.y,
                    cell: base.cell,
                });
            }
            i += RUN_MARKER_LEN;
        }
    }
    Ok(out)
}

fn is_run_marker(bytes: &[u8], pos: usize) -> bool {
    pos + 2 <= bytes.len() && bytes[pos] == 0xFF && bytes[pos + 1] == 0xFF
}

fn read_run_count(bytes: &[u8], marker_start: usize) -> usize {
    u16::from_be_bytes([bytes[marker_start + 2], bytes[marker_start + 3]]) as usize
}

fn count_diffs(bytes: &[u8]) -> Result<usize, SyncError> {
    let mut count = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        if i + CELL_RECORD_LEN > bytes.len() {
            return Err(SyncError::MalformedPayload);
        }
        count += 1;
        i += CELL_RECORD_LEN;
        if is_run_marker(bytes, i) {
            if i + RUN_MARKER_LEN > bytes.len() {
                return Err(SyncError::MalformedPayload);
            }
            count += read_run_count(bytes, i);
            i += RUN_MARKER_LEN;
        }
    }
    Ok(count)
}

/// Fused unpack + writeback: never builds an intermediate diff array.
/// Tolerant of a truncated tail — stops at the last complete record and
/// keeps whatever was already applied, per §4.6.10; retransmission is
/// expected to repair the rest.
pub fn apply_packed<G: DamageGrid>(bytes: &[u8], grid: &mut G) {
    let mut i = 0;
    while i < bytes.len() {
        if i + CELL_RECORD_LEN > bytes.len() {
            warn!(offset = i, "packed payload truncated mid-record, stopping");
            break;
        }
        let base = read_cell_record(&bytes[i..i + CELL_RECORD_LEN]);
        if base.x == RESERVED_X {
            warn!(offset = i, "literal cell used the reserved run sentinel, stopping");
            break;
        }
        i += CELL_RECORD_LEN;
        grid.apply_remote_cell(base.x as usize, base.y as usize, base.cell);

        if is_run_marker(bytes, i) {
            if i + RUN_MARKER_LEN > bytes.len() {
                warn!(offset = i, "packed payload truncated mid-run-marker, stopping");
                break;
            }
            let run = read_run_count(bytes, i);
            for j in 0..run {
                let x = base.x as usize + 1 + j;
                grid.apply_remote_cell(x, base.y as usize, base.cell);
            }
            i += RUN_MARKER_LEN;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellAttrs;
    use crate::grid::CellGrid;
    use proptest::prelude::*;

    fn diff(x: u16, y: u16, codepoint: u32) -> CellDiff {
        CellDiff {
            x,
            y,
            cell: Cell::new(codepoint, 0xFF0000, 0x000000, CellAttrs::empty()),
        }
    }

    #[test]
    fn single_cell_round_trips() {
        let diffs = vec![diff(0, 0, b'A' as u32)];
        let packed = pack(&diffs);
        assert_eq!(packed.len(), CELL_RECORD_LEN);
        assert_eq!(unpack(&packed).unwrap(), diffs);
    }

    #[test]
    fn contiguous_identical_run_collapses_to_one_marker() {
        let cell = Cell::new(b' ' as u32, 0xFFFFFF, 0, CellAttrs::empty());
        let diffs: Vec<CellDiff> = (0..10)
            .map(|x| CellDiff { x, y: 3, cell })
            .collect();
        let packed = pack(&diffs);
        assert_eq!(packed.len(), CELL_RECORD_LEN + RUN_MARKER_LEN);
        assert_eq!(unpack(&packed).unwrap(), diffs);
    }

    #[test]
    fn differing_cell_breaks_the_run() {
        let a = diff(0, 0, b'A' as u32);
        let b = diff(1, 0, b'B' as u32);
        let packed = pack(&[a, b]);
        assert_eq!(packed.len(), CELL_RECORD_LEN * 2);
        assert_eq!(unpack(&packed).unwrap(), vec![a, b]);
    }

    #[test]
    fn non_contiguous_x_breaks_the_run() {
        let cell = Cell::new(b'.' as u32, 0, 0, CellAttrs::empty());
        let a = CellDiff { x: 0, y: 0, cell };
        let b = CellDiff { x: 5, y: 0, cell };
        let packed = pack(&[a, b]);
        assert_eq!(packed.len(), CELL_RECORD_LEN * 2);
    }

    #[test]
    fn truncated_tail_is_tolerated_not_fatal() {
        let diffs = vec![diff(0, 0, b'A' as u32), diff(1, 0, b'B' as u32)];
        let mut packed = pack(&diffs);
        packed.truncate(CELL_RECORD_LEN + 3); // lop off the last record's final byte
        let mut grid = CellGrid::new(4, 4);
        apply_packed(&packed, &mut grid);
        assert_eq!(grid.get_cell(0, 0).unwrap().char(), Some('A'));
    }

    #[test]
    fn literal_reserved_sentinel_is_rejected_by_strict_unpack() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&RESERVED_X.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.extend_from_slice(&[0u8; 10]);
        assert!(matches!(unpack(&bytes), Err(SyncError::MalformedPayload)));
    }

    proptest! {
        #[test]
        fn pack_unpack_round_trips(
            coords in proptest::collection::btree_set((0u16..2000, 0u16..200), 1..200)
        ) {
            let diffs: Vec<CellDiff> = coords
                .into_iter()
                .map(|(x, y)| diff(x, y, (x as u32) % 0x10FFFF))
                .collect();
            let packed = pack(&diffs);
            prop_assert_eq!(unpack(&packed).unwrap(), diffs);
        }

        #[test]
        fn applying_packed_bytes_twice_is_idempotent(
            coords in proptest::collection::vec((0u16..40, 0u16..20), 0..60)
        ) {
            let diffs: Vec<CellDiff> = coords
                .into_iter()
                .map(|(x, y)| diff(x, y, (x as u32) + 1))
                .collect();
            let packed = pack(&diffs);
            let mut grid = CellGrid::new(40, 20);
            apply_packed(&packed, &mut grid);
            let once: Vec<_> = (0..20).flat_map(|y| (0..40).map(move |x| (x, y)))
                .map(|(x, y)| grid.get_cell(x, y))
                .collect();
            apply_packed(&packed, &mut grid);
            let twice: Vec<_> = (0..20).flat_map(|y| (0..40).map(move |x| (x, y)))
                .map(|(x, y)| grid.get_cell(x, y))
                .collect();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn run_length_compression_bound_holds_within_one_marker_group(
            n in 1usize..2000
        ) {
            // Within a single row and well under the 65535-cell marker
            // limit, ceil(n/65535) == 1, so the bound collapses to 18 bytes.
            let cell = Cell::new(b'.' as u32, 0, 0, CellAttrs::empty());
            let diffs: Vec<CellDiff> = (0..n as u16).map(|x| CellDiff { x, y: 0, cell }).collect();
            let packed = pack(&diffs);
            prop_assert!(packed.len() <= CELL_RECORD_LEN + RUN_MARKER_LEN);
        }
    }
}
