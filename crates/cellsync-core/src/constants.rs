//! Fundamental constants of the cell-sync wire format and engine.

/// Width of a terminal cell record on the wire, big-endian throughout:
/// 2 (x) + 2 (y) + 3 (codepoint) + 3 (fg) + 3 (bg) + 1 (attrs).
pub const CELL_RECORD_LEN: usize = 14;

/// Width of a run marker: the `FF FF` sentinel plus a 16-bit run count.
pub const RUN_MARKER_LEN: usize = 4;

/// `x = 0xFFFF` never appears as a literal coordinate; its presence right
/// after a cell record unambiguously marks a run, since a real coordinate
/// would have to collide with it otherwise.
pub const RESERVED_X: u16 = 0xFFFF;

/// Number of generations the retransmission log keeps before evicting the
/// oldest entry.
pub const LOG_CAPACITY: usize = 64;

/// Retransmit budget assigned to a peer the first time it is observed.
pub const INITIAL_RETRANSMIT_BUDGET: u32 = 3;
