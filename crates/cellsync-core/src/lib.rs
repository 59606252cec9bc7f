//! Mosh-style terminal-cell synchronization engine.
//!
//! Ships partial, compressed snapshots of a 2-D terminal grid between
//! peers: [`cell`] is the shared vocabulary, [`packer`] packs/unpacks the
//! wire diff stream (C5), [`engine`] is the commit/apply/ack/retransmit
//! state machine (C6), [`frame`] wraps a snapshot in a codec record (C7),
//! and [`grid`] is the damage-tracking contract the engine consumes (C8).

pub mod cell;
pub mod constants;
pub mod engine;
pub mod error;
pub mod frame;
pub mod grid;
pub mod packer;

pub use cell::{Cell, CellAttrs, CellDiff};
pub use engine::{PeerState, Snapshot, SyncEngine};
pub use error::SyncError;
pub use frame::{Ack, WireFrame, ACK_LABEL, FRAME_LABEL};
pub use grid::{CellGrid, DamageGrid, Region};
