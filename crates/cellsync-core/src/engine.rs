//! The sync engine (C6): commit loop, retransmission log, peer-ack table,
//! and the apply paths for remote frames.
//!
//! Single-threaded per instance, like the teacher's `SequenceSession` and
//! `MerkleToxEngine` — no internal locking, driven synchronously by an
//! external event loop.

use std::collections::{HashMap, VecDeque};

use cellsync_proto::Value;
use tracing::{debug, trace, warn};

use crate::cell::CellDiff;
use crate::constants::{INITIAL_RETRANSMIT_BUDGET, LOG_CAPACITY};
use crate::error::SyncError;
use crate::frame::{Ack, WireFrame};
use crate::grid::DamageGrid;
use crate::packer;

struct LogEntry {
    generation: u64,
    packed: Vec<u8>,
}

/// Per-peer acknowledgment state (§3.5). `acked_gen` only ever advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerState {
    pub acked_gen: u64,
    pub sent_gen: u64,
    pub retransmit_budget: u32,
}

/// A commit's output: the diffs that changed, plus the metadata needed to
/// frame them for the wire. `packed_cache` borrows into the engine's
/// retransmission log and is only valid until [`LOG_CAPACITY`] further
/// commits evict it — callers should serialize the frame (see
/// [`SyncEngine::snapshot_to_wire`]) before triggering another commit.
pub struct Snapshot<'a> {
    pub generation: u64,
    pub cols: usize,
    pub rows: usize,
    pub source: u64,
    pub cursor_x: usize,
    pub cursor_y: usize,
    pub diffs: Vec<CellDiff>,
    pub is_full: bool,
    pub packed_cache: Option<&'a [u8]>,
}

/// Owns the damage grid, peer table, retransmission log, and the
/// monotonic generation counter for one node.
pub struct SyncEngine<G: DamageGrid> {
    node_id: u64,
    grid: G,
    generation: u64,
    log: VecDeque<LogEntry>,
    peers: HashMap<u64, PeerState>,
}

impl<G: DamageGrid> SyncEngine<G> {
    pub fn new(node_id: u64, grid: G) -> Self {
        SyncEngine {
            node_id,
            grid,
            generation: 0,
            log: VecDeque::with_capacity(LOG_CAPACITY),
            peers: HashMap::new(),
        }
    }

    pub fn node_id(&self) -> u64 {
        self.node_id
    }

    pub fn grid(&self) -> &G {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut G {
        &mut self.grid
    }

    /// Local write, forwarded to the damage grid (§4.6.2).
    pub fn write_cell(&mut self, x: usize, y: usize, cell: crate::cell::Cell) {
        self.grid.set_cell(x, y, cell);
    }

    /// Commit pending local writes into a new generation (§4.6.3).
    pub fn commit(&mut self) -> Snapshot<'_> {
        self.generation = self.generation.wrapping_add(1);
        let regions = self.grid.commit();

        let capacity: usize = regions.iter().map(|r| r.width() * r.height()).sum();
        let mut diffs = Vec::with_capacity(capacity);
        for region in &regions {
            for y in region.min_y..=region.max_y {
                for x in region.min_x..=region.max_x {
                    if let Some(cell) = self.grid.get_cell(x, y) {
                        diffs.push(CellDiff {
                            x: x as u16,
                            y: y as u16,
                            cell,
                        });
                    }
                }
            }
        }

        let packed = packer::pack(&diffs);
        if self.log.len() == LOG_CAPACITY {
            let evicted = self.log.pop_front();
            trace!(generation = ?evicted.map(|e| e.generation), "retransmission log evicted oldest entry");
        }
        self.log.push_back(LogEntry {
            generation: self.generation,
            packed,
        });
        let packed_cache = self.log.back().map(|e| e.packed.as_slice());

        let (cursor_x, cursor_y) = self.grid.cursor();
        debug!(generation = self.generation, diffs = diffs.len(), "committed");
        Snapshot {
            generation: self.generation,
            cols: self.grid.cols(),
            rows: self.grid.rows(),
            source: self.node_id,
            cursor_x,
            cursor_y,
            diffs,
            is_full: false,
            packed_cache,
        }
    }

    /// Apply a locally-held snapshot's diffs (e.g. one produced by another
    /// engine instance in the same process) into this grid (§4.6.4).
    pub fn apply_remote(&mut self, snapshot: &Snapshot<'_>) {
        for diff in &snapshot.diffs {
            self.grid
                .apply_remote_cell(diff.x as usize, diff.y as usize, diff.cell);
        }
    }

    /// Fused unpack + apply of a raw packed payload — never allocates an
    /// intermediate diff array, and tolerates a truncated tail (§4.6.5).
    pub fn apply_packed(&mut self, bytes: &[u8]) {
        packer::apply_packed(bytes, &mut self.grid);
    }

    /// Decode a `cell-frame` record and apply it via the strict path,
    /// surfacing `MalformedPayload` if the packed payload itself is
    /// truncated or uses the reserved sentinel (§4.6.9/§4.6.10).
    pub fn apply_remote_frame(&mut self, value: &Value) -> Result<(), SyncError> {
        let frame = WireFrame::from_value(value)?;
        let diffs = packer::unpack(&frame.packed)?;
        for diff in &diffs {
            self.grid
                .apply_remote_cell(diff.x as usize, diff.y as usize, diff.cell);
        }
        Ok(())
    }

    /// Fast path: decode a `cell-frame` record and apply it via the fused,
    /// tolerant packer path, bypassing the intermediate diff array
    /// entirely (§4.6.9).
    pub fn apply_from_wire(&mut self, value: &Value) -> Result<(), SyncError> {
        let frame = WireFrame::from_value(value)?;
        packer::apply_packed(&frame.packed, &mut self.grid);
        Ok(())
    }

    /// Record an acknowledgment from a peer. `acked_gen` only ever
    /// advances; a stale or duplicate ack is ignored (§4.6.6).
    pub fn ack(&mut self, peer_id: u64, generation: u64) {
        let entry = self.peers.entry(peer_id).or_insert(PeerState {
            acked_gen: 0,
            sent_gen: 0,
            retransmit_budget: INITIAL_RETRANSMIT_BUDGET,
        });
        if generation > entry.acked_gen {
            entry.acked_gen = generation;
        } else if generation < entry.acked_gen {
            warn!(peer_id, generation, acked_gen = entry.acked_gen, "ignoring ack regression");
        }
    }

    pub fn peer_state(&self, peer_id: u64) -> Option<PeerState> {
        self.peers.get(&peer_id).copied()
    }

    /// The payload for the smallest cached generation strictly greater
    /// than `generation`, if any (§4.6.7). The caller reassembles catch-up
    /// by calling this repeatedly, advancing the argument each time.
    pub fn packed_since(&self, generation: u64) -> Option<&[u8]> {
        self.log
            .iter()
            .find(|entry| entry.generation > generation)
            .map(|entry| entry.packed.as_slice())
    }

    /// Every cell in row-major order, with `is_full = true`. Does not
    /// touch the retransmission log or the generation counter (§4.6.8).
    pub fn full_snapshot(&self) -> Snapshot<'_> {
        let cols = self.grid.cols();
        let rows = self.grid.rows();
        let mut diffs = Vec::with_capacity(cols * rows);
        for y in 0..rows {
            for x in 0..cols {
                if let Some(cell) = self.grid.get_cell(x, y) {
                    diffs.push(CellDiff {
                        x: x as u16,
                        y: y as u16,
                        cell,
                    });
                }
            }
        }
        let (cursor_x, cursor_y) = self.grid.cursor();
        Snapshot {
            generation: self.generation,
            cols,
            rows,
            source: self.node_id,
            cursor_x,
            cursor_y,
            diffs,
            is_full: true,
            packed_cache: None,
        }
    }

    /// Frame a snapshot as a `cell-frame` record, eagerly copying any
    /// borrowed ring payload into the owned `Value::Bytes` — the "safe
    /// default" the design notes call for rather than threading the ring's
    /// lifetime through the codec's value type (§4.6.9, §9).
    pub fn snapshot_to_wire(&self, snapshot: &Snapshot<'_>) -> Value {
        let packed = match snapshot.packed_cache {
            Some(cached) => cached.to_vec(),
            None => packer::pack(&snapshot.diffs),
        };
        WireFrame {
            generation: snapshot.generation,
            cols: snapshot.cols as u32,
            rows: snapshot.rows as u32,
            source: snapshot.source,
            cursor_x: snapshot.cursor_x as u32,
            cursor_y: snapshot.cursor_y as u32,
            packed,
        }
        .to_value()
    }

    /// Build a `cell-ack` record stamped with this node's own id,
    /// acknowledging `generation` received from a peer.
    pub fn encode_ack(&self, generation: u64) -> Value {
        Ack {
            node_id: self.node_id,
            generation,
        }
        .to_value()
    }

    pub fn decode_ack(value: &Value) -> Result<Ack, SyncError> {
        Ack::from_value(value)
    }
}
