use crate::config::DistanceMetric;
use kinship_data::Position;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering as AtomicOrdering};
use thiserror::Error;

/// Errors raised while staging entries into a [`SpatialHash`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("staging buffer full ({capacity} slots reserved)")]
    CapacityExceeded { capacity: usize },

    #[error("cell {cell} is outside the grid ({cells} cells)")]
    CellOutOfRange { cell: usize, cells: usize },
}

/// Maps a world position to its `(cell_x, cell_z)` grid coordinate.
///
/// Coordinates are floor-divided by `cell_size` and clamped into the grid, so
/// agents beyond the world edge land in the border cell. Non-finite
/// coordinates clamp as well (NaN maps to 0).
#[inline]
pub fn cell_of(
    position: &Position,
    cell_size: f64,
    grid_width: usize,
    grid_height: usize,
) -> (usize, usize) {
    (
        clamp_axis(position.x, cell_size, grid_width),
        clamp_axis(position.z, cell_size, grid_height),
    )
}

#[inline]
fn clamp_axis(v: f64, cell_size: f64, extent: usize) -> usize {
    let c = (v / cell_size).floor();
    if c.is_nan() || c <= 0.0 {
        0
    } else {
        // `as` saturates on +inf
        (c as usize).min(extent.saturating_sub(1))
    }
}

#[inline]
pub fn linear_index(cell_x: usize, cell_z: usize, grid_width: usize) -> usize {
    cell_x + cell_z * grid_width
}

#[inline]
fn pack(cell: usize, agent: u32) -> u64 {
    ((cell as u64) << 32) | u64::from(agent)
}

#[inline]
fn unpack_cell(entry: u64) -> usize {
    (entry >> 32) as usize
}

/// Uniform grid multi-map from cell index to agent slots, rebuilt every
/// propagation tick.
///
/// Building happens in two phases:
/// - **staging**: [`SpatialHash::insert`] takes `&self` and may be called from
///   any number of rayon workers. Each call claims one slot of a pre-sized
///   append log with an atomic cursor and stores a packed `(cell, agent)`
///   word. The log never grows while writers are live.
/// - **sealing**: [`SpatialHash::seal`] takes `&mut self`, so every writer has
///   finished before it runs. It sorts the log and lays it out as an offset
///   array (compressed sparse rows): `cell_offsets[i]..cell_offsets[i + 1]`
///   indexes the agents in cell `i`, in ascending slot order.
///
/// Queries only see sealed entries.
///
/// # Examples
/// ```
/// use kinship_core::spatial_hash::SpatialHash;
/// use kinship_data::Position;
///
/// let mut grid = SpatialHash::new(10.0, 10, 10);
/// let positions = vec![Position::planar(15.0, 15.0), Position::planar(17.0, 12.0)];
/// grid.build_parallel(&positions);
///
/// let cell = grid.cell_index(&positions[0]);
/// assert_eq!(grid.query_cell(cell), &[0, 1]);
/// ```
pub struct SpatialHash {
    pub cell_size: f64,
    pub cols: usize,
    pub rows: usize,
    cell_offsets: Vec<usize>,
    entity_indices: Vec<u32>,
    staging: Vec<AtomicU64>,
    staged: AtomicUsize,
}

impl SpatialHash {
    /// Creates an empty grid of `cols * rows` cells, each `cell_size` world
    /// units wide.
    pub fn new(cell_size: f64, cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cell_size,
            cols,
            rows,
            cell_offsets: vec![0; cols * rows + 1],
            entity_indices: Vec::new(),
            staging: Vec::new(),
            staged: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    /// Reserved staging slots.
    pub fn capacity(&self) -> usize {
        self.staging.len()
    }

    /// Number of sealed entries.
    pub fn len(&self) -> usize {
        self.entity_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_indices.is_empty()
    }

    #[inline]
    pub fn cell_coords(&self, position: &Position) -> (usize, usize) {
        cell_of(position, self.cell_size, self.cols, self.rows)
    }

    #[inline]
    pub fn cell_index(&self, position: &Position) -> usize {
        let (cx, cz) = self.cell_coords(position);
        linear_index(cx, cz, self.cols)
    }

    /// Drops all staged and sealed entries, keeping reserved capacity.
    pub fn clear(&mut self) {
        *self.staged.get_mut() = 0;
        self.entity_indices.clear();
        self.cell_offsets.clear();
        self.cell_offsets.resize(self.cell_count() + 1, 0);
    }

    /// Grows the staging log to hold at least `capacity` entries.
    pub fn reserve(&mut self, capacity: usize) {
        if self.staging.len() < capacity {
            self.staging.resize_with(capacity, || AtomicU64::new(0));
        }
    }

    /// Stages `agent` into `cell_idx`. Safe to call concurrently.
    ///
    /// Fails instead of reallocating once the reserved capacity is used up.
    pub fn insert(&self, cell_idx: usize, agent: u32) -> Result<(), GridError> {
        if cell_idx >= self.cell_count() {
            return Err(GridError::CellOutOfRange {
                cell: cell_idx,
                cells: self.cell_count(),
            });
        }
        let slot = self.staged.fetch_add(1, AtomicOrdering::Relaxed);
        match self.staging.get(slot) {
            Some(entry) => {
                entry.store(pack(cell_idx, agent), AtomicOrdering::Relaxed);
                Ok(())
            }
            None => Err(GridError::CapacityExceeded {
                capacity: self.staging.len(),
            }),
        }
    }

    /// Buckets every staged entry into the offset array.
    pub fn seal(&mut self) {
        let cell_count = self.cell_count();
        let staged = (*self.staged.get_mut()).min(self.staging.len());

        let mut packed: Vec<u64> = self.staging[..staged]
            .iter_mut()
            .map(|entry| *entry.get_mut())
            .collect();
        packed.par_sort_unstable();

        self.cell_offsets.clear();
        self.cell_offsets.resize(cell_count + 1, 0);
        for &entry in &packed {
            self.cell_offsets[unpack_cell(entry) + 1] += 1;
        }
        for i in 0..cell_count {
            self.cell_offsets[i + 1] += self.cell_offsets[i];
        }

        self.entity_indices.clear();
        self.entity_indices
            .extend(packed.iter().map(|&entry| entry as u32));
    }

    /// Rebuilds the grid from scratch: one agent slot per position, inserted
    /// in parallel. Returns how many positions could not be staged.
    pub fn build_parallel(&mut self, positions: &[Position]) -> usize {
        self.clear();
        self.reserve(positions.len());

        let grid = &*self;
        let rejected = positions
            .par_iter()
            .enumerate()
            .filter(|(slot, pos)| {
                let agent = match u32::try_from(*slot) {
                    Ok(agent) => agent,
                    Err(_) => return true,
                };
                match grid.insert(grid.cell_index(pos), agent) {
                    Ok(()) => false,
                    Err(err) => {
                        tracing::warn!(%err, slot, "agent dropped from spatial hash");
                        true
                    }
                }
            })
            .count();

        self.seal();
        rejected
    }

    /// Agents sealed into `cell_idx`; empty for cells outside the grid.
    #[inline]
    pub fn query_cell(&self, cell_idx: usize) -> &[u32] {
        if cell_idx >= self.cell_count() {
            return &[];
        }
        let start = self.cell_offsets[cell_idx];
        let end = self.cell_offsets[cell_idx + 1];
        &self.entity_indices[start..end]
    }

    /// Visits every agent in the 3x3 block of cells around `origin` that lies
    /// strictly inside `radius_sq`, skipping `self_slot`.
    ///
    /// This is an approximation whenever the radius exceeds `cell_size`:
    /// agents more than one cell away are never visited even if they are in
    /// range. Keep `cell_size >= radius` for an exact neighbor set.
    ///
    /// Visiting order is fixed: rows of cells from -Z to +Z, cells from -X to
    /// +X, then ascending slot within each cell.
    pub fn for_each_candidate<F>(
        &self,
        self_slot: u32,
        origin: &Position,
        positions: &[Position],
        radius_sq: f64,
        metric: DistanceMetric,
        mut callback: F,
    ) where
        F: FnMut(u32, f64),
    {
        let (cx, cz) = self.cell_coords(origin);

        for dz in -1isize..=1 {
            let nz = cz as isize + dz;
            if nz < 0 || nz >= self.rows as isize {
                continue;
            }
            for dx in -1isize..=1 {
                let nx = cx as isize + dx;
                if nx < 0 || nx >= self.cols as isize {
                    continue;
                }

                let cell_idx = linear_index(nx as usize, nz as usize, self.cols);
                for &slot in self.query_cell(cell_idx) {
                    if slot == self_slot {
                        continue;
                    }
                    let Some(other) = positions.get(slot as usize) else {
                        continue;
                    };
                    let d2 = metric.distance_sq(origin, other);
                    if d2 < radius_sq {
                        callback(slot, d2);
                    }
                }
            }
        }
    }

    pub fn candidates_into(
        &self,
        self_slot: u32,
        positions: &[Position],
        radius_sq: f64,
        metric: DistanceMetric,
        result: &mut Vec<u32>,
    ) {
        result.clear();
        if let Some(origin) = positions.get(self_slot as usize) {
            self.for_each_candidate(self_slot, origin, positions, radius_sq, metric, |slot, _| {
                result.push(slot)
            });
        }
    }
}

/// All-pairs reference scan: every other agent strictly inside `radius_sq`,
/// in ascending slot order. O(n) per call; used to measure the grid against.
pub fn naive_candidates(
    self_slot: u32,
    positions: &[Position],
    radius_sq: f64,
    metric: DistanceMetric,
) -> Vec<u32> {
    let Some(origin) = positions.get(self_slot as usize) else {
        return Vec::new();
    };
    positions
        .iter()
        .enumerate()
        .filter(|&(slot, other)| {
            slot != self_slot as usize && metric.distance_sq(origin, other) < radius_sq
        })
        .map(|(slot, _)| slot as u32)
        .collect()
}
