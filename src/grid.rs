// ============================================================================
// grid.rs — GridLife
// Grid dimensions, host-side cell snapshot, step parity and the reference
// update rule shared with the compute program.
// ============================================================================

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::LifeError;

// ======================== Dimensions ========================

/// Immutable grid size, fixed for the lifetime of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridDims {
    pub width: u32,
    pub height: u32,
}

impl GridDims {
    pub fn new(width: u32, height: u32) -> Result<Self, LifeError> {
        if width == 0 || height == 0 {
            return Err(LifeError::InvalidGrid { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Size in bytes of one generation stored as u32 cells.
    pub fn byte_size(&self) -> u64 {
        (self.area() * std::mem::size_of::<u32>()) as u64
    }

    /// Linear index `y * width + x`.
    pub fn index(&self, cell: CellCoord) -> usize {
        cell.y as usize * self.width as usize + cell.x as usize
    }

    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.x < self.width && cell.y < self.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: u32,
    pub y: u32,
}

impl CellCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

// ======================== Parity ========================

/// Even/odd value of the step counter. Selects which storage buffer is
/// authoritative: even → A current / B next, odd → B current / A next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    pub fn of(step_count: u64) -> Self {
        if step_count % 2 == 0 {
            Parity::Even
        } else {
            Parity::Odd
        }
    }

    /// Slot (0 = A, 1 = B) holding the current generation.
    pub fn current_slot(self) -> usize {
        match self {
            Parity::Even => 0,
            Parity::Odd => 1,
        }
    }

    /// Slot the upcoming compute step writes into.
    pub fn next_slot(self) -> usize {
        1 - self.current_slot()
    }
}

/// Role of a storage buffer relative to the current parity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferRole {
    Current,
    Next,
}

impl BufferRole {
    pub fn slot(self, parity: Parity) -> usize {
        match self {
            BufferRole::Current => parity.current_slot(),
            BufferRole::Next => parity.next_slot(),
        }
    }
}

// ======================== Session ========================

/// Step counter owned by the orchestrator and lent to the engines.
///
/// Incremented once per completed generation, never by render-only or
/// edit-only passes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    step_count: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn parity(&self) -> Parity {
        Parity::of(self.step_count)
    }

    pub(crate) fn advance(&mut self) {
        self.step_count += 1;
    }
}

// ======================== Host snapshot ========================

/// Host-resident copy of one generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostGrid {
    dims: GridDims,
    cells: Vec<u32>,
}

impl HostGrid {
    pub fn empty(dims: GridDims) -> Self {
        Self {
            dims,
            cells: vec![0; dims.area()],
        }
    }

    pub fn from_cells(dims: GridDims, cells: Vec<u32>) -> Result<Self, LifeError> {
        check_cells(dims, &cells)?;
        Ok(Self { dims, cells })
    }

    pub fn from_live_cells(dims: GridDims, live: &[CellCoord]) -> Self {
        let mut grid = Self::empty(dims);
        for &cell in live {
            grid.set(cell, true);
        }
        grid
    }

    /// Random seed: each cell is alive with probability `density`.
    pub fn random(dims: GridDims, density: f32, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let cells = (0..dims.area())
            .map(|_| u32::from(rng.gen::<f32>() < density))
            .collect();
        Self { dims, cells }
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    pub fn is_alive(&self, cell: CellCoord) -> bool {
        self.dims.contains(cell) && self.cells[self.dims.index(cell)] != 0
    }

    pub fn set(&mut self, cell: CellCoord, alive: bool) {
        if self.dims.contains(cell) {
            let i = self.dims.index(cell);
            self.cells[i] = u32::from(alive);
        }
    }

    /// Flip one cell; returns its new state.
    pub fn toggle(&mut self, cell: CellCoord) -> bool {
        let alive = !self.is_alive(cell);
        self.set(cell, alive);
        alive
    }

    /// Replace the whole generation, e.g. with a device readback.
    pub fn replace(&mut self, cells: Vec<u32>) -> Result<(), LifeError> {
        check_cells(self.dims, &cells)?;
        self.cells = cells;
        Ok(())
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }

    pub fn live_cells(&self) -> Vec<CellCoord> {
        let w = self.dims.width as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != 0)
            .map(|(i, _)| CellCoord::new((i % w) as u32, (i / w) as u32))
            .collect()
    }
}

pub(crate) fn check_cells(dims: GridDims, cells: &[u32]) -> Result<(), LifeError> {
    if cells.len() != dims.area() {
        return Err(LifeError::SizeMismatch {
            expected: dims.area(),
            actual: cells.len(),
        });
    }
    if let Some(index) = cells.iter().position(|&c| c > 1) {
        return Err(LifeError::InvalidCell {
            index,
            value: cells[index],
        });
    }
    Ok(())
}

// ======================== Update rule ========================

/// One generation of toroidal Life, written to `out`.
///
/// Mirrors `computeMain` in `shaders/simulation.wgsl` expression for
/// expression: any non-zero cell counts as one live neighbour, 2 keeps,
/// 3 births, else dead.
pub fn step_cells(dims: GridDims, input: &[u32], out: &mut [u32]) {
    let (w, h) = (dims.width, dims.height);
    let at = |x: u32, y: u32| input[((y % h) * w + (x % w)) as usize].min(1);

    for y in 0..h {
        for x in 0..w {
            let (left, right) = (x + w - 1, x + 1);
            let (down, up) = (y + h - 1, y + 1);
            let neighbors = at(left, up)
                + at(x, up)
                + at(right, up)
                + at(left, y)
                + at(right, y)
                + at(left, down)
                + at(x, down)
                + at(right, down);
            let i = (y * w + x) as usize;
            out[i] = match neighbors {
                2 => input[i].min(1),
                3 => 1,
                _ => 0,
            };
        }
    }
}

/// Reference generation step on a host snapshot.
pub fn next_generation(grid: &HostGrid) -> HostGrid {
    let mut out = HostGrid::empty(grid.dims);
    step_cells(grid.dims, &grid.cells, &mut out.cells);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(w: u32, h: u32) -> GridDims {
        GridDims::new(w, h).unwrap()
    }

    #[test]
    fn parity_roles_alternate_with_step_count() {
        for n in 0..16u64 {
            let parity = Parity::of(n);
            let expected_current = (n % 2) as usize;
            assert_eq!(BufferRole::Current.slot(parity), expected_current);
            assert_eq!(BufferRole::Next.slot(parity), 1 - expected_current);
        }
    }

    #[test]
    fn session_advances_parity() {
        let mut session = SessionState::new();
        assert_eq!(session.parity(), Parity::Even);
        session.advance();
        assert_eq!(session.step_count(), 1);
        assert_eq!(session.parity(), Parity::Odd);
    }

    #[test]
    fn toggle_twice_restores_cell() {
        let mut grid = HostGrid::random(dims(8, 8), 0.5, Some(3));
        let before = grid.clone();
        let cell = CellCoord::new(5, 2);
        grid.toggle(cell);
        assert_ne!(grid, before);
        grid.toggle(cell);
        assert_eq!(grid, before);
    }

    #[test]
    fn from_cells_rejects_wrong_length() {
        let err = HostGrid::from_cells(dims(4, 4), vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            LifeError::SizeMismatch {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn non_binary_cells_are_rejected() {
        let mut cells = vec![0; 16];
        cells[6] = u32::MAX;
        let err = HostGrid::from_cells(dims(4, 4), cells).unwrap_err();
        assert!(matches!(
            err,
            LifeError::InvalidCell {
                index: 6,
                value: u32::MAX
            }
        ));

        let mut grid = HostGrid::empty(dims(4, 4));
        assert!(grid.replace(vec![2; 16]).is_err());
        assert_eq!(grid.live_count(), 0);
        assert!(grid.replace(vec![1; 16]).is_ok());
    }

    #[test]
    fn rule_saturates_raw_values() {
        let mut out = vec![7; 16];
        step_cells(dims(4, 4), &[u32::MAX; 16], &mut out);
        // Every cell sees eight live neighbours.
        assert!(out.iter().all(|&c| c == 0));
    }

    #[test]
    fn seeded_random_is_reproducible() {
        let a = HostGrid::random(dims(16, 16), 0.4, Some(42));
        let b = HostGrid::random(dims(16, 16), 0.4, Some(42));
        assert_eq!(a, b);
        assert!(a.cells().iter().all(|&c| c <= 1));
        assert_eq!(HostGrid::random(dims(4, 4), 0.0, Some(1)).live_count(), 0);
        assert_eq!(HostGrid::random(dims(4, 4), 1.0, Some(1)).live_count(), 16);
    }

    #[test]
    fn all_dead_stays_dead() {
        let grid = HostGrid::empty(dims(7, 5));
        assert_eq!(next_generation(&grid).live_count(), 0);
    }

    #[test]
    fn lone_cell_dies() {
        let grid = HostGrid::from_live_cells(dims(6, 6), &[CellCoord::new(3, 3)]);
        assert_eq!(next_generation(&grid).live_count(), 0);
    }

    #[test]
    fn block_is_still_life() {
        let block = [
            CellCoord::new(1, 1),
            CellCoord::new(2, 1),
            CellCoord::new(1, 2),
            CellCoord::new(2, 2),
        ];
        let mut grid = HostGrid::from_live_cells(dims(4, 4), &block);
        let start = grid.clone();
        for _ in 0..10 {
            grid = next_generation(&grid);
            assert_eq!(grid, start);
        }
    }

    #[test]
    fn blinker_oscillates_with_period_two() {
        let horizontal = [
            CellCoord::new(1, 2),
            CellCoord::new(2, 2),
            CellCoord::new(3, 2),
        ];
        let start = HostGrid::from_live_cells(dims(5, 5), &horizontal);
        let once = next_generation(&start);
        assert_eq!(
            once.live_cells(),
            vec![CellCoord::new(2, 1), CellCoord::new(2, 2), CellCoord::new(2, 3)]
        );
        assert_eq!(next_generation(&once), start);
    }

    #[test]
    fn neighbours_wrap_around_edges() {
        // Horizontal blinker straddling the left/right seam.
        let seam = [
            CellCoord::new(4, 2),
            CellCoord::new(0, 2),
            CellCoord::new(1, 2),
        ];
        let grid = HostGrid::from_live_cells(dims(5, 5), &seam);
        let next = next_generation(&grid);
        assert_eq!(
            next.live_cells(),
            vec![CellCoord::new(0, 1), CellCoord::new(0, 2), CellCoord::new(0, 3)]
        );
    }
}
