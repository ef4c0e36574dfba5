// ============================================================================
// cpu.rs — GridLife
// Host-memory engine with the same ping-pong layout and update rule as the
// GPU path. Drives headless runs without an adapter and the state machine
// tests.
// ============================================================================

use crate::engine::CellEngine;
use crate::error::LifeError;
use crate::grid::{check_cells, step_cells, BufferRole, GridDims, HostGrid, SessionState};
use crate::input::HoverPoint;

/// Cell buffers A (slot 0) and B (slot 1) in host memory.
pub struct CpuLife {
    grid: GridDims,
    cells: [Vec<u32>; 2],
    dispatches: u64,
    frames: u64,
    last_step_slot: Option<usize>,
    last_render_slot: Option<usize>,
    last_write_slot: Option<usize>,
    last_hover: Option<HoverPoint>,
}

impl CpuLife {
    pub fn new(initial: &HostGrid) -> Self {
        Self {
            grid: initial.dims(),
            cells: [initial.cells().to_vec(), initial.cells().to_vec()],
            dispatches: 0,
            frames: 0,
            last_step_slot: None,
            last_render_slot: None,
            last_write_slot: None,
            last_hover: None,
        }
    }

    /// Compute steps run so far, counted or not.
    pub fn dispatches(&self) -> u64 {
        self.dispatches
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Slot the most recent step wrote.
    pub fn last_step_slot(&self) -> Option<usize> {
        self.last_step_slot
    }

    /// Slot the most recent frame read.
    pub fn last_render_slot(&self) -> Option<usize> {
        self.last_render_slot
    }

    pub fn last_write_slot(&self) -> Option<usize> {
        self.last_write_slot
    }

    pub fn last_hover(&self) -> Option<HoverPoint> {
        self.last_hover
    }

    pub fn slot(&self, slot: usize) -> &[u32] {
        &self.cells[slot]
    }
}

impl CellEngine for CpuLife {
    fn grid(&self) -> GridDims {
        self.grid
    }

    fn step(&mut self, session: &SessionState) -> Result<(), LifeError> {
        let parity = session.parity();
        let [a, b] = &mut self.cells;
        let (input, output) = match parity.current_slot() {
            0 => (&*a, b),
            _ => (&*b, a),
        };
        step_cells(self.grid, input, output);
        self.dispatches += 1;
        self.last_step_slot = Some(parity.next_slot());
        Ok(())
    }

    fn render(
        &mut self,
        session: &SessionState,
        hover: Option<HoverPoint>,
    ) -> Result<(), LifeError> {
        self.frames += 1;
        self.last_render_slot = Some(session.parity().current_slot());
        self.last_hover = hover;
        Ok(())
    }

    fn write_cells(
        &mut self,
        session: &SessionState,
        role: BufferRole,
        cells: &[u32],
    ) -> Result<(), LifeError> {
        check_cells(self.grid, cells)?;
        let slot = role.slot(session.parity());
        self.cells[slot].copy_from_slice(cells);
        self.last_write_slot = Some(slot);
        Ok(())
    }

    async fn read_current_generation(
        &mut self,
        session: &SessionState,
    ) -> Result<Vec<u32>, LifeError> {
        Ok(self.cells[session.parity().current_slot()].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{next_generation, CellCoord};

    #[test]
    fn step_writes_the_next_slot() {
        let dims = GridDims::new(5, 5).unwrap();
        let blinker = [
            CellCoord::new(1, 2),
            CellCoord::new(2, 2),
            CellCoord::new(3, 2),
        ];
        let initial = HostGrid::from_live_cells(dims, &blinker);
        let mut engine = CpuLife::new(&initial);
        let mut session = SessionState::new();

        engine.step(&session).unwrap();
        assert_eq!(engine.last_step_slot(), Some(1));
        assert_eq!(engine.slot(1), next_generation(&initial).cells());
        // Source buffer untouched.
        assert_eq!(engine.slot(0), initial.cells());

        session.advance();
        engine.step(&session).unwrap();
        assert_eq!(engine.last_step_slot(), Some(0));
        assert_eq!(engine.slot(0), initial.cells());
        assert_eq!(engine.dispatches(), 2);
    }

    #[test]
    fn write_rejects_wrong_length_before_touching_buffers() {
        let dims = GridDims::new(4, 4).unwrap();
        let mut engine = CpuLife::new(&HostGrid::empty(dims));
        let err = engine
            .write_cells(&SessionState::new(), BufferRole::Next, &[1; 5])
            .unwrap_err();
        assert!(matches!(err, LifeError::SizeMismatch { expected: 16, actual: 5 }));
        assert_eq!(engine.last_write_slot(), None);
        assert!(engine.slot(1).iter().all(|&c| c == 0));
    }

    #[test]
    fn write_rejects_non_binary_cells() {
        let dims = GridDims::new(4, 4).unwrap();
        let mut engine = CpuLife::new(&HostGrid::empty(dims));
        let mut cells = vec![0; 16];
        cells[3] = u32::MAX;
        let err = engine
            .write_cells(&SessionState::new(), BufferRole::Current, &cells)
            .unwrap_err();
        assert!(matches!(err, LifeError::InvalidCell { index: 3, .. }));
        assert!(engine.slot(0).iter().all(|&c| c == 0));

        // The rule never sees the rejected values, so stepping stays in range.
        engine.step(&SessionState::new()).unwrap();
        assert!(engine.slot(1).iter().all(|&c| c == 0));
    }

    #[test]
    fn readback_follows_parity() {
        let dims = GridDims::new(4, 4).unwrap();
        let mut engine = CpuLife::new(&HostGrid::empty(dims));
        let mut session = SessionState::new();
        session.advance();
        let mut cells = vec![0; 16];
        cells[5] = 1;
        engine
            .write_cells(&session, BufferRole::Current, &cells)
            .unwrap();
        assert_eq!(engine.last_write_slot(), Some(1));
        let read = pollster::block_on(engine.read_current_generation(&session)).unwrap();
        assert_eq!(read, cells);
    }
}
