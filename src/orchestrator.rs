// ============================================================================
// orchestrator.rs — GridLife
// Session state machine: owns the engine, the step counter and the host
// snapshot, and sequences step / render / edit / readback calls.
// ============================================================================

use crate::engine::CellEngine;
use crate::error::LifeError;
use crate::grid::{BufferRole, CellCoord, HostGrid, SessionState};
use crate::input::{CoordinateMapper, HoverPoint};
use crate::metrics::GridStats;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifeState {
    /// No engine yet.
    Idle,
    /// Engine built, not yet started.
    Ready,
    Running,
    Paused,
    Disposed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Ready,
    Running,
    Paused,
}

enum Phase<E> {
    Idle,
    Live { engine: E, mode: Mode },
    Disposed,
}

pub struct Orchestrator<E> {
    phase: Phase<E>,
    session: SessionState,
    snapshot: HostGrid,
    hover: Option<HoverPoint>,
    mapper: CoordinateMapper,
    last_stats: Option<GridStats>,
}

impl<E: CellEngine> Orchestrator<E> {
    /// Idle session seeded with `snapshot`, drawn onto a canvas of the given
    /// pixel size.
    pub fn new(snapshot: HostGrid, canvas_width: u32, canvas_height: u32) -> Self {
        let mapper = CoordinateMapper::new(snapshot.dims(), canvas_width, canvas_height);
        Self {
            phase: Phase::Idle,
            session: SessionState::new(),
            snapshot,
            hover: None,
            mapper,
            last_stats: None,
        }
    }

    pub fn state(&self) -> LifeState {
        match &self.phase {
            Phase::Idle => LifeState::Idle,
            Phase::Live { mode, .. } => match mode {
                Mode::Ready => LifeState::Ready,
                Mode::Running => LifeState::Running,
                Mode::Paused => LifeState::Paused,
            },
            Phase::Disposed => LifeState::Disposed,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn snapshot(&self) -> &HostGrid {
        &self.snapshot
    }

    pub fn hover_point(&self) -> Option<HoverPoint> {
        self.hover
    }

    pub fn engine(&self) -> Option<&E> {
        match &self.phase {
            Phase::Live { engine, .. } => Some(engine),
            _ => None,
        }
    }

    /// Stats for the host snapshot at the current generation.
    pub fn stats(&self) -> GridStats {
        GridStats::from_cells(self.session.step_count(), self.snapshot.cells())
    }

    // ======================== Transitions ========================

    /// `Idle → Ready`. Takes ownership of an initialized engine, uploads the
    /// host snapshot into its current buffer and draws the first frame.
    pub fn create(&mut self, mut engine: E) -> Result<(), LifeError> {
        let state = self.state();
        if state != LifeState::Idle {
            return Err(LifeError::InvalidTransition {
                state,
                action: "create",
            });
        }
        let grid = self.snapshot.dims();
        if engine.grid() != grid {
            return Err(LifeError::SizeMismatch {
                expected: grid.area(),
                actual: engine.grid().area(),
            });
        }
        // Idle edits live only in the snapshot until now.
        engine.write_cells(&self.session, BufferRole::Current, self.snapshot.cells())?;
        self.phase = Phase::Live {
            engine,
            mode: Mode::Ready,
        };
        log::info!("Session ready: {}x{} grid", grid.width, grid.height);
        self.render_first_frame()
    }

    /// One compute pass that does not count as a generation, then a frame.
    fn render_first_frame(&mut self) -> Result<(), LifeError> {
        let hover = self.hover;
        if let Phase::Live { engine, .. } = &mut self.phase {
            engine.step(&self.session)?;
            engine.render(&self.session, hover)?;
        }
        Ok(())
    }

    /// `Ready/Paused → Running`, or `Running → Paused`. Pausing refreshes the
    /// host snapshot from the device.
    pub async fn toggle_run(&mut self) -> Result<LifeState, LifeError> {
        let next = match &mut self.phase {
            Phase::Idle => {
                log::debug!("toggle_run before create; ignored");
                return Ok(LifeState::Idle);
            }
            Phase::Disposed => {
                return Err(LifeError::InvalidTransition {
                    state: LifeState::Disposed,
                    action: "toggle run",
                })
            }
            Phase::Live { mode, .. } => {
                *mode = match *mode {
                    Mode::Ready | Mode::Paused => Mode::Running,
                    Mode::Running => Mode::Paused,
                };
                *mode
            }
        };

        if next == Mode::Paused {
            self.sync_snapshot().await?;
            let stats = self.stats();
            stats.log(self.last_stats.as_ref());
            self.last_stats = Some(stats);
        }
        let state = self.state();
        log::info!(
            "Session {:?} at generation {}",
            state,
            self.session.step_count()
        );
        Ok(state)
    }

    /// Advance one generation and draw it. Does nothing unless running.
    pub fn tick(&mut self) -> Result<bool, LifeError> {
        let hover = self.hover;
        let Phase::Live {
            engine,
            mode: Mode::Running,
        } = &mut self.phase
        else {
            return Ok(false);
        };
        engine.step(&self.session)?;
        self.session.advance();
        engine.render(&self.session, hover)?;
        log::trace!("Generation {}", self.session.step_count());
        Ok(true)
    }

    /// Toggle the cell under a canvas pixel.
    pub fn edit_cell(&mut self, screen_x: f64, screen_y: f64) -> Result<bool, LifeError> {
        match self.mapper.to_cell(screen_x, screen_y) {
            Some(cell) => self.edit_cell_at(cell),
            None => Ok(false),
        }
    }

    /// Flip one cell in the host snapshot, upload the snapshot into the
    /// current buffer and redraw without advancing the generation.
    ///
    /// Ignored while running. Before `create` only the snapshot changes.
    pub fn edit_cell_at(&mut self, cell: CellCoord) -> Result<bool, LifeError> {
        if !self.snapshot.dims().contains(cell) {
            return Ok(false);
        }
        let hover = self.hover;
        match &mut self.phase {
            Phase::Disposed => Err(LifeError::InvalidTransition {
                state: LifeState::Disposed,
                action: "edit a cell",
            }),
            Phase::Live {
                mode: Mode::Running,
                ..
            } => {
                log::debug!("Edit at ({}, {}) ignored while running", cell.x, cell.y);
                Ok(false)
            }
            Phase::Idle => {
                self.snapshot.toggle(cell);
                Ok(true)
            }
            Phase::Live { engine, .. } => {
                let alive = self.snapshot.toggle(cell);
                engine.write_cells(&self.session, BufferRole::Current, self.snapshot.cells())?;
                engine.render(&self.session, hover)?;
                log::debug!(
                    "Cell ({}, {}) now {}",
                    cell.x,
                    cell.y,
                    if alive { "alive" } else { "dead" }
                );
                Ok(true)
            }
        }
    }

    /// Record the cursor position (canvas pixels) for the next frame, or
    /// clear it. Ignored while running.
    pub fn hover(&mut self, position: Option<(f64, f64)>) -> Result<bool, LifeError> {
        match self.state() {
            LifeState::Running => Ok(false),
            LifeState::Disposed => Err(LifeError::InvalidTransition {
                state: LifeState::Disposed,
                action: "hover",
            }),
            _ => {
                self.hover = position.and_then(|(x, y)| self.mapper.to_ndc(x, y));
                Ok(true)
            }
        }
    }

    /// Draw the current generation without stepping.
    pub fn redraw(&mut self) -> Result<bool, LifeError> {
        let hover = self.hover;
        match &mut self.phase {
            Phase::Live { engine, .. } => {
                engine.render(&self.session, hover)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Copy of the current generation, or `None` before `create` / after
    /// `dispose`.
    pub async fn read_current_generation(&mut self) -> Result<Option<Vec<u32>>, LifeError> {
        match &mut self.phase {
            Phase::Live { engine, .. } => {
                Ok(Some(engine.read_current_generation(&self.session).await?))
            }
            _ => Ok(None),
        }
    }

    async fn sync_snapshot(&mut self) -> Result<(), LifeError> {
        if let Some(cells) = self.read_current_generation().await? {
            self.snapshot.replace(cells)?;
        }
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.mapper.resize(width, height);
        if let Phase::Live { engine, .. } = &mut self.phase {
            engine.resize(width, height);
        }
    }

    /// Release the engine and everything it owns. Idempotent.
    pub fn dispose(&mut self) {
        if !matches!(self.phase, Phase::Disposed) {
            log::info!(
                "Session disposed after {} generations",
                self.session.step_count()
            );
        }
        self.phase = Phase::Disposed;
        self.hover = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::CpuLife;
    use crate::grid::{next_generation, GridDims};

    fn session(width: u32, height: u32) -> Orchestrator<CpuLife> {
        let grid = HostGrid::empty(GridDims::new(width, height).unwrap());
        let mut orch = Orchestrator::new(grid.clone(), 400, 400);
        orch.create(CpuLife::new(&grid)).unwrap();
        orch
    }

    fn toggle(orch: &mut Orchestrator<CpuLife>) -> LifeState {
        pollster::block_on(orch.toggle_run()).unwrap()
    }

    fn dispatches(orch: &Orchestrator<CpuLife>) -> u64 {
        orch.engine().unwrap().dispatches()
    }

    fn frames(orch: &Orchestrator<CpuLife>) -> u64 {
        orch.engine().unwrap().frames()
    }

    #[test]
    fn lifecycle_transitions() {
        let grid = HostGrid::empty(GridDims::new(4, 4).unwrap());
        let mut orch: Orchestrator<CpuLife> = Orchestrator::new(grid.clone(), 400, 400);
        assert_eq!(orch.state(), LifeState::Idle);
        assert_eq!(toggle(&mut orch), LifeState::Idle);

        orch.create(CpuLife::new(&grid)).unwrap();
        assert_eq!(orch.state(), LifeState::Ready);
        assert!(matches!(
            orch.create(CpuLife::new(&grid)),
            Err(LifeError::InvalidTransition {
                state: LifeState::Ready,
                ..
            })
        ));

        assert_eq!(toggle(&mut orch), LifeState::Running);
        assert_eq!(toggle(&mut orch), LifeState::Paused);
        assert_eq!(toggle(&mut orch), LifeState::Running);

        orch.dispose();
        assert_eq!(orch.state(), LifeState::Disposed);
        assert!(orch.engine().is_none());
        assert!(pollster::block_on(orch.toggle_run()).is_err());
        assert!(!orch.tick().unwrap());
        orch.dispose();
        assert_eq!(orch.state(), LifeState::Disposed);
    }

    #[test]
    fn create_rejects_mismatched_engine() {
        let grid = HostGrid::empty(GridDims::new(4, 4).unwrap());
        let other = HostGrid::empty(GridDims::new(5, 4).unwrap());
        let mut orch = Orchestrator::new(grid, 400, 400);
        assert!(matches!(
            orch.create(CpuLife::new(&other)),
            Err(LifeError::SizeMismatch {
                expected: 16,
                actual: 20
            })
        ));
        assert_eq!(orch.state(), LifeState::Idle);
    }

    #[test]
    fn create_draws_first_frame_without_counting() {
        let orch = session(4, 4);
        assert_eq!(orch.session().step_count(), 0);
        assert_eq!(dispatches(&orch), 1);
        assert_eq!(frames(&orch), 1);
    }

    #[test]
    fn tick_only_advances_while_running() {
        let mut orch = session(4, 4);
        assert!(!orch.tick().unwrap());
        assert_eq!(orch.session().step_count(), 0);

        toggle(&mut orch);
        assert!(orch.tick().unwrap());
        assert!(orch.tick().unwrap());
        assert_eq!(orch.session().step_count(), 2);

        toggle(&mut orch);
        let (d, f) = (dispatches(&orch), frames(&orch));
        for _ in 0..5 {
            assert!(!orch.tick().unwrap());
        }
        assert_eq!(orch.session().step_count(), 2);
        assert_eq!((dispatches(&orch), frames(&orch)), (d, f));
    }

    #[test]
    fn render_reads_the_slot_just_written() {
        let mut orch = session(5, 5);
        toggle(&mut orch);
        for _ in 0..4 {
            orch.tick().unwrap();
            let engine = orch.engine().unwrap();
            assert_eq!(engine.last_render_slot(), engine.last_step_slot());
            assert_eq!(
                engine.last_render_slot(),
                Some(orch.session().parity().current_slot())
            );
        }
    }

    #[test]
    fn edit_twice_restores_cell() {
        let mut orch = session(4, 4);
        let cell = CellCoord::new(2, 1);
        assert!(orch.edit_cell_at(cell).unwrap());
        assert!(orch.snapshot().is_alive(cell));
        assert!(orch.edit_cell_at(cell).unwrap());
        assert!(!orch.snapshot().is_alive(cell));
        let cells = pollster::block_on(orch.read_current_generation())
            .unwrap()
            .unwrap();
        assert!(cells.iter().all(|&c| c == 0));
        assert_eq!(orch.session().step_count(), 0);
    }

    #[test]
    fn edit_writes_the_current_buffer() {
        let mut orch = session(4, 4);
        toggle(&mut orch);
        orch.tick().unwrap();
        toggle(&mut orch);
        orch.edit_cell_at(CellCoord::new(0, 0)).unwrap();
        let engine = orch.engine().unwrap();
        assert_eq!(
            engine.last_write_slot(),
            Some(orch.session().parity().current_slot())
        );
        assert_eq!(engine.last_render_slot(), engine.last_write_slot());
    }

    #[test]
    fn two_edits_then_readback() {
        let mut orch = session(4, 4);
        // (150, 250) → cell (1, 1); (250, 150) → cell (2, 2) on a 400px canvas.
        assert!(orch.edit_cell(150.0, 250.0).unwrap());
        assert!(orch.edit_cell(250.0, 150.0).unwrap());
        assert!(orch.redraw().unwrap());

        let cells = pollster::block_on(orch.read_current_generation())
            .unwrap()
            .unwrap();
        let dims = orch.snapshot().dims();
        let live: Vec<usize> = (0..cells.len()).filter(|&i| cells[i] != 0).collect();
        assert_eq!(
            live,
            vec![
                dims.index(CellCoord::new(1, 1)),
                dims.index(CellCoord::new(2, 2))
            ]
        );
        assert_eq!(orch.session().step_count(), 0);
    }

    #[test]
    fn edits_and_hover_ignored_while_running() {
        let mut orch = session(4, 4);
        orch.hover(Some((10.0, 10.0))).unwrap();
        let before = orch.hover_point();
        assert!(before.is_some());

        toggle(&mut orch);
        assert!(!orch.edit_cell_at(CellCoord::new(1, 1)).unwrap());
        assert!(!orch.snapshot().is_alive(CellCoord::new(1, 1)));
        assert!(!orch.hover(None).unwrap());
        assert_eq!(orch.hover_point(), before);
    }

    #[test]
    fn hover_outside_canvas_clears_overlay() {
        let mut orch = session(4, 4);
        orch.hover(Some((200.0, 200.0))).unwrap();
        assert_eq!(orch.hover_point(), Some(HoverPoint { x: 0.0, y: 0.0 }));
        orch.redraw().unwrap();
        assert_eq!(
            orch.engine().unwrap().last_hover(),
            Some(HoverPoint { x: 0.0, y: 0.0 })
        );
        orch.hover(Some((500.0, 10.0))).unwrap();
        assert_eq!(orch.hover_point(), None);
    }

    #[test]
    fn pause_refreshes_snapshot() {
        let dims = GridDims::new(5, 5).unwrap();
        let blinker = [
            CellCoord::new(1, 2),
            CellCoord::new(2, 2),
            CellCoord::new(3, 2),
        ];
        let grid = HostGrid::from_live_cells(dims, &blinker);
        let mut orch = Orchestrator::new(grid.clone(), 500, 500);
        orch.create(CpuLife::new(&grid)).unwrap();

        toggle(&mut orch);
        orch.tick().unwrap();
        toggle(&mut orch);
        assert_eq!(orch.snapshot(), &next_generation(&grid));
        assert_eq!(orch.stats().live, 3);
        assert_eq!(orch.stats().generation, 1);
    }

    #[test]
    fn idle_edits_seed_the_engine_on_create() {
        let grid = HostGrid::empty(GridDims::new(4, 4).unwrap());
        let mut orch = Orchestrator::new(grid.clone(), 400, 400);
        orch.edit_cell_at(CellCoord::new(1, 1)).unwrap();
        orch.create(CpuLife::new(&grid)).unwrap();

        let cells = pollster::block_on(orch.read_current_generation())
            .unwrap()
            .unwrap();
        assert_eq!(cells, orch.snapshot().cells());
        assert_eq!(cells.iter().filter(|&&c| c != 0).count(), 1);
        assert_eq!(orch.engine().unwrap().last_write_slot(), Some(0));
        assert_eq!(orch.session().step_count(), 0);
    }

    #[test]
    fn idle_edits_only_touch_snapshot() {
        let grid = HostGrid::empty(GridDims::new(4, 4).unwrap());
        let mut orch: Orchestrator<CpuLife> = Orchestrator::new(grid, 400, 400);
        assert!(orch.edit_cell_at(CellCoord::new(3, 3)).unwrap());
        assert!(orch.snapshot().is_alive(CellCoord::new(3, 3)));
        assert!(!orch.redraw().unwrap());
        assert_eq!(pollster::block_on(orch.read_current_generation()).unwrap(), None);
    }
}
