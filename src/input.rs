// ============================================================================
// input.rs — GridLife
// Screen-space to grid / NDC conversion for click edits and hover tracking.
// ============================================================================

use crate::grid::{CellCoord, GridDims};

/// Cursor position in normalized device coordinates ([-1, 1], y up).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverPoint {
    pub x: f32,
    pub y: f32,
}

/// Maps canvas-relative pixel coordinates onto the grid.
#[derive(Clone, Copy, Debug)]
pub struct CoordinateMapper {
    grid: GridDims,
    canvas_width: f64,
    canvas_height: f64,
}

impl CoordinateMapper {
    pub fn new(grid: GridDims, canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            grid,
            canvas_width: canvas_width.max(1) as f64,
            canvas_height: canvas_height.max(1) as f64,
        }
    }

    pub fn resize(&mut self, canvas_width: u32, canvas_height: u32) {
        self.canvas_width = canvas_width.max(1) as f64;
        self.canvas_height = canvas_height.max(1) as f64;
    }

    /// Pixel extent of one cell along each axis.
    pub fn cell_pixel_size(&self) -> (f64, f64) {
        (
            self.canvas_width / self.grid.width as f64,
            self.canvas_height / self.grid.height as f64,
        )
    }

    fn on_canvas(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && y >= 0.0 && x < self.canvas_width && y < self.canvas_height
    }

    /// Grid cell under a canvas pixel. Row 0 is the bottom row.
    pub fn to_cell(&self, x: f64, y: f64) -> Option<CellCoord> {
        if !self.on_canvas(x, y) {
            return None;
        }
        let (cell_w, cell_h) = self.cell_pixel_size();
        // y == 0 lands exactly on the top edge, one row past the last.
        let col = ((x / cell_w).floor() as u32).min(self.grid.width - 1);
        let row = (((self.canvas_height - y) / cell_h).floor() as u32).min(self.grid.height - 1);
        Some(CellCoord::new(col, row))
    }

    pub fn to_ndc(&self, x: f64, y: f64) -> Option<HoverPoint> {
        if !self.on_canvas(x, y) {
            return None;
        }
        Some(HoverPoint {
            x: ((x / self.canvas_width) * 2.0 - 1.0) as f32,
            y: (1.0 - (y / self.canvas_height) * 2.0) as f32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(GridDims::new(4, 4).unwrap(), 400, 400)
    }

    #[test]
    fn click_maps_to_flipped_row() {
        let m = mapper();
        assert_eq!(m.cell_pixel_size(), (100.0, 100.0));
        // Top-left pixel is the top row.
        assert_eq!(m.to_cell(0.0, 1.0), Some(CellCoord::new(0, 3)));
        // Bottom-right pixel is the bottom row.
        assert_eq!(m.to_cell(399.0, 399.0), Some(CellCoord::new(3, 0)));
        assert_eq!(m.to_cell(150.0, 250.0), Some(CellCoord::new(1, 1)));
    }

    #[test]
    fn click_outside_canvas_is_ignored() {
        let m = mapper();
        assert_eq!(m.to_cell(-1.0, 10.0), None);
        assert_eq!(m.to_cell(400.0, 10.0), None);
        assert_eq!(m.to_cell(10.0, 400.0), None);
    }

    #[test]
    fn top_pixel_row_maps_to_top_cell_row() {
        let m = mapper();
        assert_eq!(m.to_cell(10.0, 0.0), Some(CellCoord::new(0, 3)));
        assert_eq!(m.to_cell(399.5, 0.0), Some(CellCoord::new(3, 3)));
    }

    #[test]
    fn ndc_is_centered_and_y_up() {
        let m = mapper();
        assert_eq!(m.to_ndc(200.0, 200.0), Some(HoverPoint { x: 0.0, y: 0.0 }));
        assert_eq!(m.to_ndc(0.0, 0.0), Some(HoverPoint { x: -1.0, y: 1.0 }));
        assert_eq!(m.to_ndc(100.0, 300.0), Some(HoverPoint { x: -0.5, y: -0.5 }));
        assert_eq!(m.to_ndc(400.0, 10.0), None);
    }

    #[test]
    fn resize_changes_cell_size() {
        let mut m = mapper();
        m.resize(800, 200);
        assert_eq!(m.cell_pixel_size(), (200.0, 50.0));
        assert_eq!(m.to_cell(799.0, 199.0), Some(CellCoord::new(3, 0)));
    }
}
