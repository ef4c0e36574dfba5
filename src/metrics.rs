// ============================================================================
// metrics.rs — GridLife
// Population diagnostics computed from a host snapshot.
// ============================================================================

/// Population summary for one generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridStats {
    pub generation: u64,
    pub live: usize,
    pub total: usize,
    pub live_fraction: f32,
}

impl GridStats {
    pub fn from_cells(generation: u64, cells: &[u32]) -> Self {
        let total = cells.len();
        let live = cells.iter().filter(|&&c| c != 0).count();
        let live_fraction = if total > 0 {
            live as f32 / total as f32
        } else {
            0.0
        };
        Self {
            generation,
            live,
            total,
            live_fraction,
        }
    }

    pub fn is_extinct(&self) -> bool {
        self.live == 0
    }

    /// Log at INFO level, with the change since `prev` when given.
    pub fn log(&self, prev: Option<&GridStats>) {
        log::info!(
            "Generation {}: live={}/{} ({:.1}%)",
            self.generation,
            self.live,
            self.total,
            self.live_fraction * 100.0,
        );
        if let Some(p) = prev {
            log::info!(
                "TRENDS: Δgen={:+} | Δlive={:+}",
                self.generation as i64 - p.generation as i64,
                self.live as i64 - p.live as i64,
            );
        }
    }
}
