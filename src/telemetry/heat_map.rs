//! Diagnostic touch-density grid over the touchpad bounds. It never affects cursor behavior.

use serde::Serialize;

use crate::models::geometry::{PlanarVector, RectBounds};

#[derive(Debug, Clone)]
pub struct HeatMap {
    bounds: RectBounds,
    columns: usize,
    rows: usize,
    cells: Vec<u32>,
    total: u64,
}

/// Serializable view of the grid, row-major.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeatMapSnapshot {
    pub columns: usize,
    pub rows: usize,
    pub total: u64,
    pub cells: Vec<u32>,
}

impl HeatMap {
    pub fn new(bounds: RectBounds, columns: usize, rows: usize) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        Self {
            bounds,
            columns,
            rows,
            cells: vec![0; columns * rows],
            total: 0,
        }
    }

    /// Points outside the bounds land in the nearest edge cell.
    pub fn record(&mut self, point: PlanarVector) {
        if !point.is_finite() {
            return;
        }
        let (column, row) = self.cell_of(point);
        let idx = row * self.columns + column;
        self.cells[idx] = self.cells[idx].saturating_add(1);
        self.total += 1;
    }

    pub fn cell_of(&self, point: PlanarVector) -> (usize, usize) {
        let clamped = self.bounds.clamp(point);
        (
            bucket(clamped.x - self.bounds.min.x, self.bounds.width(), self.columns),
            bucket(clamped.y - self.bounds.min.y, self.bounds.height(), self.rows),
        )
    }

    pub fn count(&self, column: usize, row: usize) -> u32 {
        if column >= self.columns || row >= self.rows {
            return 0;
        }
        self.cells[row * self.columns + column]
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Share of all recorded samples that fell into the cell.
    pub fn density(&self, column: usize, row: usize) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(column, row) as f64 / self.total as f64
    }

    pub fn hottest_cell(&self) -> Option<(usize, usize, u32)> {
        let (idx, count) = self
            .cells
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))?;
        if *count == 0 {
            return None;
        }
        Some((idx % self.columns, idx / self.columns, *count))
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = 0);
        self.total = 0;
    }

    pub fn snapshot(&self) -> HeatMapSnapshot {
        HeatMapSnapshot {
            columns: self.columns,
            rows: self.rows,
            total: self.total,
            cells: self.cells.clone(),
        }
    }
}

fn bucket(offset: f64, extent: f64, count: usize) -> usize {
    if extent <= 0.0 {
        return 0;
    }
    let idx = (offset / extent * count as f64).floor() as usize;
    idx.min(count - 1)
}
