// Fibroblasts - LLS Migration Simulator
// Copyright (c) 2025 Filipe da Veiga Ventura Alves
// Licensed under MIT License

use rand::Rng;
use rayon::prelude::*;

use crate::fibroblast::{CellParams, Fibroblast};
use crate::lls::{Bounds, TargetField};
use crate::settings::{SimulationSettings, VertexIndexKind};
use crate::vertex_index::{GridIndex, VertexIndex};

/// Summary numbers for logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Census {
    pub moving: usize,
    pub resting: usize,
    /// Mean distance from each cell to its nearest LLS vertex; `None` on an empty field.
    pub mean_vertex_distance: Option<f32>,
}

/// Owns the LLS field, its vertex index and the fibroblast population.
pub struct Simulation {
    field: TargetField,
    grid: Option<GridIndex>,
    cells: Vec<Fibroblast>,
    parallel: bool,
    ticks: u64,
}

impl Simulation {
    /// Generates the field and spawns the population at `now`.
    pub fn new<R: Rng + ?Sized>(settings: &SimulationSettings, rng: &mut R, now: u64) -> Self {
        let bounds = settings.bounds();
        let field = TargetField::generate(settings.lls_count, bounds, &settings.lls_params(), rng);
        let cells = spawn_cells(settings.cell_count, bounds, settings.cell_params(), rng, now);

        log::info!(
            "simulation ready: {} LLS ({} vertices), {} fibroblasts in {}x{}",
            field.len(),
            field.vertex_count(),
            cells.len(),
            bounds.width,
            bounds.height
        );

        Self::from_parts(field, cells, settings.vertex_index, settings.parallel_update)
    }

    pub fn from_parts(
        field: TargetField,
        cells: Vec<Fibroblast>,
        index_kind: VertexIndexKind,
        parallel: bool,
    ) -> Self {
        let grid = match index_kind {
            VertexIndexKind::Scan => None,
            VertexIndexKind::Grid => Some(GridIndex::build(&field, grid_cell_size(&field))),
        };
        Self {
            field,
            grid,
            cells,
            parallel,
            ticks: 0,
        }
    }

    pub fn field(&self) -> &TargetField {
        &self.field
    }

    pub fn cells(&self) -> &[Fibroblast] {
        &self.cells
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn index(&self) -> &dyn VertexIndex {
        match &self.grid {
            Some(grid) => grid,
            None => &self.field,
        }
    }

    /// Advances every cell by one tick. Cells only read the field and write their
    /// own state, so the parallel path produces the same result as the serial one.
    pub fn tick(&mut self, now: u64) {
        let index: &dyn VertexIndex = match &self.grid {
            Some(grid) => grid,
            None => &self.field,
        };

        if self.parallel {
            self.cells
                .par_iter_mut()
                .for_each(|cell| cell.update(now, index));
        } else {
            for cell in &mut self.cells {
                cell.update(now, index);
            }
        }
        self.ticks += 1;
    }

    pub fn census(&self) -> Census {
        let resting = self.cells.iter().filter(|c| c.is_resting()).count();
        let index = self.index();
        let mean_vertex_distance = if index.is_empty() || self.cells.is_empty() {
            None
        } else {
            let total: f32 = self
                .cells
                .iter()
                .filter_map(|c| index.nearest_vertex(c.position()))
                .map(|n| n.distance_sq.sqrt())
                .sum();
            Some(total / self.cells.len() as f32)
        };
        Census {
            moving: self.cells.len() - resting,
            resting,
            mean_vertex_distance,
        }
    }
}

/// Uniform random integer positions at least one body radius inside the bounds.
pub fn spawn_cells<R: Rng + ?Sized>(
    count: u32,
    bounds: Bounds,
    params: CellParams,
    rng: &mut R,
    now: u64,
) -> Vec<Fibroblast> {
    let inset = params.radius.max(0.0) as i64;
    let mut axis = |extent: u32| -> f32 {
        let range = inset..=(i64::from(extent) - inset);
        if range.is_empty() {
            extent as f32 * 0.5
        } else {
            rng.gen_range(range) as f32
        }
    };
    (0..count)
        .map(|_| {
            let x = axis(bounds.width);
            let y = axis(bounds.height);
            Fibroblast::new([x, y], params, now)
        })
        .collect()
}

/// Roughly one ring span per cell keeps buckets small.
fn grid_cell_size(field: &TargetField) -> f32 {
    field
        .targets()
        .iter()
        .map(|lls| lls.max_radius() as f32)
        .fold(0.0f32, f32::max)
        .max(1.0)
}
