// Fibroblasts - LLS Migration Simulator
// Copyright (c) 2025 Filipe da Veiga Ventura Alves
// Licensed under MIT License

//! Nearest-vertex queries over every LLS ring in a field.

use crate::lls::{distance_sq, TargetField};

/// Result of a nearest-vertex query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestVertex {
    pub position: [f32; 2],
    pub distance_sq: f32,
    /// Index of the owning LLS in the field.
    pub target: usize,
    /// Index of the vertex within that LLS ring.
    pub vertex: usize,
}

/// Common behaviour of nearest-vertex indices.
///
/// Implementations must agree exactly: Euclidean nearest, ties going to the vertex
/// enumerated first (LLS order, then ring order).
pub trait VertexIndex: Sync {
    /// `None` when the field holds no vertices.
    fn nearest_vertex(&self, point: [f32; 2]) -> Option<NearestVertex>;

    fn is_empty(&self) -> bool;
}

/// Per-LLS nearest first, then the global minimum across LLS.
impl VertexIndex for TargetField {
    fn nearest_vertex(&self, point: [f32; 2]) -> Option<NearestVertex> {
        let mut best: Option<NearestVertex> = None;
        for (t, lls) in self.targets().iter().enumerate() {
            let Some((v, d2)) = lls.nearest_vertex(point) else {
                continue;
            };
            if best.map_or(true, |b| d2 < b.distance_sq) {
                best = Some(NearestVertex {
                    position: lls.vertices()[v],
                    distance_sq: d2,
                    target: t,
                    vertex: v,
                });
            }
        }
        best
    }

    fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }
}

const MAX_GRID_DIM: f32 = 512.0;

#[derive(Debug, Clone, Copy)]
struct GridVertex {
    position: [f32; 2],
    target: u32,
    vertex: u32,
}

/// Uniform grid over all LLS vertices. Visits cells ring by ring around the query
/// cell until no unvisited cell can hold a vertex at or below the best distance.
#[derive(Debug, Clone)]
pub struct GridIndex {
    cell_size: f32,
    origin: [f32; 2],
    cols: usize,
    rows: usize,
    /// Each bucket lists vertices in enumeration order.
    cells: Vec<Vec<GridVertex>>,
    len: usize,
}

impl GridIndex {
    pub fn build(field: &TargetField, cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };

        let mut min = [f32::INFINITY; 2];
        let mut max = [f32::NEG_INFINITY; 2];
        for v in field.targets().iter().flat_map(|lls| lls.vertices()) {
            min[0] = min[0].min(v[0]);
            min[1] = min[1].min(v[1]);
            max[0] = max[0].max(v[0]);
            max[1] = max[1].max(v[1]);
        }
        let len = field.vertex_count();
        if len == 0 {
            return Self {
                cell_size,
                origin: [0.0, 0.0],
                cols: 0,
                rows: 0,
                cells: Vec::new(),
                len: 0,
            };
        }

        // Cap the grid so a tiny cell size over a wide field cannot explode.
        let extent = (max[0] - min[0]).max(max[1] - min[1]);
        let cell_size = cell_size.max(extent / MAX_GRID_DIM);
        let cols = (((max[0] - min[0]) / cell_size).floor() as usize) + 1;
        let rows = (((max[1] - min[1]) / cell_size).floor() as usize) + 1;
        let mut index = Self {
            cell_size,
            origin: min,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
            len,
        };

        for (t, lls) in field.targets().iter().enumerate() {
            for (v, &position) in lls.vertices().iter().enumerate() {
                let (cx, cy) = index.cell_of(position);
                index.cells[cy * cols + cx].push(GridVertex {
                    position,
                    target: t as u32,
                    vertex: v as u32,
                });
            }
        }

        log::debug!(
            "vertex grid: {} vertices in {}x{} cells of {:.1}",
            len,
            cols,
            rows,
            cell_size
        );
        index
    }

    /// Cell holding `point`, clamped onto the grid.
    fn cell_of(&self, point: [f32; 2]) -> (usize, usize) {
        let fx = ((point[0] - self.origin[0]) / self.cell_size).floor();
        let fy = ((point[1] - self.origin[1]) / self.cell_size).floor();
        let cx = fx.clamp(0.0, (self.cols - 1) as f32) as usize;
        let cy = fy.clamp(0.0, (self.rows - 1) as f32) as usize;
        (cx, cy)
    }

    fn visit_cell(&self, cx: usize, cy: usize, point: [f32; 2], best: &mut Option<NearestVertex>) {
        for gv in &self.cells[cy * self.cols + cx] {
            let d2 = distance_sq(gv.position, point);
            let better = match best {
                None => true,
                Some(b) => {
                    d2 < b.distance_sq
                        || (d2 == b.distance_sq
                            && (gv.target as usize, gv.vertex as usize) < (b.target, b.vertex))
                }
            };
            if better {
                *best = Some(NearestVertex {
                    position: gv.position,
                    distance_sq: d2,
                    target: gv.target as usize,
                    vertex: gv.vertex as usize,
                });
            }
        }
    }
}

impl VertexIndex for GridIndex {
    fn nearest_vertex(&self, point: [f32; 2]) -> Option<NearestVertex> {
        if self.len == 0 {
            return None;
        }

        let (cx, cy) = self.cell_of(point);
        let max_ring = self.cols.max(self.rows);
        let mut best: Option<NearestVertex> = None;

        for ring in 0..=max_ring {
            let x0 = cx as isize - ring as isize;
            let x1 = cx as isize + ring as isize;
            let y0 = cy as isize - ring as isize;
            let y1 = cy as isize + ring as isize;
            let (xs, xe) = (x0.max(0), x1.min(self.cols as isize - 1));
            for y in y0.max(0)..=y1.min(self.rows as isize - 1) {
                if y == y0 || y == y1 {
                    for x in xs..=xe {
                        self.visit_cell(x as usize, y as usize, point, &mut best);
                    }
                } else {
                    // Interior rows only contribute their two edge cells.
                    if x0 >= 0 {
                        self.visit_cell(x0 as usize, y as usize, point, &mut best);
                    }
                    if ring > 0 && x1 < self.cols as isize {
                        self.visit_cell(x1 as usize, y as usize, point, &mut best);
                    }
                }
            }

            // Cells on the next ring are at least `ring * cell_size` away; one ring of
            // slack absorbs rounding at cell edges.
            if let Some(b) = best {
                let bound = ring.saturating_sub(1) as f32 * self.cell_size;
                if bound * bound > b.distance_sq {
                    break;
                }
            }
        }
        best
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lls::{Bounds, Lls, LlsParams};
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    fn random_field(seed: u64) -> TargetField {
        let mut rng = SmallRng::seed_from_u64(seed);
        let params = LlsParams {
            base_radius: 40,
            jitter: 10,
            sides: 15,
            margin: 4,
        };
        TargetField::generate(30, Bounds::new(1000, 600), &params, &mut rng)
    }

    #[test]
    fn single_vertex_field_always_returns_that_vertex() {
        let mut rng = SmallRng::seed_from_u64(0);
        let field = TargetField::from_targets(vec![Lls::new([50.0, 50.0], 5, 0, 1, &mut rng)]);
        let grid = GridIndex::build(&field, 30.0);
        for query in [[0.0, 0.0], [55.0, 50.0], [-1e4, 3e3], [900.0, -20.0]] {
            let scan = field.nearest_vertex(query).expect("scan");
            assert_eq!(scan.position, [55.0, 50.0]);
            assert_eq!(grid.nearest_vertex(query), Some(scan));
        }
    }

    #[test]
    fn empty_field_has_no_nearest_vertex() {
        let field = TargetField::default();
        assert!(VertexIndex::is_empty(&field));
        assert!(field.nearest_vertex([1.0, 2.0]).is_none());

        let grid = GridIndex::build(&field, 30.0);
        assert!(grid.is_empty());
        assert!(grid.nearest_vertex([1.0, 2.0]).is_none());
    }

    #[test]
    fn zero_sided_rings_count_as_empty() {
        let mut rng = SmallRng::seed_from_u64(0);
        let field = TargetField::from_targets(vec![Lls::new([50.0, 50.0], 5, 0, 0, &mut rng)]);
        assert!(VertexIndex::is_empty(&field));
        assert!(field.nearest_vertex([0.0, 0.0]).is_none());
    }

    #[test]
    fn scan_matches_brute_force_over_all_vertices() {
        let field = random_field(11);
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..500 {
            let q = [rng.gen_range(-100.0..1100.0), rng.gen_range(-100.0..700.0)];
            let nearest = field.nearest_vertex(q).expect("non-empty");
            let brute = field
                .targets()
                .iter()
                .flat_map(|lls| lls.vertices())
                .map(|v| distance_sq(*v, q))
                .fold(f32::INFINITY, f32::min);
            assert_eq!(nearest.distance_sq, brute);
        }
    }

    #[test]
    fn grid_agrees_with_scan() {
        for seed in 0..4 {
            let field = random_field(seed);
            let mut rng = SmallRng::seed_from_u64(seed + 100);
            for cell_size in [7.5, 30.0, 250.0] {
                let grid = GridIndex::build(&field, cell_size);
                for _ in 0..300 {
                    let q = [rng.gen_range(-200.0..1200.0), rng.gen_range(-200.0..800.0)];
                    assert_eq!(grid.nearest_vertex(q), field.nearest_vertex(q), "query {q:?}");
                }
            }
        }
    }

    #[test]
    fn grid_breaks_ties_like_scan() {
        let mut rng = SmallRng::seed_from_u64(0);
        // Two regular rings sharing the query point's distance to several vertices.
        let field = TargetField::from_targets(vec![
            Lls::new([100.0, 100.0], 10, 0, 4, &mut rng),
            Lls::new([120.0, 100.0], 10, 0, 4, &mut rng),
        ]);
        let grid = GridIndex::build(&field, 3.0);
        for q in [[100.0, 100.0], [120.0, 100.0], [110.0, 100.0], [110.0, 120.0]] {
            let scan = field.nearest_vertex(q).expect("scan");
            assert_eq!(grid.nearest_vertex(q), Some(scan), "query {q:?}");
        }
        // (110, 100) is a vertex of both rings; the first LLS owns it.
        let shared = field.nearest_vertex([110.0, 100.0]).expect("scan");
        assert_eq!(shared.target, 0);
        assert_eq!(shared.vertex, 0);
    }
}
