// Fibroblasts - LLS Migration Simulator
// Copyright (c) 2025 Filipe da Veiga Ventura Alves
// Licensed under MIT License

//! LLS regions: jittered polygons placed without overlap by rejection sampling.

use rand::Rng;

/// Rejection-sampling budget for LLS placement. Exhausting it yields a sparser field.
pub const PLACEMENT_ATTEMPTS: u32 = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlsParams {
    pub base_radius: u32,
    pub jitter: u32,
    pub sides: u32,
    pub margin: u32,
}

impl LlsParams {
    pub fn max_radius(&self) -> u32 {
        self.base_radius + self.jitter
    }
}

/// A jittered polygon. The vertex ring is rolled once at creation and never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Lls {
    center: [f32; 2],
    base_radius: u32,
    jitter: u32,
    max_radius: u32,
    vertices: Vec<[f32; 2]>,
}

impl Lls {
    pub fn new<R: Rng + ?Sized>(
        center: [f32; 2],
        base_radius: u32,
        jitter: u32,
        sides: u32,
        rng: &mut R,
    ) -> Self {
        let jitter_i = jitter as i64;
        let vertices = (0..sides)
            .map(|i| {
                let angle = std::f32::consts::TAU * i as f32 / sides as f32;
                // Independent draw per vertex: rings are irregular, not just scaled.
                let radius = (base_radius as i64 + rng.gen_range(-jitter_i..=jitter_i)) as f32;
                [
                    center[0] + angle.cos() * radius,
                    center[1] + angle.sin() * radius,
                ]
            })
            .collect();

        Self {
            center,
            base_radius,
            jitter,
            max_radius: base_radius + jitter,
            vertices,
        }
    }

    pub fn center(&self) -> [f32; 2] {
        self.center
    }

    pub fn base_radius(&self) -> u32 {
        self.base_radius
    }

    pub fn jitter(&self) -> u32 {
        self.jitter
    }

    pub fn sides(&self) -> usize {
        self.vertices.len()
    }

    pub fn max_radius(&self) -> u32 {
        self.max_radius
    }

    pub fn vertices(&self) -> &[[f32; 2]] {
        &self.vertices
    }

    /// Nearest ring vertex to `point` with its squared distance; first seen wins ties.
    pub fn nearest_vertex(&self, point: [f32; 2]) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (i, v) in self.vertices.iter().enumerate() {
            let d2 = distance_sq(*v, point);
            if best.map_or(true, |(_, best_d2)| d2 < best_d2) {
                best = Some((i, d2));
            }
        }
        best
    }
}

#[inline]
pub fn distance_sq(a: [f32; 2], b: [f32; 2]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// The set of LLS regions for one run. Owns every ring; read-only once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetField {
    targets: Vec<Lls>,
}

impl TargetField {
    pub fn from_targets(targets: Vec<Lls>) -> Self {
        Self { targets }
    }

    /// Places up to `count` LLS inside `bounds`, keeping every pair at least
    /// `max_a + max_b + margin` apart. Returns fewer than `count` when the attempt
    /// budget runs out.
    pub fn generate<R: Rng + ?Sized>(
        count: u32,
        bounds: Bounds,
        params: &LlsParams,
        rng: &mut R,
    ) -> Self {
        let r_max = i64::from(params.max_radius());
        let x_range = r_max..=(i64::from(bounds.width) - r_max);
        let y_range = r_max..=(i64::from(bounds.height) - r_max);

        let mut placed: Vec<Lls> = Vec::with_capacity(count as usize);
        if x_range.is_empty() || y_range.is_empty() {
            if count > 0 {
                log::warn!(
                    "LLS radius {} does not fit in {}x{} field; no LLS placed",
                    r_max,
                    bounds.width,
                    bounds.height
                );
            }
            return Self { targets: placed };
        }

        let mut attempts = 0;
        while placed.len() < count as usize && attempts < PLACEMENT_ATTEMPTS {
            attempts += 1;
            let cx = rng.gen_range(x_range.clone()) as f32;
            let cy = rng.gen_range(y_range.clone()) as f32;

            let clear = placed.iter().all(|other| {
                let min_dist = (params.max_radius() + other.max_radius() + params.margin) as f32;
                distance_sq([cx, cy], other.center()) >= min_dist * min_dist
            });
            if !clear {
                continue;
            }

            placed.push(Lls::new(
                [cx, cy],
                params.base_radius,
                params.jitter,
                params.sides,
                rng,
            ));
        }

        if placed.len() < count as usize {
            log::warn!(
                "placed {} of {} LLS after {} attempts",
                placed.len(),
                count,
                attempts
            );
        } else {
            log::debug!("placed {} LLS in {} attempts", placed.len(), attempts);
        }

        Self { targets: placed }
    }

    pub fn targets(&self) -> &[Lls] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.targets.iter().map(Lls::sides).sum()
    }
}
