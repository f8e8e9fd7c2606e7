// Fibroblasts - LLS Migration Simulator
// Copyright (c) 2025 Filipe da Veiga Ventura Alves
// Licensed under MIT License

//! CPU tessellation of one frame into a flat triangle list.

use bytemuck::{Pod, Zeroable};

use crate::fibroblast::Fibroblast;
use crate::lls::Lls;
use crate::settings::SimulationSettings;
use crate::simulation::Simulation;

pub const BODY_SEGMENTS: usize = 24;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SceneVertex {
    pub position: [f32; 2], // field pixels
    pub color: [f32; 3],
}

impl SceneVertex {
    pub const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SceneVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub lls: [f32; 3],
    pub body: [f32; 3],
    pub leg: [f32; 3],
    pub leg_width: f32,
}

impl From<&SimulationSettings> for Palette {
    fn from(settings: &SimulationSettings) -> Self {
        Self {
            lls: settings.lls_color,
            body: settings.body_color,
            leg: settings.leg_color,
            leg_width: settings.leg_width,
        }
    }
}

/// Rebuilds `out` with the whole frame: LLS first, then each cell's legs and body.
pub fn tessellate(sim: &Simulation, palette: &Palette, out: &mut Vec<SceneVertex>) {
    out.clear();
    for lls in sim.field().targets() {
        push_lls(lls, palette.lls, out);
    }
    for cell in sim.cells() {
        push_cell(cell, palette, out);
    }
}

/// Triangle fan around the center. Rings are star-shaped about their center, so
/// the fan covers the polygon exactly.
pub fn push_lls(lls: &Lls, color: [f32; 3], out: &mut Vec<SceneVertex>) {
    let verts = lls.vertices();
    if verts.len() < 3 {
        return;
    }
    let center = lls.center();
    for i in 0..verts.len() {
        let a = verts[i];
        let b = verts[(i + 1) % verts.len()];
        push_triangle(out, [center, a, b], color);
    }
}

pub fn push_cell(cell: &Fibroblast, palette: &Palette, out: &mut Vec<SceneVertex>) {
    let center = cell.position();
    for tip in cell.leg_tips() {
        push_line(out, center, tip, palette.leg_width, palette.leg);
    }
    push_disc(out, center, cell.params().radius, palette.body);
}

fn push_triangle(out: &mut Vec<SceneVertex>, points: [[f32; 2]; 3], color: [f32; 3]) {
    out.extend(points.iter().map(|&position| SceneVertex { position, color }));
}

fn push_line(out: &mut Vec<SceneVertex>, from: [f32; 2], to: [f32; 2], width: f32, color: [f32; 3]) {
    let dx = to[0] - from[0];
    let dy = to[1] - from[1];
    let len = dx.hypot(dy);
    if len <= 0.0 {
        return;
    }
    let half = width * 0.5;
    let nx = -dy / len * half;
    let ny = dx / len * half;
    let p0 = [from[0] + nx, from[1] + ny];
    let p1 = [from[0] - nx, from[1] - ny];
    let p2 = [to[0] - nx, to[1] - ny];
    let p3 = [to[0] + nx, to[1] + ny];
    push_triangle(out, [p0, p1, p2], color);
    push_triangle(out, [p0, p2, p3], color);
}

fn push_disc(out: &mut Vec<SceneVertex>, center: [f32; 2], radius: f32, color: [f32; 3]) {
    if radius <= 0.0 {
        return;
    }
    let point = |i: usize| {
        let angle = std::f32::consts::TAU * i as f32 / BODY_SEGMENTS as f32;
        [center[0] + angle.cos() * radius, center[1] + angle.sin() * radius]
    };
    for i in 0..BODY_SEGMENTS {
        push_triangle(out, [center, point(i), point(i + 1)], color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fibroblast::CellParams;
    use crate::lls::TargetField;
    use crate::settings::VertexIndexKind;
    use rand::{rngs::SmallRng, SeedableRng};

    fn params() -> CellParams {
        CellParams {
            radius: 6.0,
            speed: 1.0,
            move_ms: 300,
            rest_ms: 500,
            leg_len: 12.0,
            leg_wiggle: 4.0,
            leg_speed: 1.0,
        }
    }

    #[test]
    fn frame_has_expected_triangle_counts() {
        let mut rng = SmallRng::seed_from_u64(0);
        let field = TargetField::from_targets(vec![
            Lls::new([100.0, 100.0], 40, 10, 15, &mut rng),
            Lls::new([300.0, 100.0], 40, 10, 15, &mut rng),
        ]);
        let cells = vec![
            Fibroblast::new([10.0, 10.0], params(), 0),
            Fibroblast::new([20.0, 40.0], params(), 0),
            Fibroblast::new([50.0, 70.0], params(), 0),
        ];
        let sim = Simulation::from_parts(field, cells, VertexIndexKind::Scan, false);
        let palette = Palette::from(&SimulationSettings::default());

        let mut out = vec![SceneVertex::zeroed(); 7];
        tessellate(&sim, &palette, &mut out);

        let lls_tris = 2 * 15;
        let cell_tris = 3 * (4 * 2 + BODY_SEGMENTS);
        assert_eq!(out.len(), (lls_tris + cell_tris) * 3);

        // LLS are drawn first, bodies last.
        assert!(out[..lls_tris * 3].iter().all(|v| v.color == palette.lls));
        assert!(out[out.len() - BODY_SEGMENTS * 3..]
            .iter()
            .all(|v| v.color == palette.body));
    }

    #[test]
    fn degenerate_rings_are_skipped() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut out = Vec::new();
        push_lls(&Lls::new([0.0, 0.0], 10, 0, 2, &mut rng), [0.0, 1.0, 0.0], &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn leg_quads_have_configured_width() {
        let mut out = Vec::new();
        push_line(&mut out, [0.0, 0.0], [10.0, 0.0], 2.0, [0.0; 3]);
        assert_eq!(out.len(), 6);
        for v in &out {
            assert!((v.position[1].abs() - 1.0).abs() < 1e-6);
        }
    }
}
