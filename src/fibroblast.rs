// Fibroblasts - LLS Migration Simulator
// Copyright (c) 2025 Filipe da Veiga Ventura Alves
// Licensed under MIT License

use std::f32::consts::FRAC_PI_4;

use crate::vertex_index::VertexIndex;

/// Diagonal leg directions, drawn from the body center.
pub const LEG_ANGLES: [f32; 4] = [FRAC_PI_4, 3.0 * FRAC_PI_4, 5.0 * FRAC_PI_4, 7.0 * FRAC_PI_4];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Moving,
    Resting,
}

/// Per-cell constants shared by the whole population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellParams {
    pub radius: f32,
    pub speed: f32, // units per tick
    pub move_ms: u64,
    pub rest_ms: u64,
    pub leg_len: f32,
    pub leg_wiggle: f32,
    pub leg_speed: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fibroblast {
    position: [f32; 2],
    params: CellParams,
    phase: Phase,
    phase_ends_at: u64,
    leg_phase: f32,
}

impl Fibroblast {
    pub fn new(position: [f32; 2], params: CellParams, spawned_at: u64) -> Self {
        Self {
            position,
            params,
            phase: Phase::Moving,
            phase_ends_at: spawned_at.saturating_add(params.move_ms),
            leg_phase: 0.0,
        }
    }

    pub fn position(&self) -> [f32; 2] {
        self.position
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_resting(&self) -> bool {
        self.phase == Phase::Resting
    }

    pub fn phase_ends_at(&self) -> u64 {
        self.phase_ends_at
    }

    pub fn leg_phase(&self) -> f32 {
        self.leg_phase
    }

    pub fn params(&self) -> &CellParams {
        &self.params
    }

    /// One tick: flip the phase if its timer ran out, then step toward the nearest
    /// LLS vertex while moving. There is no arrival check; a cell sitting on its
    /// vertex stays put and a fast cell may overshoot back and forth.
    pub fn update(&mut self, now: u64, index: &dyn VertexIndex) {
        if now >= self.phase_ends_at {
            let (next, duration) = match self.phase {
                Phase::Moving => (Phase::Resting, self.params.rest_ms),
                Phase::Resting => (Phase::Moving, self.params.move_ms),
            };
            self.phase = next;
            self.phase_ends_at = now.saturating_add(duration);
        }

        if self.phase != Phase::Moving {
            return;
        }
        let Some(target) = index.nearest_vertex(self.position) else {
            return;
        };

        let dx = target.position[0] - self.position[0];
        let dy = target.position[1] - self.position[1];
        let dist = dx.hypot(dy);
        if dist > 0.0 {
            self.position[0] += self.params.speed * dx / dist;
            self.position[1] += self.params.speed * dy / dist;
        }
        self.leg_phase += self.params.leg_speed;
    }

    /// Leg tip positions in `LEG_ANGLES` order. Legs wiggle only while moving.
    pub fn leg_tips(&self) -> [[f32; 2]; 4] {
        let [x, y] = self.position;
        let mut tips = [[0.0; 2]; 4];
        for (i, (tip, angle)) in tips.iter_mut().zip(LEG_ANGLES).enumerate() {
            let wiggle = match self.phase {
                Phase::Moving => (self.leg_phase + i as f32).sin() * self.params.leg_wiggle,
                Phase::Resting => 0.0,
            };
            let len = self.params.leg_len + wiggle;
            *tip = [x + angle.cos() * len, y + angle.sin() * len];
        }
        tips
    }
}
