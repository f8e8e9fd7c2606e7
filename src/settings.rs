// Fibroblasts - LLS Migration Simulator
// Copyright (c) 2025 Filipe da Veiga Ventura Alves
// Licensed under MIT License

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::fibroblast::CellParams;
use crate::lls::{Bounds, LlsParams};

pub const SETTINGS_FILE_NAME: &str = "fibroblast_settings.json";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VertexIndexKind {
    /// Two-level linear scan over every LLS ring.
    #[default]
    Scan,
    /// Uniform grid bucketed over all vertices.
    Grid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationSettings {
    pub width: u32,
    pub height: u32,
    pub rng_seed: Option<u64>,

    // LLS field
    pub lls_count: u32,
    pub lls_base_radius: u32,
    pub lls_jitter: u32,
    pub lls_sides: u32,
    pub lls_margin: u32, // spacing between LLS so rings never touch

    // Fibroblasts
    pub cell_count: u32,
    pub cell_radius: f32,
    pub cell_speed: f32,
    pub move_ms: u64,
    pub rest_ms: u64,
    pub leg_len: f32,
    pub leg_wiggle: f32,
    pub leg_speed: f32,

    // Stepping
    pub vertex_index: VertexIndexKind,
    pub parallel_update: bool,
    pub target_fps: u32,

    // Colors (linear RGB, 0..1)
    pub background_color: [f32; 3],
    pub lls_color: [f32; 3],
    pub body_color: [f32; 3],
    pub leg_color: [f32; 3],
    pub leg_width: f32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            rng_seed: None,
            lls_count: 30,
            lls_base_radius: 40,
            lls_jitter: 10,
            lls_sides: 15,
            lls_margin: 4,
            cell_count: 500,
            cell_radius: 6.0,
            cell_speed: 1.0,
            move_ms: 300,
            rest_ms: 500,
            leg_len: 12.0,
            leg_wiggle: 4.0,
            leg_speed: 1.0,
            vertex_index: VertexIndexKind::Scan,
            parallel_update: false,
            target_fps: 200,
            background_color: [1.0, 1.0, 1.0], // white
            lls_color: [0.0, 1.0, 0.0],         // green
            body_color: [1.0, 0.0, 0.0],        // red
            leg_color: [0.0, 0.0, 0.0],         // black
            leg_width: 2.0,
        }
    }
}

impl SimulationSettings {
    pub fn default_path() -> PathBuf {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(SETTINGS_FILE_NAME)
    }

    pub fn load_from_disk(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&data)?;
        Ok(settings)
    }

    pub fn save_to_disk(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn sanitize(&mut self) {
        self.width = self.width.clamp(1, 16_384);
        self.height = self.height.clamp(1, 16_384);
        self.lls_count = self.lls_count.min(10_000);
        self.lls_base_radius = self.lls_base_radius.clamp(1, 4096);
        self.lls_jitter = self.lls_jitter.min(self.lls_base_radius - 1);
        self.lls_sides = self.lls_sides.clamp(1, 1024);
        self.lls_margin = self.lls_margin.min(4096);
        self.cell_count = self.cell_count.min(1_000_000);
        self.cell_radius = finite_or(self.cell_radius, 6.0).clamp(0.0, 1000.0);
        self.cell_speed = finite_or(self.cell_speed, 1.0).clamp(0.0, 1000.0);
        self.leg_len = finite_or(self.leg_len, 12.0).clamp(0.0, 1000.0);
        self.leg_wiggle = finite_or(self.leg_wiggle, 4.0).clamp(0.0, 1000.0);
        self.leg_speed = finite_or(self.leg_speed, 1.0).clamp(0.0, 100.0);
        self.leg_width = finite_or(self.leg_width, 2.0).clamp(0.5, 64.0);
        self.target_fps = self.target_fps.clamp(1, 1000);
        for color in [
            &mut self.background_color,
            &mut self.lls_color,
            &mut self.body_color,
            &mut self.leg_color,
        ] {
            for c in color.iter_mut() {
                *c = finite_or(*c, 0.0).clamp(0.0, 1.0);
            }
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }

    pub fn lls_params(&self) -> LlsParams {
        LlsParams {
            base_radius: self.lls_base_radius,
            jitter: self.lls_jitter,
            sides: self.lls_sides,
            margin: self.lls_margin,
        }
    }

    pub fn cell_params(&self) -> CellParams {
        CellParams {
            radius: self.cell_radius,
            speed: self.cell_speed,
            move_ms: self.move_ms,
            rest_ms: self.rest_ms,
            leg_len: self.leg_len,
            leg_wiggle: self.leg_wiggle,
            leg_speed: self.leg_speed,
        }
    }

    /// Simulated milliseconds per frame at the configured FPS cap.
    pub fn frame_interval_ms(&self) -> u64 {
        (1000 / u64::from(self.target_fps.max(1))).max(1)
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
