// Fibroblasts - LLS Migration Simulator
// Copyright (c) 2025 Filipe da Veiga Ventura Alves
// Licensed under MIT License

//! Fibroblasts that alternately crawl toward and rest near the nearest vertex of
//! randomly placed, jittered LLS polygons.
//!
//! The kernel (`lls`, `vertex_index`, `fibroblast`, `simulation`) is pure and
//! single-threaded by default; the clock and the draw target are passed in by
//! the driver each frame.

pub mod fibroblast;
pub mod lls;
pub mod naming;
pub mod scene;
pub mod settings;
pub mod simulation;
pub mod vertex_index;

pub use fibroblast::{CellParams, Fibroblast, Phase, LEG_ANGLES};
pub use lls::{Bounds, Lls, LlsParams, TargetField, PLACEMENT_ATTEMPTS};
pub use scene::{tessellate, Palette, SceneVertex};
pub use settings::{SimulationSettings, VertexIndexKind};
pub use simulation::{Census, Simulation};
pub use vertex_index::{GridIndex, NearestVertex, VertexIndex};
