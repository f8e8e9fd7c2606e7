// Fibroblasts - LLS Migration Simulator
// Copyright (c) 2025 Filipe da Veiga Ventura Alves
// Licensed under MIT License

// Run naming

use crate::settings::SimulationSettings;

// Kept as simple static slices (no extra crates needed).
static RUN_ADJECTIVES: &[&str] = &[
    "Quietus", "Placidus", "Lentus", "Tardus", "Segnis", "Piger", "Languidus", "Mitis",
    "Constans", "Aequus", "Stabilis", "Modestus", "Vigens", "Agilis", "Mobilis", "Vivax",
    "Celer", "Rapidus", "Velox", "Fervens", "Ardens", "Acer", "Vehemens", "Impiger",
];

static RUN_NOUNS: &[&str] = &[
    "Eremus", "Vastitas", "Solitudo", "Campus", "Planities", "Pratum", "Ager", "Insula",
    "Archipelagus", "Sinus", "Portus", "Vicus", "Oppidum", "Urbs", "Populus", "Turba",
    "Multitudo", "Agmen", "Examen", "Colonia", "Textus", "Tela", "Matrix", "Stroma",
];

fn lerp_index01(score01: f32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let t = score01.clamp(0.0, 1.0);
    ((t * (len as f32 - 1.0)).round() as usize).min(len - 1)
}

fn safe01(numer: f32, denom: f32) -> f32 {
    if denom <= 0.0 {
        return 0.0;
    }
    (numer / denom).clamp(0.0, 1.0)
}

fn mix32(mut x: u32) -> u32 {
    // A small non-cryptographic mixer (good enough for stable jitter).
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb_352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846c_a68b);
    x ^= x >> 16;
    x
}

fn jittered_index(score01: f32, len: usize, seed: u32, salt: u32) -> usize {
    if len <= 1 {
        return 0;
    }
    let base = lerp_index01(score01, len);

    // Only jitter within a small neighborhood so the word still tracks the score.
    let window = (len / 16).max(2);
    let span = (window * 2 + 1) as u32;
    let offset = (mix32(seed ^ salt) % span) as i32 - window as i32;

    (base as i32 + offset).clamp(0, len as i32 - 1) as usize
}

/// Motility: share of time spent moving, weighted by step length.
fn motility_score(settings: &SimulationSettings) -> f32 {
    let cycle = (settings.move_ms + settings.rest_ms) as f32;
    let duty = safe01(settings.move_ms as f32, cycle);
    (duty * safe01(settings.cell_speed, 4.0)).sqrt()
}

/// Crowding: cells per LLS, saturating at 50.
fn crowding_score(settings: &SimulationSettings) -> f32 {
    let per_lls = settings.cell_count as f32 / settings.lls_count.max(1) as f32;
    safe01(per_lls, 50.0)
}

/// Human-readable run label from the settings and seed.
///
/// Output format: `Fibroblasts_<Adj>-<Noun>-<seed%10000>_<YYYYMMDD_HHMMSS_mmm>UTC`
pub fn generate_run_name(settings: &SimulationSettings, run_seed: u64) -> String {
    let seed = (run_seed ^ (run_seed >> 32)) as u32;
    let adj = RUN_ADJECTIVES[jittered_index(motility_score(settings), RUN_ADJECTIVES.len(), seed, 0xA11C_E551)];
    let noun = RUN_NOUNS[jittered_index(crowding_score(settings), RUN_NOUNS.len(), seed, 0xBADC_0DE5)];

    let now = chrono::Utc::now();
    let ts = format!(
        "{}_{:03}",
        now.format("%Y%m%d_%H%M%S"),
        now.timestamp_subsec_millis()
    );

    format!("Fibroblasts_{}-{}-{:04}_{}UTC", adj, noun, run_seed % 10_000, ts)
}
