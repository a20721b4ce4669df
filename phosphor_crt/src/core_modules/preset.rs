// THEORY:
// The preset resolver is the leaf of the pipeline. It turns the host's manual
// `ParameterSet` plus a preset selector into the effective set every later stage reads.
//
// A preset is a fixed override table over six fields (contrast, brightness, black level,
// midtone boost, softclip strength, decay speed). It is applied on top of the manual
// values, never merged incrementally, so resolving an already-resolved set is a no-op.
// `Manual` overrides nothing.

use crate::core_modules::parameters::{ParameterSet, Preset};

/// The six display/decay fields a preset may replace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetOverride {
    pub contrast: f32,
    pub brightness: f32,
    pub black_level_floor: f32,
    pub midtone_boost: f32,
    pub softclip_strength: f32,
    pub global_decay_speed: f32,
}

/// Identity display response: no gamma, no boost, no compression.
pub const FLAT_SRGB: PresetOverride = PresetOverride {
    contrast: 1.0,
    brightness: 1.0,
    black_level_floor: 0.0,
    midtone_boost: 0.0,
    softclip_strength: 0.0,
    global_decay_speed: 1.0,
};

/// Punchy midtones with highlight compression to absorb the extra beam current.
pub const VIBRANT: PresetOverride = PresetOverride {
    contrast: 1.2,
    brightness: 1.6,
    black_level_floor: 0.01,
    midtone_boost: 0.6,
    softclip_strength: 0.4,
    global_decay_speed: 3.0,
};

/// Short persistence: the pulse collapses quickly, brightness compensates.
pub const QUICK_PHOSPHOR: PresetOverride = PresetOverride {
    contrast: 1.0,
    brightness: 2.5,
    black_level_floor: 0.005,
    midtone_boost: 0.2,
    softclip_strength: 0.3,
    global_decay_speed: 12.0,
};

/// The override table for `preset`, or `None` for `Manual`.
pub fn preset_override(preset: Preset) -> Option<&'static PresetOverride> {
    match preset {
        Preset::Manual => None,
        Preset::FlatSrgb => Some(&FLAT_SRGB),
        Preset::Vibrant => Some(&VIBRANT),
        Preset::QuickPhosphor => Some(&QUICK_PHOSPHOR),
    }
}

/// Produces the effective parameter set for `manual.preset`.
pub fn resolve(manual: &ParameterSet) -> ParameterSet {
    let Some(table) = preset_override(manual.preset) else {
        return manual.clone();
    };
    ParameterSet {
        contrast: table.contrast,
        brightness: table.brightness,
        black_level_floor: table.black_level_floor,
        midtone_boost: table.midtone_boost,
        softclip_strength: table.softclip_strength,
        global_decay_speed: table.global_decay_speed,
        ..manual.clone()
    }
}
