// THEORY:
// Parameter persistence for hosts that keep their CRT settings on disk. A parameter file
// is a flat TOML table whose keys are the `ParameterSet` field names. Missing keys take
// their defaults, so a file only has to mention what it changes:
//
//     preset = "vibrant"
//     frames_per_effect = 3
//     scanline_direction = "trinitron"
//     scanline_gap_width = 1.0
//
// Values are not clamped on load; callers that accept untrusted files should pass the
// result through `ParameterSet::clamped()`.

use crate::core_modules::parameters::{ParameterSet, Preset};
use crate::error::{PhosphorError, Result};
use log::{debug, info};
use std::path::Path;

/// Parses a parameter set from TOML text.
pub fn parse_parameters(contents: &str) -> Result<ParameterSet> {
    Ok(toml::from_str(contents)?)
}

/// Reads and parses a parameter file.
pub fn load_parameters(path: impl AsRef<Path>) -> Result<ParameterSet> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let parameters = parse_parameters(&contents)?;
    info!("Loaded parameters from {} (preset {})", path.display(), parameters.preset);
    Ok(parameters)
}

pub fn to_toml_string(parameters: &ParameterSet) -> Result<String> {
    Ok(toml::to_string_pretty(parameters)?)
}

/// Writes `parameters` to `path`, creating parent directories as needed.
pub fn save_parameters(path: impl AsRef<Path>, parameters: &ParameterSet) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_toml_string(parameters)?)?;
    debug!("Saved parameters to {}", path.display());
    Ok(())
}

/// Resolves a preset by name, e.g. from a command line.
pub fn parse_preset(name: &str) -> Result<Preset> {
    name.parse::<Preset>().map_err(PhosphorError::UnknownPreset)
}
