// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion settings, loaded from environment variables or built in code.

use geoconv_geometry::MeshSettings;

/// Settings of one conversion run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertConfig {
    /// Multiplier from source lengths to target lengths (cm to mm by default).
    pub length_scale: f64,
    /// Replace zero-density materials with `vacuum_material`.
    pub vacuum_substitution: bool,
    /// Name of the predefined vacuum surrogate.
    pub vacuum_material: String,
    /// Source shape names converted to tessellated solids.
    pub solids_to_tessellate: Vec<String>,
    /// Angular segments for a full circle when meshing curved solids.
    pub mesh_segments: usize,
    /// Composite nesting depth beyond which a shape is given up on.
    pub max_boolean_depth: usize,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

impl ConvertConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            length_scale: env_or("GEOCONV_LENGTH_SCALE", defaults.length_scale),
            vacuum_substitution: env_or(
                "GEOCONV_VACUUM_SUBSTITUTION",
                defaults.vacuum_substitution,
            ),
            vacuum_material: std::env::var("GEOCONV_VACUUM_MATERIAL")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.vacuum_material),
            solids_to_tessellate: std::env::var("GEOCONV_TESSELLATE")
                .map(|value| {
                    value
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.solids_to_tessellate),
            mesh_segments: env_or("GEOCONV_MESH_SEGMENTS", defaults.mesh_segments),
            max_boolean_depth: env_or("GEOCONV_MAX_BOOLEAN_DEPTH", defaults.max_boolean_depth),
        }
    }

    pub fn with_length_scale(mut self, scale: f64) -> Self {
        self.length_scale = scale;
        self
    }

    pub fn with_vacuum_substitution(mut self, enabled: bool) -> Self {
        self.vacuum_substitution = enabled;
        self
    }

    pub fn with_vacuum_material(mut self, name: impl Into<String>) -> Self {
        self.vacuum_material = name.into();
        self
    }

    pub fn with_solids_to_tessellate<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.solids_to_tessellate = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mesh_segments(mut self, segments: usize) -> Self {
        self.mesh_segments = segments;
        self
    }

    pub fn with_max_boolean_depth(mut self, depth: usize) -> Self {
        self.max_boolean_depth = depth;
        self
    }

    pub fn mesh_settings(&self) -> MeshSettings {
        MeshSettings::new(self.mesh_segments)
    }

    pub fn should_tessellate(&self, shape_name: &str) -> bool {
        self.solids_to_tessellate.iter().any(|name| name == shape_name)
    }

    /// Source degrees to target radians
    pub(crate) fn angle(&self, degrees: f64) -> f64 {
        degrees.to_radians()
    }

    /// Source length to target length
    pub(crate) fn length(&self, value: f64) -> f64 {
        value * self.length_scale
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            length_scale: 10.0,
            vacuum_substitution: true,
            vacuum_material: "G4_Galactic".to_string(),
            solids_to_tessellate: Vec::new(),
            mesh_segments: 16,
            max_boolean_depth: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ConvertConfig::default();
        assert_eq!(config.length_scale, 10.0);
        assert!(config.vacuum_substitution);
        assert_eq!(config.vacuum_material, "G4_Galactic");
        assert_eq!(config.mesh_settings().segments, 16);
    }

    #[test]
    fn env_overrides_and_invalid_values() {
        // Keys unique to this test so parallel tests do not interfere
        std::env::set_var("GEOCONV_MESH_SEGMENTS", "24");
        std::env::set_var("GEOCONV_MAX_BOOLEAN_DEPTH", "deep");
        std::env::set_var("GEOCONV_TESSELLATE", "a, b,,c");
        let config = ConvertConfig::from_env();
        std::env::remove_var("GEOCONV_MESH_SEGMENTS");
        std::env::remove_var("GEOCONV_MAX_BOOLEAN_DEPTH");
        std::env::remove_var("GEOCONV_TESSELLATE");

        assert_eq!(config.mesh_segments, 24);
        assert_eq!(config.max_boolean_depth, 64);
        assert_eq!(config.solids_to_tessellate, vec!["a", "b", "c"]);
        assert!(config.should_tessellate("b"));
    }

    #[test]
    fn builder_setters() {
        let config = ConvertConfig::default()
            .with_length_scale(1.0)
            .with_vacuum_substitution(false)
            .with_solids_to_tessellate(["cell"]);
        assert_eq!(config.length(3.0), 3.0);
        assert!(!config.vacuum_substitution);
        assert!(config.should_tessellate("cell"));
        assert!((config.angle(180.0) - std::f64::consts::PI).abs() < 1e-15);
    }
}
