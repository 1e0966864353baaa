//! Player configuration and asset source locations.

use serde::{Deserialize, Serialize};

use crate::error::PlayerError;
use crate::estimator::DEFAULT_STEPS;
use crate::viewport::ViewportPadding;

fn default_mix() -> f32 {
    0.25
}
fn default_true() -> bool {
    true
}
fn default_transition_time() -> f32 {
    0.2
}
fn default_speed() -> f32 {
    1.0
}
fn default_steps() -> usize {
    DEFAULT_STEPS
}
fn default_max_frame_delta() -> Option<f32> {
    Some(0.064)
}

/// Playback and framing settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfig {
    /// Crossfade (seconds) when a track's animation is replaced without clearing.
    #[serde(default = "default_mix")]
    pub default_mix: f32,
    /// Whether attachment textures use premultiplied alpha; forwarded to the renderer.
    #[serde(default = "default_true")]
    pub premultiplied_alpha: bool,
    /// Duration (seconds) of the blend between two animation framings.
    #[serde(default = "default_transition_time")]
    pub transition_time: f32,
    /// Initial playback speed multiplier.
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Samples taken over one loop when estimating a viewport.
    #[serde(default = "default_steps")]
    pub viewport_steps: usize,
    #[serde(default)]
    pub padding: ViewportPadding,
    /// Upper bound (seconds) on the real time a single frame may advance.
    #[serde(default = "default_max_frame_delta")]
    pub max_frame_delta: Option<f32>,
    /// Substitute the first available animation/skin for unknown names
    /// instead of failing.
    #[serde(default)]
    pub fallback_to_first: bool,
    /// Animation to select at setup; the first one when absent.
    #[serde(default)]
    pub animation: Option<String>,
    /// Skin to select at setup; the first one when absent.
    #[serde(default)]
    pub skin: Option<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_mix: default_mix(),
            premultiplied_alpha: true,
            transition_time: default_transition_time(),
            speed: default_speed(),
            viewport_steps: DEFAULT_STEPS,
            padding: ViewportPadding::default(),
            max_frame_delta: default_max_frame_delta(),
            fallback_to_first: false,
            animation: None,
            skin: None,
        }
    }
}

impl PlayerConfig {
    pub fn from_json(json: &str) -> Result<Self, PlayerError> {
        let cfg: PlayerConfig = serde_json::from_str(json)
            .map_err(|e| PlayerError::configuration(format!("invalid player config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), PlayerError> {
        validate_speed(self.speed)?;
        if !(self.transition_time.is_finite() && self.transition_time > 0.0) {
            return Err(PlayerError::configuration(format!(
                "transition time must be positive, got {}",
                self.transition_time
            )));
        }
        if !(self.default_mix.is_finite() && self.default_mix >= 0.0) {
            return Err(PlayerError::configuration(format!(
                "default mix must be non-negative, got {}",
                self.default_mix
            )));
        }
        if self.viewport_steps == 0 {
            return Err(PlayerError::configuration(
                "viewport estimation needs at least one step",
            ));
        }
        if let Some(cap) = self.max_frame_delta {
            if !(cap.is_finite() && cap > 0.0) {
                return Err(PlayerError::configuration(format!(
                    "max frame delta must be positive, got {cap}"
                )));
            }
        }
        Ok(())
    }
}

/// Speed multipliers must be positive and finite; pausing is separate.
pub fn validate_speed(speed: f32) -> Result<(), PlayerError> {
    if speed.is_finite() && speed > 0.0 {
        Ok(())
    } else {
        Err(PlayerError::configuration(format!(
            "speed must be a positive number, got {speed}"
        )))
    }
}

/// Where to fetch the skeleton and its atlas.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSources {
    /// Skeleton description in JSON form.
    #[serde(default)]
    pub json: Option<String>,
    /// Skeleton description in binary form.
    #[serde(default)]
    pub skel: Option<String>,
    /// Texture atlas; page images are resolved relative to it.
    #[serde(default)]
    pub atlas: Option<String>,
}

impl AssetSources {
    /// Both a skeleton source and an atlas are required.
    pub fn validate(&self) -> Result<(), PlayerError> {
        let present = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.trim().is_empty());
        if !present(&self.json) && !present(&self.skel) {
            return Err(PlayerError::configuration(
                "specify the location of the skeleton JSON or .skel file",
            ));
        }
        if !present(&self.atlas) {
            return Err(PlayerError::configuration(
                "specify the location of the atlas file",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::viewport::Padding;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = PlayerConfig::default();
        assert_eq!(cfg.default_mix, 0.25);
        assert_eq!(cfg.transition_time, 0.2);
        assert_eq!(cfg.viewport_steps, 100);
        assert_eq!(cfg.padding.left, Padding::Percent(10.0));
        assert!(cfg.premultiplied_alpha);
        assert!(!cfg.fallback_to_first);
        assert_eq!(PlayerConfig::from_json("{}").unwrap(), cfg);
    }

    #[test]
    fn rejects_non_positive_speed() {
        let err = PlayerConfig::from_json(r#"{"speed":0}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(validate_speed(f32::NAN).is_err());
        assert!(validate_speed(0.5).is_ok());
    }

    #[test]
    fn sources_require_skeleton_and_atlas() {
        let missing_skeleton = AssetSources {
            atlas: Some("a.atlas".into()),
            ..Default::default()
        };
        assert_eq!(
            missing_skeleton.validate().unwrap_err().kind(),
            ErrorKind::Configuration
        );
        let missing_atlas = AssetSources {
            skel: Some("a.skel".into()),
            ..Default::default()
        };
        assert!(missing_atlas.validate().is_err());
        let ok = AssetSources {
            json: Some("a.json".into()),
            atlas: Some("a.atlas".into()),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }
}
