//! Viewports in world units and padding resolution.
//!
//! A [`Viewport`] is the base bounding box of an animation plus four resolved
//! paddings. The camera frames its [`Viewport::effective`] rectangle, which is
//! always derived and never stored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlayerError;

/// Axis-aligned rectangle in world units (`x`, `y` is the bottom-left corner).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Field-wise linear interpolation. `alpha` is not clamped.
    pub fn lerp(&self, to: &Rect, alpha: f32) -> Rect {
        Rect {
            x: self.x + (to.x - self.x) * alpha,
            y: self.y + (to.y - self.y) * alpha,
            width: self.width + (to.width - self.width) * alpha,
            height: self.height + (to.height - self.height) * alpha,
        }
    }
}

/// Padding as authored: a percentage of the padded dimension or world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPadding", into = "RawPadding")]
pub enum Padding {
    Percent(f32),
    Absolute(f32),
}

impl Padding {
    /// Resolve against the size of the dimension it pads.
    #[inline]
    pub fn resolve(self, dimension: f32) -> f32 {
        resolve_padding(dimension, self)
    }
}

impl Default for Padding {
    fn default() -> Self {
        Padding::Percent(10.0)
    }
}

/// `"N%"` resolves to `dimension * N / 100`; absolute values pass through.
#[inline]
pub fn resolve_padding(dimension: f32, padding: Padding) -> f32 {
    match padding {
        Padding::Percent(pct) => dimension * pct / 100.0,
        Padding::Absolute(units) => units,
    }
}

impl FromStr for Padding {
    type Err = PlayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (number, percent) = match trimmed.strip_suffix('%') {
            Some(n) => (n.trim_end(), true),
            None => (trimmed, false),
        };
        let value: f32 = number
            .parse()
            .map_err(|_| PlayerError::configuration(format!("invalid padding '{s}'")))?;
        if !value.is_finite() {
            return Err(PlayerError::configuration(format!(
                "padding must be finite, got '{s}'"
            )));
        }
        Ok(if percent {
            Padding::Percent(value)
        } else {
            Padding::Absolute(value)
        })
    }
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Padding::Percent(p) => write!(f, "{p}%"),
            Padding::Absolute(u) => write!(f, "{u}"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawPadding {
    Number(f32),
    Text(String),
}

impl TryFrom<RawPadding> for Padding {
    type Error = PlayerError;

    fn try_from(raw: RawPadding) -> Result<Self, Self::Error> {
        match raw {
            RawPadding::Number(n) => Ok(Padding::Absolute(n)),
            RawPadding::Text(s) => s.parse(),
        }
    }
}

impl From<Padding> for RawPadding {
    fn from(p: Padding) -> Self {
        match p {
            Padding::Absolute(n) => RawPadding::Number(n),
            Padding::Percent(_) => RawPadding::Text(p.to_string()),
        }
    }
}

/// Directional paddings applied to every freshly estimated viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportPadding {
    #[serde(default)]
    pub left: Padding,
    #[serde(default)]
    pub right: Padding,
    #[serde(default)]
    pub top: Padding,
    #[serde(default)]
    pub bottom: Padding,
}

impl ViewportPadding {
    pub const fn uniform(padding: Padding) -> Self {
        Self {
            left: padding,
            right: padding,
            top: padding,
            bottom: padding,
        }
    }
}

/// Base viewport plus paddings resolved to world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub pad_left: f32,
    pub pad_right: f32,
    pub pad_top: f32,
    pub pad_bottom: f32,
}

impl Viewport {
    /// Build from an unpadded estimate, resolving left/right against the
    /// width and top/bottom against the height.
    pub fn from_base(base: Rect, padding: &ViewportPadding) -> Self {
        let width = base.width.max(0.0);
        let height = base.height.max(0.0);
        Self {
            x: base.x,
            y: base.y,
            width,
            height,
            pad_left: padding.left.resolve(width),
            pad_right: padding.right.resolve(width),
            pad_top: padding.top.resolve(height),
            pad_bottom: padding.bottom.resolve(height),
        }
    }

    #[inline]
    pub fn base(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// The rectangle expanded by the resolved paddings.
    #[inline]
    pub fn effective(&self) -> Rect {
        Rect {
            x: self.x - self.pad_left,
            y: self.y - self.pad_bottom,
            width: self.width + self.pad_left + self.pad_right,
            height: self.height + self.pad_top + self.pad_bottom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_padding_scales_with_dimension() {
        for (size, pct) in [(0.0f32, 10.0f32), (250.0, 10.0), (80.0, 25.0), (3.5, 100.0)] {
            let p: Padding = format!("{pct}%").parse().unwrap();
            assert_eq!(resolve_padding(size, p), size * pct / 100.0);
        }
    }

    #[test]
    fn absolute_padding_is_unchanged() {
        assert_eq!(resolve_padding(400.0, Padding::Absolute(12.5)), 12.5);
        assert_eq!("7".parse::<Padding>().unwrap(), Padding::Absolute(7.0));
    }

    #[test]
    fn invalid_padding_is_a_configuration_error() {
        let err = "ten%".parse::<Padding>().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn padding_deserializes_from_string_or_number() {
        let pad: ViewportPadding =
            serde_json::from_str(r#"{"left":"5%","right":3,"top":"0%"}"#).unwrap();
        assert_eq!(pad.left, Padding::Percent(5.0));
        assert_eq!(pad.right, Padding::Absolute(3.0));
        assert_eq!(pad.top, Padding::Percent(0.0));
        assert_eq!(pad.bottom, Padding::Percent(10.0));
    }

    #[test]
    fn effective_viewport_expands_by_padding() {
        let vp = Viewport::from_base(
            Rect::new(-50.0, 0.0, 100.0, 200.0),
            &ViewportPadding::default(),
        );
        assert_eq!(vp.pad_left, 10.0);
        assert_eq!(vp.pad_top, 20.0);
        let eff = vp.effective();
        assert_eq!(eff, Rect::new(-60.0, -20.0, 120.0, 240.0));
    }
}
