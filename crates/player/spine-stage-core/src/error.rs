//! Error types for player setup.
//!
//! Every failure in this crate is raised during setup or selection; per-frame
//! stepping is pure numeric work and never fails.

use serde::{Deserialize, Serialize};

/// Closed set of failure kinds. Callers branch on this, not on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Missing or invalid source locations / settings.
    Configuration,
    /// Atlas, texture or skeleton payload could not be fetched.
    AssetLoad,
    /// Loaded skeleton data cannot satisfy the request (no skins, unknown names).
    SkeletonData,
    /// Skeleton payload is malformed.
    RuntimeParse,
}

/// Error raised by the player core.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PlayerError {
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("Failed to load asset {path}: {reason}")]
    AssetLoad { path: String, reason: String },

    #[error("Skeleton has no skins")]
    NoSkins,

    #[error("Skeleton has no animations")]
    NoAnimations,

    #[error("Unknown skin '{name}' (available: {available:?})")]
    UnknownSkin {
        name: String,
        available: Vec<String>,
    },

    #[error("Unknown animation '{name}' (available: {available:?})")]
    UnknownAnimation {
        name: String,
        available: Vec<String>,
    },

    #[error("Skeleton parse error: {reason}")]
    RuntimeParse { reason: String },
}

impl PlayerError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub fn parse(reason: impl Into<String>) -> Self {
        Self::RuntimeParse {
            reason: reason.into(),
        }
    }

    /// The kind this error belongs to.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::AssetLoad { .. } => ErrorKind::AssetLoad,
            Self::NoSkins
            | Self::NoAnimations
            | Self::UnknownSkin { .. }
            | Self::UnknownAnimation { .. } => ErrorKind::SkeletonData,
            Self::RuntimeParse { .. } => ErrorKind::RuntimeParse,
        }
    }

    /// Short category name for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Configuration => "configuration",
            ErrorKind::AssetLoad => "asset",
            ErrorKind::SkeletonData => "skeleton-data",
            ErrorKind::RuntimeParse => "parse",
        }
    }
}

impl From<serde_json::Error> for PlayerError {
    fn from(err: serde_json::Error) -> Self {
        Self::RuntimeParse {
            reason: err.to_string(),
        }
    }
}
