//! Asset loading boundary.
//!
//! Loading happens once, before the first frame. Decoding texture atlases and
//! binary skeletons belongs to the host's runtime; this module checks that the
//! atlas is reachable and decodes JSON skeleton descriptions.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AssetSources;
use crate::error::PlayerError;
use crate::rig::SkeletonData;

/// Which skeleton payload to read. JSON wins when both are configured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkeletonSource {
    Json(String),
    Binary(String),
}

impl SkeletonSource {
    pub fn from_sources(sources: &AssetSources) -> Result<Self, PlayerError> {
        sources.validate()?;
        match (&sources.json, &sources.skel) {
            (Some(json), _) if !json.trim().is_empty() => Ok(Self::Json(json.clone())),
            (_, Some(skel)) => Ok(Self::Binary(skel.clone())),
            _ => Err(PlayerError::configuration(
                "specify the location of the skeleton JSON or .skel file",
            )),
        }
    }
}

/// Resolves configured sources into skeleton data.
pub trait AssetLoader {
    fn load(&mut self, sources: &AssetSources) -> Result<SkeletonData, PlayerError>;
}

/// Loads from the local filesystem, relative to `root`.
#[derive(Clone, Debug, Default)]
pub struct FsAssetLoader {
    root: PathBuf,
}

impl FsAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        let path = Path::new(location);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn read(&self, location: &str) -> Result<Vec<u8>, PlayerError> {
        let path = self.resolve(location);
        fs::read(&path).map_err(|e| PlayerError::AssetLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

impl AssetLoader for FsAssetLoader {
    fn load(&mut self, sources: &AssetSources) -> Result<SkeletonData, PlayerError> {
        let source = SkeletonSource::from_sources(sources)?;
        if let Some(atlas) = &sources.atlas {
            self.read(atlas)?;
        }
        match source {
            SkeletonSource::Json(location) => {
                let bytes = self.read(&location)?;
                let text = String::from_utf8(bytes).map_err(|e| {
                    PlayerError::parse(format!("{location} is not valid UTF-8: {e}"))
                })?;
                let data = SkeletonData::from_json(&text)?;
                log::debug!(
                    "loaded skeleton {location}: {} bones, {} skins, {} animations",
                    data.bones.len(),
                    data.skins.len(),
                    data.animations.len()
                );
                Ok(data)
            }
            SkeletonSource::Binary(location) => {
                let bytes = self.read(&location)?;
                Err(PlayerError::parse(format!(
                    "{location}: binary skeleton payloads ({} bytes) need an external decoder",
                    bytes.len()
                )))
            }
        }
    }
}

/// Serves already-decoded skeleton data; useful for hosts that decode
/// elsewhere and for tests. The data is validated on every load.
#[derive(Clone, Debug)]
pub struct StaticAssetLoader {
    data: SkeletonData,
}

impl StaticAssetLoader {
    pub fn new(data: SkeletonData) -> Self {
        Self { data }
    }
}

impl AssetLoader for StaticAssetLoader {
    fn load(&mut self, sources: &AssetSources) -> Result<SkeletonData, PlayerError> {
        sources.validate()?;
        self.data.validate()?;
        Ok(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn json_is_preferred_over_binary() {
        let sources = AssetSources {
            json: Some("a.json".into()),
            skel: Some("a.skel".into()),
            atlas: Some("a.atlas".into()),
        };
        assert_eq!(
            SkeletonSource::from_sources(&sources).unwrap(),
            SkeletonSource::Json("a.json".into())
        );
    }

    #[test]
    fn missing_files_are_asset_load_errors() {
        let mut loader = FsAssetLoader::new("/nonexistent-spine-stage-root");
        let sources = AssetSources {
            json: Some("hero.json".into()),
            skel: None,
            atlas: Some("hero.atlas".into()),
        };
        let err = loader.load(&sources).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AssetLoad);
    }

    #[test]
    fn unconfigured_sources_fail_before_loading() {
        let mut loader = StaticAssetLoader::new(SkeletonData::default());
        let err = loader.load(&AssetSources::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn static_data_is_validated_before_use() {
        let data = SkeletonData {
            slots: vec![crate::rig::SlotData {
                name: "body".into(),
                bone: "root".into(),
                attachment: None,
            }],
            ..Default::default()
        };
        let sources = AssetSources {
            json: Some("a.json".into()),
            skel: None,
            atlas: Some("a.atlas".into()),
        };
        let err = StaticAssetLoader::new(data).load(&sources).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RuntimeParse);
    }
}
