use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    skeletons: HashMap<String, SkeletonEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SkeletonEntry {
    Path(String),
    Detailed {
        json: String,
        #[serde(default)]
        atlas: Option<String>,
    },
}

impl SkeletonEntry {
    fn json(&self) -> &str {
        match self {
            SkeletonEntry::Path(path) => path,
            SkeletonEntry::Detailed { json, .. } => json,
        }
    }

    fn atlas(&self) -> Option<&str> {
        match self {
            SkeletonEntry::Path(_) => None,
            SkeletonEntry::Detailed { atlas, .. } => atlas.as_deref(),
        }
    }
}

/// Directory every manifest path is relative to.
pub fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod skeletons {
    use super::*;

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.skeletons, "skeleton", name)?;
        read_to_string(entry.json())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.skeletons, "skeleton", name)?;
        super::load_json(entry.json())
    }

    /// Manifest-relative locations `(json, atlas)`, as a loader rooted at
    /// [`fixtures_root`] expects them.
    pub fn sources(name: &str) -> Result<(String, Option<String>)> {
        let entry = lookup(&MANIFEST.skeletons, "skeleton", name)?;
        Ok((entry.json().to_string(), entry.atlas().map(str::to_string)))
    }
}
