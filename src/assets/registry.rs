use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{StoryError, StoryResult};

/// What a registered byte blob is used for.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// `.cube` 3D LUT text.
    Lut,
    /// TTF/OTF font.
    Font,
    /// SVG or raster sticker.
    Sticker,
    /// Raster image placed as an element or as still media.
    Image,
}

/// Logical asset identifier, e.g. `"luts/teal_orange"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl AssetId {
    /// Wrap an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Explicit identifier to bytes table, filled at load time by the host.
#[derive(Clone, Debug, Default)]
pub struct AssetRegistry {
    entries: BTreeMap<AssetId, (AssetKind, Arc<[u8]>)>,
}

impl AssetRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) `bytes` under `id`.
    pub fn register(
        &mut self,
        id: impl Into<AssetId>,
        kind: AssetKind,
        bytes: impl Into<Arc<[u8]>>,
    ) {
        let id = id.into();
        tracing::debug!(asset = %id, ?kind, "registered asset");
        self.entries.insert(id, (kind, bytes.into()));
    }

    /// Read a file and register its contents.
    pub fn register_file(
        &mut self,
        id: impl Into<AssetId>,
        kind: AssetKind,
        path: &Path,
    ) -> StoryResult<()> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read asset bytes from {}", path.display()))?;
        self.register(id, kind, bytes);
        Ok(())
    }

    /// Bytes registered under `id`, regardless of kind.
    pub fn bytes(&self, id: &str) -> Option<Arc<[u8]>> {
        self.entries.get(id).map(|(_, b)| b.clone())
    }

    /// Bytes registered under `id` with the expected kind.
    pub fn bytes_of(&self, id: &str, kind: AssetKind) -> StoryResult<Arc<[u8]>> {
        match self.entries.get(id) {
            Some((k, b)) if *k == kind => Ok(b.clone()),
            Some((k, _)) => Err(StoryError::validation(format!(
                "asset '{id}' is a {k:?}, expected {kind:?}"
            ))),
            None => Err(StoryError::validation(format!("unknown asset '{id}'"))),
        }
    }

    /// Kind of the asset registered under `id`.
    pub fn kind(&self, id: &str) -> Option<AssetKind> {
        self.entries.get(id).map(|(k, _)| *k)
    }

    /// Ids registered with `kind`, in sorted order.
    pub fn ids(&self, kind: AssetKind) -> impl Iterator<Item = &AssetId> {
        self.entries
            .iter()
            .filter(move |(_, (k, _))| *k == kind)
            .map(|(id, _)| id)
    }

    /// Remove an entry.
    pub fn remove(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::borrow::Borrow<str> for AssetId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/registry.rs"]
mod tests;
