use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::foundation::error::{StoryError, StoryResult};
use crate::foundation::math::unit_to_u8;
use crate::lut::parse::{LutStrictness, ParsedLut, parse_cube_with};

/// A 3D LUT packed into a 2D RGBA8 texture.
///
/// Blue slices are laid out left to right: slice `b` spans columns `[b*N, b*N + N)`. Inside a
/// slice, x is the red index and y the green index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LutAtlas {
    /// Grid size `N`.
    pub size: u32,
    /// `N * N`.
    pub width: u32,
    /// `N`.
    pub height: u32,
    /// Straight RGBA8 pixels, alpha always 255.
    pub rgba: Arc<[u8]>,
}

impl LutAtlas {
    /// Pack a parsed LUT.
    #[tracing::instrument(skip(lut), fields(size = lut.size))]
    pub fn build(lut: &ParsedLut) -> StoryResult<Self> {
        let n = lut.size;
        if lut.table.len() != n * n * n * 3 {
            return Err(StoryError::lut(format!(
                "lut table holds {} floats, expected {}",
                lut.table.len(),
                n * n * n * 3
            )));
        }
        let width = n * n;
        let height = n;
        let mut rgba = vec![0u8; width * height * 4];
        for b in 0..n {
            for g in 0..n {
                for r in 0..n {
                    let [vr, vg, vb] = lut.entry(r, g, b);
                    let x = b * n + r;
                    let y = g;
                    let idx = (y * width + x) * 4;
                    rgba[idx] = unit_to_u8(vr);
                    rgba[idx + 1] = unit_to_u8(vg);
                    rgba[idx + 2] = unit_to_u8(vb);
                    rgba[idx + 3] = 255;
                }
            }
        }

        let size = u32::try_from(n).map_err(|_| StoryError::lut("lut size overflow"))?;
        Ok(Self {
            size,
            width: size * size,
            height: size,
            rgba: rgba.into(),
        })
    }

    /// RGBA texel at `(x, y)`.
    pub fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.rgba[idx],
            self.rgba[idx + 1],
            self.rgba[idx + 2],
            self.rgba[idx + 3],
        ]
    }
}

/// Identity of LUT source bytes: the registry id plus a content hash.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LutSourceId {
    /// Asset id the bytes were registered under.
    pub asset: String,
    /// xxh3 of the bytes.
    pub content_hash: u64,
}

impl LutSourceId {
    /// Derive the identity for `bytes` registered as `asset`.
    pub fn new(asset: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            asset: asset.into(),
            content_hash: xxhash_rust::xxh3::xxh3_64(bytes),
        }
    }
}

/// A prepared LUT: parse result metadata plus its atlas.
#[derive(Clone, Debug)]
pub struct PreparedLut {
    /// Source identity.
    pub source: LutSourceId,
    /// Optional title from the file.
    pub title: Option<String>,
    /// Domain minimum.
    pub domain_min: [f32; 3],
    /// Domain maximum.
    pub domain_max: [f32; 3],
    /// Packed atlas.
    pub atlas: Arc<LutAtlas>,
    /// Number of soft-failure warnings raised while parsing.
    pub warning_count: usize,
}

/// Parse and pack LUT bytes.
pub fn prepare_lut(
    source: LutSourceId,
    bytes: &[u8],
    strictness: LutStrictness,
) -> StoryResult<PreparedLut> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| StoryError::lut(format!("lut '{}' is not utf-8: {e}", source.asset)))?;
    let parsed = parse_cube_with(text, strictness)?;
    let atlas = LutAtlas::build(&parsed)?;
    Ok(PreparedLut {
        source,
        title: parsed.title,
        domain_min: parsed.domain_min,
        domain_max: parsed.domain_max,
        atlas: Arc::new(atlas),
        warning_count: parsed.warnings.len(),
    })
}

/// Bounded LRU cache of prepared LUTs keyed by source identity.
pub struct LutAtlasCache {
    entries: HashMap<LutSourceId, Arc<PreparedLut>>,
    lru: VecDeque<LutSourceId>,
    capacity: usize,
    strictness: LutStrictness,
}

impl Default for LutAtlasCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LutAtlasCache {
    /// Create a cache sized from `STORYCANVAS_LUT_CACHE_CAPACITY` (default 16).
    pub fn new() -> Self {
        let capacity = std::env::var("STORYCANVAS_LUT_CACHE_CAPACITY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(16);
        Self::with_capacity(capacity)
    }

    /// Create a cache holding at most `capacity` LUTs.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: VecDeque::new(),
            capacity: capacity.max(1),
            strictness: LutStrictness::default(),
        }
    }

    /// Use `strictness` for LUTs built from now on.
    pub fn with_strictness(mut self, strictness: LutStrictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Number of cached LUTs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached entry for `id`, if any.
    pub fn get(&mut self, id: &LutSourceId) -> Option<Arc<PreparedLut>> {
        let hit = self.entries.get(id).cloned();
        if hit.is_some() {
            self.touch(id);
        }
        hit
    }

    /// Return the cached LUT for `bytes`, building it on first use.
    pub fn get_or_build(&mut self, asset: &str, bytes: &[u8]) -> StoryResult<Arc<PreparedLut>> {
        let id = LutSourceId::new(asset, bytes);
        if let Some(hit) = self.get(&id) {
            return Ok(hit);
        }
        let prepared = Arc::new(prepare_lut(id.clone(), bytes, self.strictness)?);
        self.insert(prepared.clone());
        Ok(prepared)
    }

    /// Insert an already prepared LUT (e.g. one built on a worker thread).
    pub fn insert(&mut self, prepared: Arc<PreparedLut>) {
        let id = prepared.source.clone();
        self.entries.insert(id.clone(), prepared);
        self.touch(&id);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.entries.remove(&old);
            }
        }
    }

    fn touch(&mut self, id: &LutSourceId) {
        if let Some(pos) = self.lru.iter().position(|x| x == id) {
            self.lru.remove(pos);
        }
        self.lru.push_back(id.clone());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/lut/atlas.rs"]
mod tests;
