use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::assets::decode::DecodedImage;

/// Whether the background media is a still or a timeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Still photo.
    #[default]
    Image,
    /// Video; frames are looked up by playback time.
    Video,
}

/// Result of asking a [`MediaSource`] for pixels.
#[derive(Clone, Debug)]
pub enum MediaFrame {
    /// Decoded pixels for the requested time.
    Ready(Arc<DecodedImage>),
    /// Still decoding (or unknown); the media layer is skipped for this frame.
    NotReady,
}

impl MediaFrame {
    /// The image, when ready.
    pub fn ready(&self) -> Option<&Arc<DecodedImage>> {
        match self {
            Self::Ready(img) => Some(img),
            Self::NotReady => None,
        }
    }
}

/// Host collaborator resolving a media URI to decoded pixels. Must not block.
pub trait MediaSource: Send + Sync {
    /// Pixels for `uri` at `time_s` (ignored for stills).
    fn frame(&self, uri: &str, time_s: f64) -> MediaFrame;
}

/// A source that never has anything ready.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMedia;

impl MediaSource for NoMedia {
    fn frame(&self, _uri: &str, _time_s: f64) -> MediaFrame {
        MediaFrame::NotReady
    }
}

/// Pre-decoded stills and video frames held in memory.
///
/// Video frames are keyed by millisecond timestamp; a lookup returns the nearest frame at or
/// before the requested time, or the first frame when asked for a time before it.
#[derive(Debug, Default)]
pub struct InMemoryMedia {
    stills: RwLock<HashMap<String, Arc<DecodedImage>>>,
    videos: RwLock<HashMap<String, BTreeMap<u64, Arc<DecodedImage>>>>,
}

impl InMemoryMedia {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a still image.
    pub fn insert_still(&self, uri: impl Into<String>, image: DecodedImage) {
        if let Ok(mut stills) = self.stills.write() {
            stills.insert(uri.into(), Arc::new(image));
        }
    }

    /// Store one decoded video frame at `time_s`.
    pub fn insert_video_frame(&self, uri: impl Into<String>, time_s: f64, image: DecodedImage) {
        if let Ok(mut videos) = self.videos.write() {
            videos
                .entry(uri.into())
                .or_default()
                .insert(time_key(time_s), Arc::new(image));
        }
    }

    /// Forget everything stored for `uri`.
    pub fn remove(&self, uri: &str) {
        if let Ok(mut stills) = self.stills.write() {
            stills.remove(uri);
        }
        if let Ok(mut videos) = self.videos.write() {
            videos.remove(uri);
        }
    }
}

fn time_key(time_s: f64) -> u64 {
    if time_s.is_finite() {
        (time_s.max(0.0) * 1000.0).round() as u64
    } else {
        0
    }
}

impl MediaSource for InMemoryMedia {
    fn frame(&self, uri: &str, time_s: f64) -> MediaFrame {
        if let Some(img) = self.stills.read().ok().and_then(|s| s.get(uri).cloned()) {
            return MediaFrame::Ready(img);
        }
        let Ok(videos) = self.videos.read() else {
            return MediaFrame::NotReady;
        };
        let Some(frames) = videos.get(uri) else {
            return MediaFrame::NotReady;
        };
        let key = time_key(time_s);
        frames
            .range(..=key)
            .next_back()
            .or_else(|| frames.iter().next())
            .map(|(_, img)| MediaFrame::Ready(img.clone()))
            .unwrap_or(MediaFrame::NotReady)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
