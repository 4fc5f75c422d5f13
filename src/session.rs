use std::collections::HashSet;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crate::assets::color::ColorDef;
use crate::assets::media::MediaSource;
use crate::assets::registry::{AssetKind, AssetRegistry};
use crate::bridge::gesture::{GestureController, GestureOpts};
use crate::draw::path::StrokeTool;
use crate::draw::session::StrokeSession;
use crate::editor::handle::Editor;
use crate::editor::history::HistoryOpts;
use crate::editor::state::EditorState;
use crate::foundation::core::{Point, Viewport};
use crate::foundation::error::{StoryError, StoryResult};
use crate::geometry::surface::RenderSurface;
use crate::grading::engine::{GradingEngine, LutSelection};
use crate::lut::atlas::{LutSourceId, PreparedLut, prepare_lut};
use crate::lut::parse::LutStrictness;
use crate::lut::shader::{LutShader, ShaderCaps};
use crate::render::compositor::{Compositor, CompositorOpts, FrameInputs};
use crate::render::export::{FrameExporter, FrameRGBA};

/// Work handed to the preparation thread.
#[derive(Clone, Debug)]
pub enum PrepareRequest {
    /// Parse, pack and compile a LUT.
    Lut {
        /// Asset id.
        id: String,
        /// `.cube` bytes.
        bytes: Arc<[u8]>,
        /// Device capabilities to compile for.
        caps: ShaderCaps,
        /// Entry-count handling.
        strictness: LutStrictness,
    },
}

/// Result of one [`PrepareRequest`].
#[derive(Debug)]
pub enum PrepareOutcome {
    /// Atlas built and shader compiled.
    LutReady {
        /// Packed atlas.
        prepared: Arc<PreparedLut>,
        /// Compiled shader.
        shader: Arc<LutShader>,
    },
    /// Atlas built but the device cannot run the shader; grading stays in matrix mode.
    ShaderUnavailable {
        /// Packed atlas, kept for a later retry.
        prepared: Arc<PreparedLut>,
        /// Compile error.
        error: StoryError,
    },
    /// The file could not be parsed.
    LutFailed {
        /// Asset id.
        asset: String,
        /// Parse or pack error.
        error: StoryError,
    },
}

#[tracing::instrument(skip_all, fields(asset = %id))]
fn prepare(
    id: String,
    bytes: &[u8],
    caps: ShaderCaps,
    strictness: LutStrictness,
) -> PrepareOutcome {
    let source = LutSourceId::new(id.as_str(), bytes);
    let prepared = match prepare_lut(source, bytes, strictness) {
        Ok(p) => Arc::new(p),
        Err(error) => return PrepareOutcome::LutFailed { asset: id, error },
    };
    match LutShader::compile_prepared(&prepared, &caps) {
        Ok(shader) => PrepareOutcome::LutReady {
            prepared,
            shader: Arc::new(shader),
        },
        Err(error) => PrepareOutcome::ShaderUnavailable { prepared, error },
    }
}

/// Background thread that builds LUT atlases and shaders off the frame loop.
///
/// Requests go in over a channel; finished work is collected with the non-blocking
/// [`ResourcePreparer::try_recv`]. Dropping the preparer closes the channel and joins the worker.
pub struct ResourcePreparer {
    tx: Option<mpsc::Sender<PrepareRequest>>,
    rx: mpsc::Receiver<PrepareOutcome>,
    worker: Option<std::thread::JoinHandle<()>>,
    pending: HashSet<String>,
}

impl std::fmt::Debug for ResourcePreparer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourcePreparer")
            .field("pending", &self.pending)
            .finish()
    }
}

impl ResourcePreparer {
    /// Start the worker thread.
    pub fn spawn() -> StoryResult<Self> {
        let (tx, work_rx) = mpsc::channel::<PrepareRequest>();
        let (done_tx, rx) = mpsc::channel::<PrepareOutcome>();
        let worker = std::thread::Builder::new()
            .name("storycanvas-prepare".to_owned())
            .spawn(move || {
                while let Ok(req) = work_rx.recv() {
                    let outcome = match req {
                        PrepareRequest::Lut {
                            id,
                            bytes,
                            caps,
                            strictness,
                        } => prepare(id, &bytes, caps, strictness),
                    };
                    if done_tx.send(outcome).is_err() {
                        break;
                    }
                }
            })
            .map_err(|e| StoryError::Other(anyhow::anyhow!("spawn preparer thread: {e}")))?;
        Ok(Self {
            tx: Some(tx),
            rx,
            worker: Some(worker),
            pending: HashSet::new(),
        })
    }

    /// Queue `req`. Returns `false` when the same asset is already in flight.
    pub fn request(&mut self, req: PrepareRequest) -> bool {
        let PrepareRequest::Lut { id, .. } = &req;
        if self.pending.contains(id) {
            return false;
        }
        let id = id.clone();
        let Some(tx) = &self.tx else {
            return false;
        };
        if tx.send(req).is_err() {
            tracing::warn!(asset = %id, "preparer thread is gone");
            return false;
        }
        self.pending.insert(id);
        true
    }

    /// Return `true` while `asset` is queued or being built.
    pub fn is_pending(&self, asset: &str) -> bool {
        self.pending.contains(asset)
    }

    fn finish(&mut self, outcome: PrepareOutcome) -> PrepareOutcome {
        let asset = match &outcome {
            PrepareOutcome::LutReady { prepared, .. }
            | PrepareOutcome::ShaderUnavailable { prepared, .. } => &prepared.source.asset,
            PrepareOutcome::LutFailed { asset, .. } => asset,
        };
        self.pending.remove(asset);
        outcome
    }

    /// Next finished result, without blocking.
    pub fn try_recv(&mut self) -> Option<PrepareOutcome> {
        let outcome = self.rx.try_recv().ok()?;
        Some(self.finish(outcome))
    }

    /// Next finished result, waiting up to `timeout`.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<PrepareOutcome> {
        let outcome = self.rx.recv_timeout(timeout).ok()?;
        Some(self.finish(outcome))
    }
}

impl Drop for ResourcePreparer {
    fn drop(&mut self) {
        self.tx = None;
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::warn!("preparer thread panicked");
        }
    }
}

/// Settings for an [`EditorSession`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionOpts {
    /// Compositor settings.
    pub compositor: CompositorOpts,
    /// Device shader capabilities.
    pub caps: ShaderCaps,
    /// LUT entry-count handling.
    pub strictness: LutStrictness,
    /// Undo settings.
    pub history: HistoryOpts,
}

/// One editing session: the shared editor, its resources and the frame loop.
pub struct EditorSession {
    editor: Editor,
    compositor: Compositor,
    grading: GradingEngine,
    assets: AssetRegistry,
    media: Arc<dyn MediaSource>,
    preparer: ResourcePreparer,
    stroke: StrokeSession,
    surface: RenderSurface,
    opts: SessionOpts,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("editor", &self.editor)
            .field("compositor", &self.compositor)
            .field("assets", &self.assets.len())
            .field("preparer", &self.preparer)
            .field("surface", &self.surface)
            .finish()
    }
}

impl EditorSession {
    /// New session over an empty editor.
    pub fn new(
        viewport: Viewport,
        assets: AssetRegistry,
        media: Arc<dyn MediaSource>,
        opts: SessionOpts,
    ) -> StoryResult<Self> {
        Self::with_editor(Editor::new(opts.history), viewport, assets, media, opts)
    }

    /// New session over an existing editor.
    pub fn with_editor(
        editor: Editor,
        viewport: Viewport,
        assets: AssetRegistry,
        media: Arc<dyn MediaSource>,
        opts: SessionOpts,
    ) -> StoryResult<Self> {
        Ok(Self {
            editor,
            compositor: Compositor::new(opts.compositor),
            grading: GradingEngine::new(opts.caps).with_strictness(opts.strictness),
            assets,
            media,
            preparer: ResourcePreparer::spawn()?,
            stroke: StrokeSession::new(),
            surface: RenderSurface::from_viewport(viewport),
            opts,
        })
    }

    /// Shared editor handle.
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Registered asset bytes.
    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    /// Mutable access for late registration.
    pub fn assets_mut(&mut self) -> &mut AssetRegistry {
        &mut self.assets
    }

    /// Current output surface.
    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    /// Resize the output.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.surface = RenderSurface::from_viewport(viewport);
    }

    /// Gesture controller bound to this session's editor.
    pub fn gestures(&self, opts: GestureOpts) -> GestureController {
        GestureController::new(self.editor.clone(), opts)
    }

    /// Select a LUT for the media layer.
    ///
    /// Returns `true` when the shader is ready for the next frame. Otherwise the build is
    /// queued, frames keep using matrix grading, and [`EditorSession::poll`] installs the
    /// shader once the worker finishes.
    pub fn activate_lut(&mut self, asset: &str, intensity: f32) -> StoryResult<bool> {
        let bytes = self.assets.bytes_of(asset, AssetKind::Lut)?;
        let selection = LutSelection::new(asset, intensity);
        self.editor.mutate(|s| s.set_lut(Some(selection)));

        if self.grading.is_ready(asset, &bytes) {
            return Ok(true);
        }
        let source = LutSourceId::new(asset, &bytes);
        if let Some(prepared) = self.grading.cached_atlas(&source) {
            match LutShader::compile_prepared(&prepared, &self.opts.caps) {
                Ok(shader) => {
                    self.grading.install(prepared, Arc::new(shader));
                    return Ok(true);
                }
                Err(err) => {
                    tracing::warn!(asset, %err, "lut shader unavailable; using matrix grading");
                    return Ok(false);
                }
            }
        }
        self.preparer.request(PrepareRequest::Lut {
            id: asset.to_owned(),
            bytes,
            caps: self.opts.caps,
            strictness: self.opts.strictness,
        });
        Ok(false)
    }

    /// Clear the LUT selection. The compiled shader stays cached.
    pub fn deactivate_lut(&mut self) {
        self.editor.mutate(|s| s.set_lut(None));
    }

    /// Return `true` while a LUT build for `asset` is in flight.
    pub fn is_preparing(&self, asset: &str) -> bool {
        self.preparer.is_pending(asset)
    }

    /// Install everything the worker has finished. Returns how many results were taken.
    pub fn poll(&mut self) -> usize {
        let mut n = 0;
        while let Some(outcome) = self.preparer.try_recv() {
            self.apply(outcome);
            n += 1;
        }
        n
    }

    /// Wait up to `timeout` for one result and install it. Returns `false` on timeout.
    pub fn wait_for_resources(&mut self, timeout: Duration) -> bool {
        match self.preparer.recv_timeout(timeout) {
            Some(outcome) => {
                self.apply(outcome);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, outcome: PrepareOutcome) {
        match outcome {
            PrepareOutcome::LutReady { prepared, shader } => {
                tracing::debug!(
                    asset = %prepared.source.asset,
                    size = prepared.atlas.size,
                    "lut ready"
                );
                self.grading.install(prepared, shader);
            }
            PrepareOutcome::ShaderUnavailable { prepared, error } => {
                tracing::warn!(
                    asset = %prepared.source.asset,
                    %error,
                    "lut shader unavailable; using matrix grading"
                );
                self.grading.cache_atlas(prepared);
            }
            PrepareOutcome::LutFailed { asset, error } => {
                tracing::warn!(%asset, %error, "lut preparation failed");
            }
        }
    }

    /// Start a freehand stroke.
    pub fn begin_stroke(&mut self, tool: StrokeTool, color: ColorDef, width: f64) {
        self.stroke.begin(tool, color, width);
    }

    /// Add a screen-space sample to the stroke in progress.
    pub fn push_stroke_point(&mut self, screen: Point) -> bool {
        let p = self.surface.screen_to_canvas(screen);
        self.stroke.push_point(p)
    }

    /// Commit the stroke in progress. Returns `false` when there was nothing to commit.
    pub fn end_stroke(&mut self) -> bool {
        match self.stroke.end() {
            Some(path) => {
                self.editor.mutate(|s| s.add_drawing_path(path));
                true
            }
            None => false,
        }
    }

    /// Discard the stroke in progress.
    pub fn cancel_stroke(&mut self) {
        self.stroke.cancel();
    }

    /// The live stroke buffer.
    pub fn stroke(&self) -> &StrokeSession {
        &self.stroke
    }

    fn render_state(&mut self, state: &EditorState) -> StoryResult<FrameRGBA> {
        let grading = self.grading.resolve_state(&state.filter);
        let inputs = FrameInputs {
            state,
            registry: Some(self.editor.registry().as_ref()),
            media: self.media.as_ref(),
            assets: &self.assets,
            grading: &grading,
            live_stroke: self.stroke.live_path(),
            surface: &self.surface,
        };
        self.compositor.render(&inputs)
    }

    /// Draw the current state. Never waits on resources that are still being prepared.
    pub fn render_frame(&mut self) -> StoryResult<FrameRGBA> {
        self.poll();
        let state = self.editor.snapshot();
        self.render_state(&state)
    }
}

impl FrameExporter for EditorSession {
    fn render_frame_at(&mut self, time_s: f64) -> StoryResult<FrameRGBA> {
        if !time_s.is_finite() {
            return Err(StoryError::validation("export time must be finite"));
        }
        self.poll();
        let mut state = self.editor.snapshot();
        let d = state.playback.duration_s;
        state.playback.time_s = if d > 0.0 {
            time_s.clamp(0.0, d)
        } else {
            time_s.max(0.0)
        };
        self.render_state(&state)
    }

    fn snapshot(&mut self) -> StoryResult<FrameRGBA> {
        self.render_frame()
    }
}

#[cfg(test)]
#[path = "../tests/unit/session/session.rs"]
mod tests;
