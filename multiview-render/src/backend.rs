//! The rendering collaborator the pipeline drives

use crate::camera::CameraParams;
use crate::options::RenderSettings;
use multiview_core::{Result, TriangleMesh};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Size and visibility of the drawing surface a session renders into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub visible: bool,
}

impl WindowConfig {
    pub fn new(width: u32, height: u32, visible: bool) -> Self {
        Self { width, height, visible }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new(768, 768, false)
    }
}

/// A backend that owns at most one drawing session at a time.
///
/// Every method other than `create_session` and `destroy_session` fails with
/// [`multiview_core::Error::Backend`] when no session is active. Sessions are
/// normally driven through [`crate::RenderContext`], which guarantees the
/// matching `destroy_session`.
pub trait RenderBackend {
    /// Create the drawing surface
    fn create_session(&mut self, window: &WindowConfig) -> Result<()>;

    /// Register the mesh with the session's scene
    fn add_geometry(&mut self, mesh: &TriangleMesh) -> Result<()>;

    /// Visual attributes of the active session
    fn settings_mut(&mut self) -> Result<&mut RenderSettings>;

    fn set_camera(&mut self, params: &CameraParams) -> Result<()>;

    /// Replace the registered geometry with the mesh's current state
    fn update_geometry(&mut self, mesh: &TriangleMesh) -> Result<()>;

    /// Render the current scene and write it to `path`
    fn capture_image(&mut self, path: &Path) -> Result<()>;

    /// Tear the session down; a no-op without one
    fn destroy_session(&mut self);

    fn has_session(&self) -> bool;
}
