//! Session configuration loaded from JSON

use crate::backend::WindowConfig;
use crate::options::RenderOptionSet;
use crate::renderer::{MultiViewRenderer, DEFAULT_IMAGE_FORMAT};
use crate::viewpoint::{ViewpointSource, ViewpointRequest};
use multiview_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Everything needed to set up a [`MultiViewRenderer`].
///
/// ```json
/// {
///     "output_folder": "renders/part",
///     "viewpoints": [[0, 0, 0], [3.14159, 0, 0]],
///     "render_options": { "show-wireframe": false },
///     "window": { "width": 512, "height": 512 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub output_folder: PathBuf,
    #[serde(default)]
    pub viewpoints: ViewpointRequest,
    #[serde(default)]
    pub seed: Option<u64>,
    /// `None` selects the default option set; a map replaces it
    #[serde(default)]
    pub render_options: Option<Map<String, Value>>,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default = "default_image_format")]
    pub image_format: String,
}

fn default_image_format() -> String {
    DEFAULT_IMAGE_FORMAT.to_string()
}

impl SessionConfig {
    pub fn new(output_folder: impl Into<PathBuf>) -> Self {
        Self {
            output_folder: output_folder.into(),
            viewpoints: ViewpointRequest::default(),
            seed: None,
            render_options: None,
            window: WindowConfig::default(),
            image_format: default_image_format(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::InvalidData(format!("invalid session config: {}", e)))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| {
                Error::InvalidData(format!("invalid session config {}: {}", path.display(), e))
            })
    }

    /// Validate every field and build the renderer. Touches no files.
    pub fn build(&self) -> Result<MultiViewRenderer> {
        let viewpoints = ViewpointSource::from_request(&self.viewpoints, self.seed)?;
        let options = RenderOptionSet::from_map(self.render_options.as_ref())?;

        MultiViewRenderer::new(&self.output_folder, viewpoints, options, self.window)
            .with_image_format(&self.image_format)
    }
}
