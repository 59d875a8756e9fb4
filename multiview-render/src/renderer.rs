//! Multi-view rendering pipeline

use crate::backend::{RenderBackend, WindowConfig};
use crate::camera::{CameraParams, CameraRig};
use crate::context::RenderContext;
use crate::options::RenderOptionSet;
use crate::viewpoint::ViewpointSource;
use image::ImageFormat;
use multiview_core::{Drawable, Error, Point3f, Result, TriangleMesh};
use nalgebra::Rotation3;
use std::path::{Path, PathBuf};

/// Image extension used when none is configured
pub const DEFAULT_IMAGE_FORMAT: &str = "png";

/// Where a render session currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Uninitialized,
    ContextAcquired,
    OptionsApplied,
    Rotating(usize),
    Capturing(usize),
    Completed,
    Failed,
}

/// Outcome of a completed session
#[derive(Debug, Clone)]
pub struct RenderReport {
    /// Written images, in capture order
    pub frames: Vec<PathBuf>,
    /// Camera used for every frame
    pub camera: CameraParams,
    /// Pivot every rotation was applied about
    pub center: Point3f,
    /// Accumulated rotation of the mesh after the last frame
    pub orientation: Rotation3<f32>,
}

/// Renders one mesh from a sequence of viewpoints into an output folder.
///
/// Each frame rotates the mesh further about its original bounding-box
/// center and captures `angle_<i>.<ext>`. The camera is computed once from
/// the unrotated bounds and never moves.
#[derive(Debug)]
pub struct MultiViewRenderer {
    output_folder: PathBuf,
    viewpoints: ViewpointSource,
    options: RenderOptionSet,
    window: WindowConfig,
    extension: String,
    state: RenderState,
}

impl MultiViewRenderer {
    pub fn new(
        output_folder: impl Into<PathBuf>,
        viewpoints: ViewpointSource,
        options: RenderOptionSet,
        window: WindowConfig,
    ) -> Self {
        Self {
            output_folder: output_folder.into(),
            viewpoints,
            options,
            window,
            extension: DEFAULT_IMAGE_FORMAT.to_string(),
            state: RenderState::Uninitialized,
        }
    }

    /// Write frames as `extension` instead of png
    pub fn with_image_format(mut self, extension: &str) -> Result<Self> {
        self.extension = validate_image_format(extension)?;
        Ok(self)
    }

    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }

    pub fn viewpoints(&self) -> &ViewpointSource {
        &self.viewpoints
    }

    pub fn options(&self) -> &RenderOptionSet {
        &self.options
    }

    pub fn window(&self) -> &WindowConfig {
        &self.window
    }

    pub fn image_format(&self) -> &str {
        &self.extension
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Path of the `index`-th frame
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.output_folder
            .join(format!("angle_{}.{}", index, self.extension))
    }

    /// Load the mesh at `mesh_path` and render it
    pub fn render<B, P>(&mut self, backend: &mut B, mesh_path: P) -> Result<RenderReport>
    where
        B: RenderBackend + ?Sized,
        P: AsRef<Path>,
    {
        let mesh_path = mesh_path.as_ref();
        let loaded = multiview_io::ensure_mesh_file(mesh_path).and_then(|()| {
            log::info!("loading mesh {}", mesh_path.display());
            multiview_io::read_mesh(mesh_path)
        });

        match loaded {
            Ok(mesh) => self.render_mesh(backend, mesh),
            Err(e) => {
                self.state = RenderState::Failed;
                Err(e)
            }
        }
    }

    /// Render an already loaded mesh
    pub fn render_mesh<B>(
        &mut self,
        backend: &mut B,
        mut mesh: TriangleMesh,
    ) -> Result<RenderReport>
    where
        B: RenderBackend + ?Sized,
    {
        self.state = RenderState::Uninitialized;
        let result = self.run(backend, &mut mesh);
        self.state = match result {
            Ok(_) => RenderState::Completed,
            Err(_) => RenderState::Failed,
        };
        result
    }

    fn run<B>(&mut self, backend: &mut B, mesh: &mut TriangleMesh) -> Result<RenderReport>
    where
        B: RenderBackend + ?Sized,
    {
        mesh.validate()?;
        mesh.compute_vertex_normals();
        let bounds = mesh.bounding_box();
        let center = bounds.center();
        let count = self.viewpoints.len();

        log::info!(
            "rendering {} vertices / {} faces from {} viewpoints into {}",
            mesh.vertex_count(),
            mesh.face_count(),
            count,
            self.output_folder.display()
        );

        std::fs::create_dir_all(&self.output_folder)?;

        let mut context = RenderContext::acquire(backend, &self.window)?;
        self.state = RenderState::ContextAcquired;

        context.add_geometry(mesh)?;
        self.options.apply(context.settings_mut()?);
        self.state = RenderState::OptionsApplied;

        let camera = CameraRig::compute(&bounds);
        context.set_camera(&camera)?;

        let mut orientation = Rotation3::identity();
        let mut frames = Vec::with_capacity(count);

        for index in 0..count {
            self.state = RenderState::Rotating(index);
            let viewpoint = self.viewpoints.next(index)?;
            let rotation = viewpoint.rotation();
            mesh.rotate(&rotation, &center);
            orientation = rotation * orientation;
            log::debug!(
                "frame {}: rotate by ({:.4}, {:.4}, {:.4})",
                index,
                viewpoint.x,
                viewpoint.y,
                viewpoint.z
            );

            self.state = RenderState::Capturing(index);
            context.update_geometry(mesh)?;
            let path = self.frame_path(index);
            context.capture_image(&path)?;
            log::debug!("frame {}: captured {}", index, path.display());
            frames.push(path);
        }

        context.release();
        log::info!("rendered {} frames into {}", frames.len(), self.output_folder.display());

        Ok(RenderReport {
            frames,
            camera,
            center,
            orientation,
        })
    }
}

/// Normalize an image extension, rejecting ones no enabled encoder handles
pub fn validate_image_format(extension: &str) -> Result<String> {
    let extension = extension.trim_start_matches('.').to_ascii_lowercase();
    match ImageFormat::from_extension(&extension) {
        Some(ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Bmp) => Ok(extension),
        _ => Err(Error::Precondition(format!(
            "unsupported image format '{}', expected png, jpg or bmp",
            extension
        ))),
    }
}
