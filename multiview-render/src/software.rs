//! CPU rasterizer implementing [`RenderBackend`]
//!
//! Renders offscreen into an RGB buffer with a depth buffer and writes frames
//! through the `image` crate, so it works on headless machines. Triangles
//! crossing the near plane are dropped rather than clipped.

use crate::backend::{RenderBackend, WindowConfig};
use crate::camera::{Camera, CameraParams};
use crate::options::{Color, RenderSettings, Shading};
use image::{Rgb, RgbImage};
use multiview_core::{Error, Point3f, Result, TriangleMesh, Vector3f};
use nalgebra::{Matrix4, Vector4};
use std::path::Path;

/// Minimum light factor for surfaces facing away from the light
const AMBIENT: f32 = 0.1;
/// Depth slack so wireframe edges win against the faces they bound
const WIREFRAME_DEPTH_BIAS: f32 = 1e-3;

struct Session {
    window: WindowConfig,
    settings: RenderSettings,
    camera: Option<CameraParams>,
    mesh: Option<TriangleMesh>,
}

/// Software rendering backend
#[derive(Default)]
pub struct SoftwareBackend {
    session: Option<Session>,
}

impl SoftwareBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| Error::Backend("no active render session".to_string()))
    }

    fn session_mut(&mut self) -> Result<&mut Session> {
        self.session
            .as_mut()
            .ok_or_else(|| Error::Backend("no active render session".to_string()))
    }

    /// Render the current scene into memory
    pub fn render_frame(&self) -> Result<RgbImage> {
        let session = self.session()?;
        let window = session.window;
        let mut frame = FrameBuffer::new(window.width, window.height, session.settings.background);

        let camera = session
            .camera
            .as_ref()
            .and_then(|params| Camera::from_params(params, window.aspect_ratio()));

        match (&session.mesh, camera) {
            (Some(mesh), Some(camera)) => frame.draw_mesh(mesh, &camera, &session.settings),
            (Some(_), None) => log::debug!("camera missing or degenerate, frame shows background only"),
            (None, _) => log::debug!("no geometry registered, frame shows background only"),
        }

        Ok(frame.color)
    }
}

impl RenderBackend for SoftwareBackend {
    fn create_session(&mut self, window: &WindowConfig) -> Result<()> {
        if self.session.is_some() {
            return Err(Error::Backend(
                "a render session is already active on this backend".to_string(),
            ));
        }
        if window.width == 0 || window.height == 0 {
            return Err(Error::Backend(format!(
                "window size must be non-zero, got {}x{}",
                window.width, window.height
            )));
        }
        if window.visible {
            log::warn!("software backend renders offscreen, ignoring visible window request");
        }

        self.session = Some(Session {
            window: *window,
            settings: RenderSettings::default(),
            camera: None,
            mesh: None,
        });
        Ok(())
    }

    fn add_geometry(&mut self, mesh: &TriangleMesh) -> Result<()> {
        let session = self.session_mut()?;
        if session.mesh.is_some() {
            return Err(Error::Backend("geometry already registered".to_string()));
        }
        session.mesh = Some(mesh.clone());
        Ok(())
    }

    fn settings_mut(&mut self) -> Result<&mut RenderSettings> {
        Ok(&mut self.session_mut()?.settings)
    }

    fn set_camera(&mut self, params: &CameraParams) -> Result<()> {
        self.session_mut()?.camera = Some(*params);
        Ok(())
    }

    fn update_geometry(&mut self, mesh: &TriangleMesh) -> Result<()> {
        let session = self.session_mut()?;
        match &mut session.mesh {
            Some(registered) => {
                registered.clone_from(mesh);
                Ok(())
            }
            None => Err(Error::Backend("update before geometry was added".to_string())),
        }
    }

    fn capture_image(&mut self, path: &Path) -> Result<()> {
        let image = self.render_frame()?;
        image
            .save(path)
            .map_err(|e| Error::Backend(format!("failed to write {}: {}", path.display(), e)))
    }

    fn destroy_session(&mut self) {
        self.session = None;
    }

    fn has_session(&self) -> bool {
        self.session.is_some()
    }
}

/// A vertex after projection
#[derive(Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    /// Normalized device depth in [-1, 1]
    depth: f32,
    /// 1 / clip w, for perspective-correct interpolation
    inv_w: f32,
}

struct FrameBuffer {
    color: RgbImage,
    depth: Vec<f32>,
}

impl FrameBuffer {
    fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            color: RgbImage::from_pixel(width, height, to_rgb(background)),
            depth: vec![f32::INFINITY; (width * height) as usize],
        }
    }

    fn width(&self) -> u32 {
        self.color.width()
    }

    fn height(&self) -> u32 {
        self.color.height()
    }

    fn project(&self, view_proj: &Matrix4<f32>, p: &Point3f) -> Option<ScreenVertex> {
        let clip: Vector4<f32> = view_proj * p.to_homogeneous();
        if clip.w <= f32::EPSILON || clip.z < -clip.w {
            return None;
        }
        let inv_w = 1.0 / clip.w;
        Some(ScreenVertex {
            x: (clip.x * inv_w + 1.0) * 0.5 * self.width() as f32,
            y: (1.0 - clip.y * inv_w) * 0.5 * self.height() as f32,
            depth: clip.z * inv_w,
            inv_w,
        })
    }

    fn draw_mesh(&mut self, mesh: &TriangleMesh, camera: &Camera, settings: &RenderSettings) {
        let view_proj = camera.view_projection();
        let to_camera = -camera.forward();

        let projected: Vec<Option<ScreenVertex>> = mesh
            .vertices
            .iter()
            .map(|p| self.project(&view_proj, p))
            .collect();
        let face_normals = mesh.calculate_face_normals();

        let mut drawn = Vec::with_capacity(mesh.faces.len());
        for (face_index, face) in mesh.faces.iter().enumerate() {
            let (Some(a), Some(b), Some(c)) = (projected[face[0]], projected[face[1]], projected[face[2]]) else {
                continue;
            };
            let screen = [a, b, c];

            // Screen y points down, so counter-clockwise faces have negative area
            let area = edge(&screen[0], &screen[1], screen[2].x, screen[2].y);
            let front_facing = area < 0.0;
            if area == 0.0 || (!front_facing && !settings.show_back_face) {
                continue;
            }

            let shader = FaceShader {
                mesh,
                face,
                face_normal: face_normals[face_index],
                flip: !front_facing,
                to_camera,
                settings,
            };
            self.fill_triangle(&screen, area, &shader);
            drawn.push(screen);
        }

        if settings.show_wireframe {
            let color = to_rgb(settings.wireframe_color);
            for screen in &drawn {
                for i in 0..3 {
                    self.draw_line(&screen[i], &screen[(i + 1) % 3], color);
                }
            }
        }
    }

    fn fill_triangle(&mut self, v: &[ScreenVertex; 3], area: f32, shader: &FaceShader<'_>) {
        let (min_x, max_x) = span(v.iter().map(|p| p.x), self.width());
        let (min_y, max_y) = span(v.iter().map(|p| p.y), self.height());

        for py in min_y..max_y {
            for px in min_x..max_x {
                let (sx, sy) = (px as f32 + 0.5, py as f32 + 0.5);
                let w0 = edge(&v[1], &v[2], sx, sy) / area;
                let w1 = edge(&v[2], &v[0], sx, sy) / area;
                let w2 = edge(&v[0], &v[1], sx, sy) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v[0].depth + w1 * v[1].depth + w2 * v[2].depth;
                let idx = (py * self.width() + px) as usize;
                if depth >= self.depth[idx] {
                    continue;
                }

                let pw = [w0 * v[0].inv_w, w1 * v[1].inv_w, w2 * v[2].inv_w];
                let total = pw[0] + pw[1] + pw[2];
                let weights = [pw[0] / total, pw[1] / total, pw[2] / total];

                self.depth[idx] = depth;
                self.color.put_pixel(px, py, to_rgb(shader.shade(weights)));
            }
        }
    }

    fn draw_line(&mut self, a: &ScreenVertex, b: &ScreenVertex, color: Rgb<u8>) {
        let steps = (b.x - a.x).abs().max((b.y - a.y).abs()).ceil().max(1.0) as usize;

        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = a.x + (b.x - a.x) * t;
            let y = a.y + (b.y - a.y) * t;
            if x < 0.0 || y < 0.0 || x >= self.width() as f32 || y >= self.height() as f32 {
                continue;
            }

            let (px, py) = (x as u32, y as u32);
            let idx = (py * self.width() + px) as usize;
            let depth = a.depth + (b.depth - a.depth) * t;
            if depth <= self.depth[idx] + WIREFRAME_DEPTH_BIAS {
                self.depth[idx] = self.depth[idx].min(depth);
                self.color.put_pixel(px, py, color);
            }
        }
    }
}

/// Per-face inputs for computing pixel colors
struct FaceShader<'a> {
    mesh: &'a TriangleMesh,
    face: &'a [usize; 3],
    face_normal: Vector3f,
    /// Back faces are lit as if they faced the camera
    flip: bool,
    to_camera: Vector3f,
    settings: &'a RenderSettings,
}

impl FaceShader<'_> {
    fn base_color(&self, weights: [f32; 3]) -> Color {
        match &self.mesh.colors {
            Some(colors) => {
                let mut out = [0.0; 3];
                for (corner, w) in self.face.iter().zip(weights) {
                    for (o, c) in out.iter_mut().zip(colors[*corner]) {
                        *o += w * c as f32 / 255.0;
                    }
                }
                out
            }
            None => self.settings.mesh_color,
        }
    }

    fn normal(&self, weights: [f32; 3]) -> Vector3f {
        let interpolated = self.mesh.normals.as_ref().and_then(|normals| {
            self.face
                .iter()
                .zip(weights)
                .map(|(corner, w)| normals[*corner] * w)
                .sum::<Vector3f>()
                .try_normalize(f32::EPSILON)
        });
        let n = interpolated.unwrap_or(self.face_normal);
        if self.flip {
            -n
        } else {
            n
        }
    }

    fn shade(&self, weights: [f32; 3]) -> Color {
        let base = self.base_color(weights);
        match self.settings.shading {
            Shading::Flat => base,
            Shading::Smooth => {
                let light = self.normal(weights).dot(&self.to_camera).max(AMBIENT);
                base.map(|c| c * light)
            }
        }
    }
}

/// Signed doubled area of (a, b, p)
fn edge(a: &ScreenVertex, b: &ScreenVertex, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

/// Pixel range covered by the coordinates, clamped to `[0, limit)`
fn span(coords: impl Iterator<Item = f32>, limit: u32) -> (u32, u32) {
    let (lo, hi) = coords.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), c| (lo.min(c), hi.max(c)));
    let lo = lo.floor().max(0.0).min(limit as f32) as u32;
    let hi = (hi.ceil() + 1.0).max(0.0).min(limit as f32) as u32;
    (lo, hi)
}

fn to_rgb(color: Color) -> Rgb<u8> {
    Rgb(color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraRig;
    use crate::options::{RenderOption, RenderOptionSet};
    use multiview_core::Drawable;

    fn session_with(backend: &mut SoftwareBackend, mesh: &TriangleMesh, options: &RenderOptionSet) {
        backend.create_session(&WindowConfig::new(64, 64, false)).unwrap();
        backend.add_geometry(mesh).unwrap();
        options.apply(backend.settings_mut().unwrap());
        backend.set_camera(&CameraRig::compute(&mesh.bounding_box())).unwrap();
    }

    fn facing_away_triangle() -> TriangleMesh {
        let mut mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(-1.0, -1.0, 0.0),
                Point3f::new(1.0, -1.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        mesh.compute_vertex_normals();
        mesh
    }

    #[test]
    fn test_calls_without_session_fail() {
        let mut backend = SoftwareBackend::new();
        let mesh = TriangleMesh::cube(1.0);

        assert!(matches!(backend.add_geometry(&mesh), Err(Error::Backend(_))));
        assert!(backend.settings_mut().is_err());
        assert!(backend.render_frame().is_err());
        // Destroying nothing is fine
        backend.destroy_session();
        assert!(!backend.has_session());
    }

    #[test]
    fn test_second_session_is_refused() {
        let mut backend = SoftwareBackend::new();
        let window = WindowConfig::new(8, 8, false);

        backend.create_session(&window).unwrap();
        assert!(matches!(backend.create_session(&window), Err(Error::Backend(_))));
        backend.destroy_session();
        assert!(backend.create_session(&window).is_ok());
    }

    #[test]
    fn test_zero_sized_window_is_refused() {
        let mut backend = SoftwareBackend::new();
        assert!(backend.create_session(&WindowConfig::new(0, 16, false)).is_err());
        assert!(!backend.has_session());
    }

    #[test]
    fn test_default_options_render_flat_cube_on_white() {
        let mut backend = SoftwareBackend::new();
        let mut mesh = TriangleMesh::cube(2.0);
        mesh.compute_vertex_normals();
        session_with(&mut backend, &mesh, &RenderOptionSet::Defaults);

        let frame = backend.render_frame().unwrap();
        assert_eq!(frame.dimensions(), (64, 64));
        assert_eq!(*frame.get_pixel(0, 0), Rgb([255, 255, 255]));
        // Off the diagonal of the facing square, away from wireframe edges
        assert_eq!(*frame.get_pixel(39, 30), to_rgb(RenderSettings::default().mesh_color));
    }

    #[test]
    fn test_back_faces_follow_settings() {
        let mesh = facing_away_triangle();

        let mut culled = SoftwareBackend::new();
        session_with(
            &mut culled,
            &mesh,
            &RenderOptionSet::Overrides(vec![RenderOption::ShowBackFace(false)]),
        );
        let frame = culled.render_frame().unwrap();
        assert_eq!(*frame.get_pixel(32, 32), to_rgb(RenderSettings::default().background));

        let mut shown = SoftwareBackend::new();
        session_with(
            &mut shown,
            &mesh,
            &RenderOptionSet::Overrides(vec![RenderOption::ShowBackFace(true)]),
        );
        let frame = shown.render_frame().unwrap();
        assert_ne!(*frame.get_pixel(32, 32), to_rgb(RenderSettings::default().background));
    }

    #[test]
    fn test_degenerate_camera_renders_background() {
        let mut backend = SoftwareBackend::new();
        let point = Point3f::new(1.0, 1.0, 1.0);
        let mesh = TriangleMesh::from_vertices_and_faces(vec![point; 3], vec![[0, 1, 2]]);
        session_with(&mut backend, &mesh, &RenderOptionSet::Defaults);

        let frame = backend.render_frame().unwrap();
        assert!(frame.pixels().all(|p| *p == Rgb([255, 255, 255])));
    }

    #[test]
    fn test_capture_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        let mut backend = SoftwareBackend::new();
        session_with(&mut backend, &TriangleMesh::cube(1.0), &RenderOptionSet::Defaults);
        backend.capture_image(&path).unwrap();

        let image = image::open(&path).unwrap();
        assert_eq!((image.width(), image.height()), (64, 64));
    }

    #[test]
    fn test_capture_into_missing_folder_is_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("frame.png");

        let mut backend = SoftwareBackend::new();
        session_with(&mut backend, &TriangleMesh::cube(1.0), &RenderOptionSet::Defaults);
        assert!(matches!(backend.capture_image(&path), Err(Error::Backend(_))));
    }
}
