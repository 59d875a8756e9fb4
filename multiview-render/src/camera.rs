//! Camera placement derived from mesh bounds

use multiview_core::{BoundingBox, Point3f, Vector3f};
use nalgebra::{Matrix4, Perspective3};
use serde::{Deserialize, Serialize};

/// Where the backend camera looks from and at.
///
/// The camera sits at `look_at + front * distance` and faces `look_at`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraParams {
    pub look_at: Point3f,
    pub up: Vector3f,
    pub front: Vector3f,
    pub distance: f32,
}

impl CameraParams {
    /// Camera position implied by the parameters
    pub fn eye(&self) -> Point3f {
        self.look_at + self.front * self.distance
    }

    /// A zero distance puts the eye on the target and leaves the view undefined
    pub fn is_degenerate(&self) -> bool {
        !(self.distance > f32::EPSILON)
    }
}

/// Derives a [`CameraParams`] from a bounding box.
///
/// Up and front are fixed to `+Y` and `-Z`; meshes that need another
/// canonical view have to be rotated before the session starts.
pub struct CameraRig;

impl CameraRig {
    pub const UP: Vector3f = Vector3f::new(0.0, 1.0, 0.0);
    pub const FRONT: Vector3f = Vector3f::new(0.0, 0.0, -1.0);
    /// Distance as a multiple of the largest bounding-box extent
    pub const DISTANCE_FACTOR: f32 = 2.0;

    pub fn compute(bounds: &BoundingBox) -> CameraParams {
        let params = CameraParams {
            look_at: bounds.center(),
            up: Self::UP,
            front: Self::FRONT,
            distance: Self::DISTANCE_FACTOR * bounds.max_extent(),
        };

        if params.is_degenerate() {
            log::warn!(
                "bounding box {:?}..{:?} has zero extent, camera distance is {}",
                bounds.min,
                bounds.max,
                params.distance
            );
        }

        params
    }
}

/// A perspective camera for rasterizing meshes
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3f,
    pub target: Point3f,
    pub up: Vector3f,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Vertical field of view used for every rig-driven camera
    pub const FOV: f32 = std::f32::consts::FRAC_PI_3;

    /// Create a new camera
    pub fn new(
        position: Point3f,
        target: Point3f,
        up: Vector3f,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
        }
    }

    /// Build a camera treating `params.distance` as the eye-to-target distance.
    ///
    /// Returns `None` for degenerate parameters.
    pub fn from_params(params: &CameraParams, aspect_ratio: f32) -> Option<Self> {
        if params.is_degenerate() {
            return None;
        }

        Some(Self::new(
            params.eye(),
            params.look_at,
            params.up,
            Self::FOV,
            aspect_ratio,
            params.distance * 0.01,
            params.distance * 4.0,
        ))
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let perspective = Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far);
        perspective.into_inner()
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Unit vector from the camera towards its target
    pub fn forward(&self) -> Vector3f {
        (self.target - self.position).normalize()
    }
}
