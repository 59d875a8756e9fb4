//! Multi-view rendering of triangle meshes
//!
//! This crate turns a mesh file into a folder of images, one per viewpoint:
//! - Viewpoint sources (explicit lists or randomly generated rotations)
//! - Camera placement from mesh bounds
//! - Render option overlays
//! - A scoped backend session and the pipeline driving it
//! - A CPU software backend for headless rendering

pub mod backend;
pub mod camera;
pub mod config;
pub mod context;
pub mod options;
pub mod renderer;
pub mod software;
pub mod viewpoint;

pub use backend::*;
pub use camera::*;
pub use config::*;
pub use context::*;
pub use options::*;
pub use renderer::*;
pub use software::*;
pub use viewpoint::*;
