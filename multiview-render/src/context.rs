//! Scoped ownership of a backend session

use crate::backend::{RenderBackend, WindowConfig};
use multiview_core::Result;
use std::ops::{Deref, DerefMut};

/// A live backend session, destroyed when the guard is dropped.
///
/// The guard holds the backend's only mutable borrow, so a second session
/// cannot be opened on the same backend while this one is alive. Dropping
/// runs on every exit path (normal return, `?` propagation or unwinding) and
/// destroys the session exactly once.
pub struct RenderContext<'b, B: RenderBackend + ?Sized> {
    backend: &'b mut B,
    window: WindowConfig,
}

impl<'b, B: RenderBackend + ?Sized> RenderContext<'b, B> {
    /// Create a session; if creation fails there is nothing to release
    pub fn acquire(backend: &'b mut B, window: &WindowConfig) -> Result<Self> {
        backend.create_session(window)?;
        log::debug!(
            "render context acquired ({}x{}, visible: {})",
            window.width,
            window.height,
            window.visible
        );
        Ok(Self {
            backend,
            window: *window,
        })
    }

    pub fn window(&self) -> &WindowConfig {
        &self.window
    }

    /// Destroy the session now instead of at scope exit
    pub fn release(self) {
        drop(self)
    }
}

impl<B: RenderBackend + ?Sized> Deref for RenderContext<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.backend
    }
}

impl<B: RenderBackend + ?Sized> DerefMut for RenderContext<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.backend
    }
}

impl<B: RenderBackend + ?Sized> Drop for RenderContext<'_, B> {
    fn drop(&mut self) {
        self.backend.destroy_session();
        log::debug!("render context released");
    }
}
