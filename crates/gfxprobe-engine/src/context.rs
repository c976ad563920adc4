//! Lazily created, shared offscreen rendering context.
//!
//! The runtime moves through `Uninitialized -> DisplayBound -> Ready(version)`
//! and is never torn down. A failed attempt leaves whatever stage was already
//! reached in place, so the next call resumes from there.

use std::sync::Arc;

use gfxprobe_core::{GlesVersion, ProbeError};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::backend::{
    ConfigHandle, ConfigRequest, ContextHandle, DisplayHandle, GraphicsBackend, SurfaceHandle,
};

/// Surface, context and config produced together by one successful attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoundContext {
    surface: SurfaceHandle,
    context: ContextHandle,
    config: ConfigHandle,
    version: GlesVersion,
}

#[derive(Debug, Default)]
struct GraphicsRuntime {
    display: Option<DisplayHandle>,
    bound: Option<BoundContext>,
}

/// Lifecycle stage of the shared runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    Uninitialized,
    DisplayBound,
    Ready(GlesVersion),
}

impl RuntimeState {
    pub fn version(self) -> Option<GlesVersion> {
        match self {
            RuntimeState::Ready(version) => Some(version),
            _ => None,
        }
    }
}

/// Handles of the current context, copied out for queries that need them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveContext {
    pub display: DisplayHandle,
    pub config: ConfigHandle,
    pub version: GlesVersion,
}

pub struct ContextManager<B: GraphicsBackend> {
    backend: Arc<B>,
    runtime: Mutex<GraphicsRuntime>,
}

impl<B: GraphicsBackend> ContextManager<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            runtime: Mutex::new(GraphicsRuntime::default()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> RuntimeState {
        let runtime = self.runtime.lock();
        match (runtime.display, runtime.bound) {
            (_, Some(bound)) => RuntimeState::Ready(bound.version),
            (Some(_), None) => RuntimeState::DisplayBound,
            (None, None) => RuntimeState::Uninitialized,
        }
    }

    /// Make sure a context exists and is current on this thread.
    pub fn ensure_context(&self) -> bool {
        self.acquire().is_some()
    }

    /// Like [`ContextManager::ensure_context`], returning the active handles.
    pub fn acquire(&self) -> Option<ActiveContext> {
        match self.try_acquire() {
            Ok(active) => Some(active),
            Err(e @ ProbeError::EnvironmentUnavailable(_)) => {
                error!("context unavailable: {}", e);
                None
            }
            Err(e) => {
                warn!("context unavailable: {}", e);
                None
            }
        }
    }

    fn try_acquire(&self) -> Result<ActiveContext, ProbeError> {
        let mut runtime = self.runtime.lock();

        let display = match runtime.display {
            Some(display) => display,
            None => {
                let display = self.bind_display()?;
                runtime.display = Some(display);
                display
            }
        };

        let bound = match runtime.bound {
            Some(bound) => bound,
            None => {
                let bound = self.create_with_fallback(display)?;
                runtime.bound = Some(bound);
                bound
            }
        };

        // A failed make-current leaves the runtime intact for the next caller.
        if !self
            .backend
            .make_current(display, bound.surface, bound.context)
        {
            return Err(ProbeError::DriverRejected {
                operation: "make-current",
                version: bound.version,
            });
        }

        Ok(ActiveContext {
            display,
            config: bound.config,
            version: bound.version,
        })
    }

    fn bind_display(&self) -> Result<DisplayHandle, ProbeError> {
        let display = self.backend.default_display().ok_or_else(|| {
            ProbeError::EnvironmentUnavailable("no default display".to_string())
        })?;
        let (major, minor) = self.backend.initialize(display).ok_or_else(|| {
            ProbeError::EnvironmentUnavailable("display initialization failed".to_string())
        })?;
        info!("EGL {}.{} display initialized", major, minor);
        Ok(display)
    }

    fn create_with_fallback(&self, display: DisplayHandle) -> Result<BoundContext, ProbeError> {
        let mut last_err = None;
        for version in GlesVersion::FALLBACK_ORDER {
            match self.create_context(display, version) {
                Ok(bound) => {
                    info!("created offscreen {} context", version);
                    return Ok(bound);
                }
                Err(e) => {
                    warn!("{} context creation failed: {}", version, e);
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            ProbeError::EnvironmentUnavailable("no context versions to try".to_string())
        }))
    }

    fn create_context(
        &self,
        display: DisplayHandle,
        version: GlesVersion,
    ) -> Result<BoundContext, ProbeError> {
        if !self.backend.bind_gles_api() {
            debug!("eglBindAPI(OPENGL_ES) failed, continuing");
        }

        let config = self
            .backend
            .choose_config(display, &ConfigRequest::for_version(version))
            .ok_or(ProbeError::Negotiation { version })?;

        let surface = self
            .backend
            .create_pbuffer_surface(display, config)
            .ok_or(ProbeError::DriverRejected {
                operation: "pbuffer surface creation",
                version,
            })?;

        let Some(context) = self.backend.create_context(display, config, version) else {
            self.backend.destroy_surface(display, surface);
            return Err(ProbeError::DriverRejected {
                operation: "context creation",
                version,
            });
        };

        Ok(BoundContext {
            surface,
            context,
            config,
            version,
        })
    }
}
