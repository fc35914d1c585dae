//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2
//! and OpenGL context necessary for creating a windowed application.

use std::sync::Arc;

use ge3d_core::config::{GlConfig, WindowConfig};
use glow::HasContext;

use crate::error::{EngineError, Result};

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
///
/// Field order is drop order: the GL wrapper goes before its context, the context
/// before the window.
pub struct App {
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
    pub gl_context: sdl2::video::GLContext,
    pub window: sdl2::video::Window,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub sdl: sdl2::Sdl,
}

impl App {
    /// Creates the window and a core profile context of the requested version.
    /// The width and height options are ignored if `fullscreen` is set.
    pub fn new(window_config: &WindowConfig, gl_config: &GlConfig) -> Result<Self> {
        let sdl = sdl2::init().map_err(EngineError::Window)?;
        let video_subsystem = sdl.video().map_err(EngineError::Window)?;
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(gl_config.major, gl_config.minor);

        let (width, height) = if window_config.fullscreen {
            let display_mode = video_subsystem
                .current_display_mode(0)
                .map_err(EngineError::Window)?;
            (display_mode.w as u32, display_mode.h as u32)
        } else {
            (window_config.width, window_config.height)
        };

        let mut window = video_subsystem
            .window(&window_config.title, width, height)
            .opengl()
            .resizable()
            .build()
            .map_err(|e| EngineError::Window(e.to_string()))?;
        if window_config.fullscreen {
            window
                .set_fullscreen(sdl2::video::FullscreenType::Desktop)
                .map_err(EngineError::Window)?;
        }

        let gl_context = window.gl_create_context().map_err(EngineError::Window)?;
        window
            .gl_make_current(&gl_context)
            .map_err(EngineError::Window)?;

        let swap_interval = if window_config.vsync {
            sdl2::video::SwapInterval::VSync
        } else {
            sdl2::video::SwapInterval::Immediate
        };
        if let Err(e) = video_subsystem.gl_set_swap_interval(swap_interval) {
            log::warn!("Could not set swap interval: {e}");
        }

        sdl.mouse()
            .set_relative_mouse_mode(window_config.capture_cursor);

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = sdl.event_pump().map_err(EngineError::Window)?;
        let gl = Arc::new(gl);

        let version = unsafe { gl.get_parameter_string(glow::VERSION) };
        log::info!("Created {width}x{height} window with OpenGL {version}");

        Ok(Self {
            gl,
            event_pump,
            gl_context,
            window,
            video_subsystem,
            sdl,
        })
    }

    /// Size of the default framebuffer in pixels.
    pub fn framebuffer_size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }

    pub fn swap_buffers(&self) {
        self.window.gl_swap_window();
    }

    pub fn set_cursor_visible(&self, visible: bool) {
        self.sdl.mouse().show_cursor(visible);
    }
}
