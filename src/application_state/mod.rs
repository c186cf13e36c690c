//! # Application State Management
//!
//! This module connects the engine to a window, including:
//! - Window creation and lifecycle events
//! - Input handling
//! - Pausing when focus is lost or Escape is pressed
//! - Driving one engine frame per redraw

pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use input_manager::InputManager;
use log::{error, info};

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::engine_state::render::RenderSink;
use crate::engine_state::{EngineState, FrameReport};

const WINDOW_TITLE: &str = "Voxel World";

/// The main application state container that manages the application's lifecycle.
///
/// This struct holds the engine, the renderer it submits to, input handling and the window.
/// It implements `ApplicationHandler` to handle window and device events.
pub struct ApplicationState<R: RenderSink> {
    /// The core engine state and logic
    pub engine_state: EngineState,

    /// Receives voxel deltas and the camera every frame
    pub renderer: R,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    /// Handle to the application window, once one has been created
    pub window: Option<Arc<Window>>,
}

impl<R: RenderSink> ApplicationState<R> {
    pub fn new(engine_state: EngineState, renderer: R) -> Self {
        Self {
            engine_state,
            renderer,
            input_manager: InputManager::new(),
            window: None,
        }
    }

    /// Hands the input gathered since the last redraw to the engine and runs one frame.
    pub fn redraw(&mut self) -> FrameReport {
        let input = self.input_manager.get_and_reset_processed_input();
        self.engine_state.set_input_commands(input);
        self.engine_state.frame(&mut self.renderer)
    }

    /// Pauses or resumes the session. Held keys are released either way.
    pub fn toggle_pause(&mut self) {
        let paused = !self.engine_state.is_paused();
        self.input_manager.release_all();
        self.engine_state.set_paused(paused);
    }

    /// Pauses the session and drops any held input.
    pub fn lose_focus(&mut self) {
        self.input_manager.release_all();
        self.engine_state.set_paused(true);
    }

    /// Ends the session.
    pub fn close(&mut self) {
        self.engine_state.shutdown();
    }
}

impl<R: RenderSink> ApplicationHandler for ApplicationState<R> {
    /// Handles window events such as input and redraw requests.
    ///
    /// # Arguments
    /// * `event_loop` - The active event loop
    /// * `_window_id` - The ID of the window that received the event
    /// * `event` - The window event to handle
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        self.input_manager.intake_input(&event);

        match event {
            WindowEvent::Focused(false) => self.lose_focus(),
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            WindowEvent::CloseRequested => {
                self.close();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        repeat: false,
                        ..
                    },
                ..
            } => self.toggle_pause(),
            _ => {}
        }
    }

    /// Handles device events such as raw mouse motion.
    ///
    /// # Arguments
    /// * `_event_loop` - The active event loop
    /// * `_device_id` - The ID of the device that generated the event
    /// * `event` - The device event to handle
    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.engine_state.is_active() {
                self.input_manager.intake_mouse_motion(delta);
            }
        }
    }

    /// Creates the window the first time the application is resumed.
    ///
    /// # Arguments
    /// * `event_loop` - The active event loop
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match event_loop.create_window(Window::default_attributes().with_title(WINDOW_TITLE)) {
            Ok(window) => {
                info!("Window created");
                self.window = Some(Arc::new(window));
            }
            Err(e) => {
                error!("Failed to create window: {}", e);
                self.close();
                event_loop.exit();
            }
        }
    }

    /// Requests the next redraw once pending events have been handled.
    ///
    /// # Arguments
    /// * `event_loop` - The active event loop
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.engine_state.is_running() {
            event_loop.exit();
            return;
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine_state::render::HeadlessRenderSink;
    use crate::engine_state::sync::memory_store::InMemoryRemoteStore;
    use crate::engine_state::voxels::terrain::{WorldDescriptor, WorldType};
    use winit::event::MouseButton;

    fn application() -> ApplicationState<HeadlessRenderSink> {
        let config = EngineConfig {
            world_half_extent: 2,
            ..EngineConfig::default()
        };
        let engine = EngineState::new(
            WorldDescriptor {
                seed: 1,
                world_type: WorldType::SUPERFLAT,
            },
            "worlds/app",
            Box::new(InMemoryRemoteStore::new()),
            config,
        )
        .expect("engine should start");
        ApplicationState::new(engine, HeadlessRenderSink::default())
    }

    #[test]
    fn redraw_renders_a_frame() {
        let mut app = application();

        app.redraw();

        assert_eq!(app.renderer.visible.len(), app.engine_state.world().len());
        assert!(app.renderer.camera.is_some());
    }

    #[test]
    fn toggle_pause_releases_held_input() {
        let mut app = application();
        app.input_manager.set_mouse_button(MouseButton::Left, true);

        app.toggle_pause();
        assert!(app.engine_state.is_paused());

        let input = app.input_manager.create_processed_input_state();
        assert!(!input.get_mouse_button_state(MouseButton::Left).is_active());

        app.toggle_pause();
        assert!(!app.engine_state.is_paused());
    }

    #[test]
    fn losing_focus_pauses() {
        let mut app = application();
        app.lose_focus();
        assert!(app.engine_state.is_paused());
        assert!(app.engine_state.is_running());
    }

    #[test]
    fn close_stops_the_engine() {
        let mut app = application();
        app.close();
        assert!(!app.engine_state.is_running());
    }
}
