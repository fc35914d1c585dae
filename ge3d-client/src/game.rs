//! The game loop.
//!
//! [`Game`] owns the window, the shader programs, the camera, the directional light and
//! the world list, and drives them through update, render and event polling once per
//! frame until a close is requested.

use std::{cell::RefCell, path::Path, rc::Rc, time::Instant};

use ge3d_core::{
    binding::BindingPointPool,
    camera::{Camera, Controls},
    config::EngineConfig,
    input::{Action, InputEvent, InputState, Key},
    light::{DirectionalLight, LightColor, OrthographicFrustum},
};
use glam::{Mat3, Mat4, Vec3};
use glow::HasContext;
use sdl2::event::{Event, WindowEvent};

use crate::{
    abs::{App, UniformBuffer},
    error::Result,
    input::translate,
    render::{MATRICES_BLOCK, MATRICES_BLOCK_SIZE, Shaders, lighting, skybox::Skybox},
    resources::Resources,
    scene::WorldObject,
};

/// Lifecycle of a [`Game`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    /// Nothing has been created yet.
    Uninitialized,
    /// Window, context and GPU resources exist.
    Initialized,
    Running,
    Terminated,
}

/// Shared handle to an object in the world list.
pub type WorldHandle = Rc<RefCell<dyn WorldObject>>;

/// Field order is drop order: scene objects release their GPU data before the shaders,
/// and everything goes before the window and context in `app`.
pub struct Game {
    world: Vec<WorldHandle>,
    skybox: Option<Skybox>,
    matrices: UniformBuffer,
    shaders: Shaders,
    resources: Resources,
    camera: Camera,
    directional_light: DirectionalLight,
    input: InputState,
    config: EngineConfig,
    state: GameState,
    should_close: bool,
    app: App,
}

impl Game {
    /// Creates the window and every resource the loop needs.
    pub fn new(config: EngineConfig) -> Result<Self> {
        log::info!("Game state: {:?}", GameState::Uninitialized);
        let app = App::new(&config.window, &config.gl)?;
        let (width, height) = app.framebuffer_size();
        unsafe {
            app.gl.viewport(0, 0, width as i32, height as i32);
            app.gl.enable(glow::DEPTH_TEST);
            app.gl.depth_func(glow::LESS);
        }

        let shaders = Shaders::new(&app.gl)?;
        let binding_points = Rc::new(RefCell::new(BindingPointPool::new()));
        let matrices = UniformBuffer::new(&app.gl, MATRICES_BLOCK_SIZE, &binding_points)?;
        for shader in shaders.all() {
            matrices.bind_to(shader, MATRICES_BLOCK);
        }

        let camera = Camera::new(
            config.camera.controls,
            config.camera.max_fov,
            width as f32 / height.max(1) as f32,
            config.camera.near,
            config.camera.far,
        );

        let mut directional_light =
            DirectionalLight::new(LightColor::default(), OrthographicFrustum::default());
        directional_light
            .model
            .set_position(Vec3::new(-10.0, 10.0, 10.0))
            .set_look_at_point(Vec3::ZERO);

        let resources = Resources::new(&app.gl);

        let game = Self {
            world: Vec::new(),
            skybox: None,
            matrices,
            shaders,
            resources,
            camera,
            directional_light,
            input: InputState::default(),
            config,
            state: GameState::Initialized,
            should_close: false,
            app,
        };
        log::info!("Game state: {:?}", game.state);
        Ok(game)
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    fn set_state(&mut self, state: GameState) {
        log::info!("Game state: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn directional_light(&self) -> &DirectionalLight {
        &self.directional_light
    }

    pub fn directional_light_mut(&mut self) -> &mut DirectionalLight {
        &mut self.directional_light
    }

    pub fn set_skybox(&mut self, skybox: Option<Skybox>) {
        self.skybox = skybox;
    }

    /// Loads and sets the skybox stored under the configured skybox directory.
    pub fn load_skybox(&mut self, name: impl AsRef<Path>) -> Result<()> {
        let directory = self.config.paths.resolve_skybox(name);
        self.skybox = Some(Skybox::new(&self.app.gl, &directory)?);
        Ok(())
    }

    pub fn add_to_world(&mut self, object: WorldHandle) {
        self.world.push(object);
    }

    /// Adds `object` to the world and returns a handle for mutating it later.
    pub fn spawn<T: WorldObject + 'static>(&mut self, object: T) -> Rc<RefCell<T>> {
        let object = Rc::new(RefCell::new(object));
        self.world.push(object.clone());
        object
    }

    /// Removes an object from the world list. Returns whether it was there.
    pub fn remove_from_world(&mut self, object: &WorldHandle) -> bool {
        let before = self.world.len();
        self.world.retain(|other| !Rc::ptr_eq(other, object));
        self.world.len() != before
    }

    pub fn world(&self) -> &[WorldHandle] {
        &self.world
    }

    /// Makes the loop stop after the current frame.
    pub fn request_close(&mut self) {
        self.should_close = true;
    }

    /// Runs the loop until a close is requested.
    pub fn run(&mut self) {
        self.set_state(GameState::Running);
        let mut last_frame_time = Instant::now();

        while !self.should_close {
            let now = Instant::now();
            let delta_time = now.duration_since(last_frame_time).as_secs_f32();
            last_frame_time = now;

            self.update(delta_time);
            self.render();
            self.app.swap_buffers();
            self.poll_events();
        }

        self.set_state(GameState::Terminated);
    }

    fn update(&mut self, delta_time: f32) {
        self.camera.update(delta_time);
        for object in &self.world {
            object.borrow_mut().update(delta_time);
        }
    }

    fn upload_matrices(&self, view: Mat4, projection: Mat4) {
        self.matrices
            .buffer_sub_data(0, bytemuck::bytes_of(&view))
            .buffer_sub_data(std::mem::size_of::<Mat4>(), bytemuck::bytes_of(&projection));
    }

    fn render(&self) {
        let gl = &self.app.gl;
        unsafe {
            gl.clear_color(0.1, 0.1, 0.1, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        let view = self.camera.view_matrix();
        let projection = self.camera.projection_matrix();
        self.upload_matrices(view, projection);

        for shader in self.shaders.lit() {
            shader
                .use_program()
                .set_uniform("viewPosition", self.camera.model().position());
            lighting::apply_directional_light(shader, &self.directional_light);
        }

        for object in &self.world {
            object.borrow_mut().render(&self.shaders);
        }

        if let Some(skybox) = &self.skybox {
            unsafe {
                self.app.gl.depth_func(glow::LEQUAL);
            }
            self.upload_matrices(Mat4::from_mat3(Mat3::from_mat4(view)), projection);
            self.shaders.skybox.use_program();
            skybox.render(&self.shaders.skybox);
            unsafe {
                self.app.gl.depth_func(glow::LESS);
            }
        }
    }

    fn poll_events(&mut self) {
        let events: Vec<Event> = self.app.event_pump.poll_iter().collect();
        for event in events {
            match event {
                Event::Quit { .. } => self.should_close = true,
                Event::Window {
                    win_event: WindowEvent::SizeChanged(..),
                    ..
                } => {
                    let (width, height) = self.app.framebuffer_size();
                    self.dispatch(InputEvent::Resize { width, height });
                }
                _ => {
                    let relative = self.config.window.capture_cursor;
                    if let Some(input) = translate(&event, &self.input, relative) {
                        self.dispatch(input);
                    }
                }
            }
        }
    }

    /// Updates the input state, handles engine bindings and forwards the event to the
    /// camera and then every world object.
    fn dispatch(&mut self, event: InputEvent) {
        self.input.apply(&event);

        match event {
            InputEvent::Key {
                key: Key::Escape,
                action: Action::Press,
            } => self.should_close = true,
            InputEvent::Resize { width, height } => unsafe {
                self.app.gl.viewport(0, 0, width as i32, height as i32);
            },
            InputEvent::MouseButton { action, .. }
                if self.camera.controls() == Controls::Navigator
                    && !self.config.window.capture_cursor =>
            {
                self.app.set_cursor_visible(action == Action::Release);
            }
            _ => {}
        }

        self.camera.handle_input(&event, &self.input);
        for object in &self.world {
            object.borrow_mut().handle_input(&event, &self.input);
        }
    }
}
