mod input;

pub use input::{InputAction, InputState, PALETTE};

use crate::assets::AssetError;
use crate::color::{Color, ColorError};
use crate::pick::PickSession;
use crate::render::{CameraController, Projection, Viewport};
use crate::scene::serialization::{load_scene_from_file, SceneDescription, SerializationError};

use glam::Vec3;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

const BASE_TITLE: &str = "meshtint";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to load scene {path}: {source}")]
    Scene {
        path: String,
        #[source]
        source: SerializationError,
    },
    #[error("invalid selected color: {0}")]
    Color(#[from] ColorError),
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Window host. Owns the picking session and forwards pointer and keyboard
/// events into it; drawing the meshes is left to whatever renderer shares
/// the scene.
pub struct App {
    window: Option<Arc<Window>>,
    session: PickSession,
    camera: CameraController,
    projection: Projection,
    input: InputState,
    mouse_pos: Option<(f32, f32)>,
    window_focused: bool,
    scene_path: Option<PathBuf>,
    last_hit: Option<String>,
}

impl App {
    fn new(scene_path: Option<PathBuf>) -> Result<Self, AppError> {
        let description = match &scene_path {
            Some(path) => read_description(path)?,
            None => SceneDescription::demo(),
        };
        let mut app = Self {
            window: None,
            session: PickSession::new(Color::RED),
            camera: CameraController::new(Vec3::new(0.0, 0.0, 5.0), 0.0, 0.0),
            projection: Projection::default(),
            input: InputState::default(),
            mouse_pos: None,
            window_focused: true,
            scene_path,
            last_hit: None,
        };
        app.apply_description(&description)?;
        Ok(app)
    }

    /// Replaces the scene with `description`. Models that fail to build are
    /// logged and skipped.
    fn apply_description(&mut self, description: &SceneDescription) -> Result<(), AppError> {
        let selected = Color::from_hex(&description.selected_color)?;
        self.session.clear();
        for model in &description.models {
            if let Err(err) = self.session.attach_model(model) {
                log_asset_error(&model.name, &err);
            }
        }
        self.session.set_selected_color(selected);
        self.last_hit = None;

        match &description.camera {
            Some(data) => {
                self.camera =
                    CameraController::look_at(Vec3::from(data.position), Vec3::from(data.target));
                self.projection = Projection {
                    fov_y_deg: data.fov_deg,
                    near: data.near,
                    far: data.far,
                };
            }
            None => {
                if let Some((center, extent)) = self.session.assets().bounds() {
                    self.camera =
                        CameraController::from_bounds(Vec3::from(center), Vec3::from(extent));
                }
            }
        }
        self.refresh_camera();
        log::info!(
            "Scene ready: {} model(s), {} pickable mesh(es), color {}",
            self.session.assets().loaded_assets().len(),
            self.session.registry().len(),
            selected
        );
        self.update_title();
        Ok(())
    }

    fn refresh_camera(&mut self) {
        if let Some(aspect) = self.session.viewport().aspect() {
            self.session
                .set_camera(self.camera.snapshot(&self.projection, aspect));
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        self.session
            .set_viewport(Viewport::new(new_size.width, new_size.height));
        self.refresh_camera();
    }

    fn handle_click(&mut self) {
        let Some((x, y)) = self.mouse_pos else {
            return;
        };
        if let Some(outcome) = self.session.handle_click(x, y) {
            self.last_hit = self.session.node_name(outcome.hit.node).map(str::to_string);
            self.update_title();
        }
    }

    fn handle_action(&mut self, action: InputAction, event_loop: &ActiveEventLoop) {
        match action {
            InputAction::SelectColor(color) => {
                self.session.set_selected_color(color);
                log::info!("Selected color {}", color);
                self.update_title();
            }
            InputAction::OpenScene => self.handle_open_scene_action(),
            InputAction::ReloadScene => self.handle_reload_scene_action(),
            InputAction::Quit => event_loop.exit(),
            InputAction::None => {}
        }
    }

    fn handle_open_scene_action(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Scene", &["json"])
            .pick_file()
        else {
            return;
        };
        self.load_scene_path(path);
    }

    fn handle_reload_scene_action(&mut self) {
        match self.scene_path.clone() {
            Some(path) => self.load_scene_path(path),
            None => {
                if let Err(err) = self.apply_description(&SceneDescription::demo()) {
                    log::warn!("Failed to reload demo scene: {}", err);
                }
            }
        }
    }

    fn load_scene_path(&mut self, path: PathBuf) {
        log::info!("Loading scene: {}", path.display());
        let previous_camera = self.camera;
        let result = read_description(&path).and_then(|description| {
            let framed = description.camera.is_none();
            self.apply_description(&description)?;
            Ok(framed)
        });
        match result {
            Ok(framed) => {
                if framed {
                    // Keep the user's viewing direction across scene loads.
                    self.camera = previous_camera;
                    if let Some((center, extent)) = self.session.assets().bounds() {
                        self.camera.frame_bounds_preserve_orientation(
                            Vec3::from(center),
                            Vec3::from(extent),
                        );
                    }
                    self.refresh_camera();
                }
                self.scene_path = Some(path);
            }
            Err(err) => log::warn!("{}", err),
        }
    }

    fn update_title(&self) {
        let Some(window) = &self.window else {
            return;
        };
        let mut title = format!("{} - color {}", BASE_TITLE, self.session.selected_color());
        if let Some(name) = &self.last_hit {
            title.push_str(&format!(" - painted {}", name));
        }
        window.set_title(&title);
    }
}

fn read_description(path: &Path) -> Result<SceneDescription, AppError> {
    load_scene_from_file(path).map_err(|source| AppError::Scene {
        path: path.display().to_string(),
        source,
    })
}

fn log_asset_error(model: &str, err: &AssetError) {
    log::warn!("Skipping model '{}': {}", model, err);
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title(BASE_TITLE)
            .with_inner_size(PhysicalSize::new(1280u32, 720u32))
            .with_resizable(true);

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };
        self.handle_resize(window.inner_size());
        self.window = Some(window);
        self.update_title();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Focused(focused) => {
                self.window_focused = focused;
                if !focused {
                    self.mouse_pos = None;
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;
                let action = self.input.handle_key(event.physical_key, pressed);
                self.handle_action(action, event_loop);
            }
            WindowEvent::Resized(new_size) => {
                self.handle_resize(new_size);
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.window_focused {
                    self.mouse_pos = Some((position.x as f32, position.y as f32));
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_pos = None;
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.handle_click();
            }
            _ => {}
        }
    }
}

/// Opens the window and blocks until it closes. Without a path the built-in
/// two-model scene is used.
pub fn run(scene_path: Option<PathBuf>) -> Result<(), AppError> {
    let mut app = App::new(scene_path)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);
    event_loop.run_app(&mut app)?;
    Ok(())
}
