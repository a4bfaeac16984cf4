//! Caldera demo binary: builds the volcanic island scene and runs the
//! interactive frame loop.
//!
//! Controls: WASD + Space/X to fly, left-drag to look, right-drag to pan,
//! scroll to zoom, Enter to trigger the eruption, R to rewind, Escape/Q
//! to quit. An optional JSON config path is taken as the first argument.

use std::path::PathBuf;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowId};

use caldera::config::DemoConfig;
use caldera::core::camera::{FlyoutCamera, MoveDirection};
use caldera::core::input::InputState;
use caldera::core::time::{DayCycle, FrameTimer};
use caldera::core::types::{Mat4, Vec3, Vec4};
use caldera::core::{Error, logging};
use caldera::environment::{cloud_mesh, lava_mesh, water_mesh};
use caldera::particles::ParticleEmitter;
use caldera::render::{FrameContext, GpuContext, Renderer, Texture};
use caldera::scene::{Material, RenderCategory, Scene, SceneObject};
use caldera::terrain::noise::{CloudNoise, coordinate_hash};
use caldera::terrain::{HeightField, mesh::build_terrain};
use caldera::vegetation::{ExclusionRect, TreeParams, plant_forest};

struct App {
    config: DemoConfig,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    renderer: Option<Renderer>,
    scene: Option<Scene>,
    emitter: Option<ParticleEmitter>,
    camera: FlyoutCamera,
    input: InputState,
    timer: FrameTimer,
    cycle: DayCycle,
    eruption_start: Option<f32>,
}

impl App {
    fn new(config: DemoConfig) -> Self {
        let cycle = DayCycle::new(config.day_period);
        Self {
            camera: FlyoutCamera::new(Vec3::new(0.0, 40.0, 120.0)),
            window: None,
            gpu: None,
            renderer: None,
            scene: None,
            emitter: None,
            input: InputState::new(),
            timer: FrameTimer::new(),
            cycle,
            eruption_start: None,
            config,
        }
    }

    /// Build the island: terrain, forest, water/lava/cloud layers, and the
    /// particle emitter, then upload everything to the renderer.
    fn build_world(&mut self, gpu: &GpuContext) -> Result<(Renderer, Scene), Error> {
        let config = &self.config;
        let field = match &config.heightmap {
            Some(path) => HeightField::from_image(path, config.min_height, config.max_height)?,
            None => HeightField::from_fbm(
                config.terrain_width,
                config.terrain_depth,
                config.seed as u32,
                48.0,
                config.min_height,
                config.max_height,
            ),
        };
        let terrain = build_terrain(&field)?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let exclusion = ExclusionRect {
            half_width: config.exclusion_half_width,
            half_depth: config.exclusion_half_depth,
        };
        let (_, forest) = plant_forest(
            &mut rng,
            &terrain.positions,
            config.tree_count,
            config.water_height,
            &exclusion,
            &TreeParams::default(),
        );

        let map_w = field.width() as f32;
        let map_d = field.height() as f32;
        let water = water_mesh(map_w * 2.0, map_d * 2.0, config.water_height);
        let cloud = cloud_mesh(map_w * 2.0, map_d * 2.0, config.cloud_height);
        let lava = lava_mesh(10, config.lava_radius, config.lava_height);

        let mut renderer = Renderer::new(gpu, config);
        let mut scene = Scene::default();

        let cloud_map = CloudNoise::default().generate(coordinate_hash);
        let cloud_texture = Texture::from_field(&gpu.device, &gpu.queue, &cloud_map);
        let cloud_tex_index = renderer.add_texture(gpu, &cloud_texture);

        let mut push = |renderer: &mut Renderer,
                        name: &'static str,
                        mesh: &caldera::terrain::MeshData,
                        category: RenderCategory,
                        material: Material,
                        texture: Option<usize>| {
            if mesh.vertex_count() == 0 {
                return;
            }
            let index = renderer.add_mesh(gpu, name, mesh);
            scene.push(SceneObject {
                name,
                category,
                model: Mat4::IDENTITY,
                material,
                mesh: index,
                texture,
            });
        };

        push(
            &mut renderer,
            "terrain",
            &terrain,
            RenderCategory::Terrain,
            Material {
                tint: Vec4::new(0.45, 0.5, 0.3, 1.0),
                ..Default::default()
            },
            None,
        );
        let trunk_material = Material {
            tint: Vec4::new(0.35, 0.22, 0.12, 1.0),
            ..Default::default()
        };
        let pine_material = Material {
            tint: Vec4::new(0.1, 0.35, 0.15, 1.0),
            ..Default::default()
        };
        let oak_material = Material {
            tint: Vec4::new(0.2, 0.45, 0.15, 1.0),
            ..Default::default()
        };
        push(
            &mut renderer,
            "pine_trunks",
            &forest.pine_trunks,
            RenderCategory::Vegetation,
            trunk_material,
            None,
        );
        push(
            &mut renderer,
            "pine_crowns",
            &forest.pine_crowns,
            RenderCategory::Vegetation,
            pine_material,
            None,
        );
        push(
            &mut renderer,
            "oak_trunks",
            &forest.oak_trunks,
            RenderCategory::Vegetation,
            trunk_material,
            None,
        );
        push(
            &mut renderer,
            "oak_crowns",
            &forest.oak_crowns,
            RenderCategory::Vegetation,
            oak_material,
            None,
        );
        push(
            &mut renderer,
            "lava",
            &lava,
            RenderCategory::Lava,
            Material {
                tint: Vec4::new(0.9, 0.3, 0.05, 1.0),
                emissive: 1.0,
                receives_shadow: 0.0,
                ..Default::default()
            },
            None,
        );
        push(
            &mut renderer,
            "cloud",
            &cloud,
            RenderCategory::Cloud,
            Material {
                tint: Vec4::new(1.0, 1.0, 1.0, 0.8),
                receives_shadow: 0.0,
                uv_scroll: 1.0,
                ..Default::default()
            },
            Some(cloud_tex_index),
        );
        push(
            &mut renderer,
            "water",
            &water,
            RenderCategory::Water,
            Material {
                tint: Vec4::new(0.1, 0.3, 0.5, 0.9),
                ..Default::default()
            },
            None,
        );
        scene.push(SceneObject {
            name: "particles",
            category: RenderCategory::Particles,
            model: Mat4::IDENTITY,
            material: Material::default(),
            mesh: 0,
            texture: None,
        });

        renderer.prepare_scene(gpu, &scene);
        Ok((renderer, scene))
    }

    fn handle_camera_input(&mut self, delta: f32) {
        let prev = self.input.mouse_position_prev();
        let current = self.input.mouse_position();
        if self.input.is_mouse_button_pressed(MouseButton::Left) {
            self.camera.rotate(prev, current, delta);
        } else if self.input.is_mouse_button_pressed(MouseButton::Right) {
            self.camera.pan(prev, current);
        }
        let scroll = self.input.scroll_delta();
        if scroll != 0.0 {
            self.camera.zoom(scroll);
        }

        let bindings = [
            (KeyCode::KeyW, MoveDirection::Forward),
            (KeyCode::KeyS, MoveDirection::Backward),
            (KeyCode::KeyA, MoveDirection::Left),
            (KeyCode::KeyD, MoveDirection::Right),
            (KeyCode::Space, MoveDirection::Up),
            (KeyCode::KeyX, MoveDirection::Down),
        ];
        let mut moving = false;
        for (key, direction) in bindings {
            if self.input.is_key_pressed(key) {
                self.camera.move_keyboard(direction, delta);
                moving = true;
            }
        }
        if !moving {
            self.camera.stop_keyboard();
        }
    }

    fn redraw(&mut self) {
        self.timer.tick();
        let delta = self.timer.delta_secs();
        let elapsed = self.timer.elapsed_secs();

        self.handle_camera_input(delta);

        if self.input.is_key_just_pressed(KeyCode::Enter) && self.eruption_start.is_none() {
            log::info!("eruption triggered at t={:.1}s", elapsed);
            self.eruption_start = Some(elapsed);
        }
        if self.input.is_key_just_pressed(KeyCode::KeyR) {
            log::info!("rewinding the day");
            self.timer.reset();
            self.eruption_start = None;
        }

        let frame = FrameContext::build(&self.cycle, elapsed, delta, self.eruption_start);

        let (Some(gpu), Some(renderer), Some(scene), Some(emitter)) = (
            self.gpu.as_ref(),
            self.renderer.as_mut(),
            self.scene.as_ref(),
            self.emitter.as_mut(),
        ) else {
            return;
        };

        let batch = emitter.update(delta, self.camera.position, frame.erupting);
        if let Err(e) = renderer.render(
            gpu,
            scene,
            &mut self.camera,
            &frame,
            emitter.is_active(),
            &batch,
        ) {
            log::error!("frame dropped: {}", e);
        }

        self.input.end_frame();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("Caldera")
            .with_inner_size(PhysicalSize::new(1280, 720));
        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        let gpu =
            pollster::block_on(GpuContext::new(window.clone())).expect("Failed to create GPU context");

        let (renderer, scene) = self.build_world(&gpu).expect("Failed to build the island");
        log::info!("scene built: {} objects", scene.objects.len());

        self.emitter = Some(ParticleEmitter::new(ChaCha8Rng::seed_from_u64(
            self.config.seed ^ 0x70a9,
        )));
        self.window = Some(window);
        self.gpu = Some(gpu);
        self.renderer = Some(renderer);
        self.scene = Some(scene);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.process_event(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let (Some(gpu), Some(renderer)) = (self.gpu.as_mut(), self.renderer.as_mut()) {
                    gpu.resize(size.width, size.height);
                    renderer.resize(gpu, size.width.max(1), size.height.max(1));
                }
            }
            WindowEvent::KeyboardInput { .. } => {
                if self.input.is_key_pressed(KeyCode::Escape)
                    || self.input.is_key_pressed(KeyCode::KeyQ)
                {
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    logging::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = match DemoConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("config error: {}", e);
            std::process::exit(1);
        }
    };
    log::info!(
        "Caldera starting: seed={}, {} trees requested",
        config.seed,
        config.tree_count,
    );

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    let mut app = App::new(config);
    event_loop.run_app(&mut app).expect("Event loop error");
}
