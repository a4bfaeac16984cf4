//! Multi-pass frame orchestration: shadow, reflection, refraction, composite

use crate::config::DemoConfig;
use crate::core::camera::FlyoutCamera;
use crate::core::types::{Result, Vec4};
use crate::math::FrustumCorners;
use crate::particles::{MAX_PARTICLES, ParticleBatch};
use crate::render::context::GpuContext;
use crate::render::frame::{CLIP_NONE, FrameContext, Globals, ObjectUniforms};
use crate::render::mesh::{GpuMesh, ParticleMesh};
use crate::render::pipeline::{
    ParticlePipeline, ScenePipeline, ShadowPipeline, SharedLayouts, SkyPipeline, WaterPipeline,
};
use crate::render::shadow::ShadowFitter;
use crate::render::target::{
    MainDepth, OffscreenTarget, REFLECTION_SIZE, REFRACTION_SIZE, SHADOW_SIZE, ShadowTarget,
};
use crate::render::texture::Texture;
use crate::scene::{PassKind, RenderCategory, Scene};
use crate::terrain::MeshData;

/// Small overlap past the water plane so the clip seam never shows
const CLIP_BIAS: f32 = 0.5;

struct ObjectBinding {
    bind_group: wgpu::BindGroup,
    texture_bind_group_index: Option<usize>,
}

struct PassResources {
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
}

/// Owns all GPU resources and runs the four passes in strict order every
/// frame. Missing render targets are impossible by construction: everything
/// is created up front and creation failures abort startup.
pub struct Renderer {
    layouts: SharedLayouts,
    scene_pipeline: ScenePipeline,
    water_pipeline: WaterPipeline,
    particle_pipeline: ParticlePipeline,
    shadow_pipeline: ShadowPipeline,
    sky_pipeline: SkyPipeline,
    shadow_target: ShadowTarget,
    reflection: OffscreenTarget,
    refraction: OffscreenTarget,
    main_depth: MainDepth,
    pub fitter: ShadowFitter,
    passes: [PassResources; 4],
    shadow_map_bind_group: wgpu::BindGroup,
    water_targets_bind_group: wgpu::BindGroup,
    meshes: Vec<GpuMesh>,
    texture_bind_groups: Vec<wgpu::BindGroup>,
    white_bind_group: usize,
    objects: Vec<ObjectBinding>,
    particle_mesh: ParticleMesh,
    water_height: f32,
}

impl Renderer {
    pub fn new(gpu: &GpuContext, config: &DemoConfig) -> Self {
        let device = &gpu.device;
        let layouts = SharedLayouts::new(device);
        let scene_pipeline = ScenePipeline::new(device, &layouts, gpu.format());
        let water_pipeline = WaterPipeline::new(device, &layouts, gpu.format());
        let particle_pipeline = ParticlePipeline::new(device, &layouts, gpu.format());
        let shadow_pipeline = ShadowPipeline::new(device, &layouts, gpu.depth_clamp);
        let sky_pipeline = SkyPipeline::new(device, &layouts, gpu.format());

        let shadow_target = ShadowTarget::new(device);
        let reflection = OffscreenTarget::new(device, "reflection", REFLECTION_SIZE);
        let refraction = OffscreenTarget::new(device, "refraction", REFRACTION_SIZE);
        let (width, height) = gpu.size();
        let main_depth = MainDepth::new(device, width, height);

        let passes = std::array::from_fn(|_| {
            let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("pass_globals"),
                size: std::mem::size_of::<Globals>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("pass_globals_bind_group"),
                layout: &layouts.globals,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                }],
            });
            PassResources {
                globals_buffer,
                globals_bind_group,
            }
        });

        let shadow_map_bind_group = scene_pipeline.shadow_bind_group(device, &shadow_target);
        let water_targets_bind_group =
            water_pipeline.targets_bind_group(device, &reflection, &refraction);

        let white = Texture::white(device, &gpu.queue);
        let white_group = scene_pipeline.texture_bind_group(device, &white);

        Self {
            layouts,
            scene_pipeline,
            water_pipeline,
            particle_pipeline,
            shadow_pipeline,
            sky_pipeline,
            shadow_target,
            reflection,
            refraction,
            main_depth,
            fitter: ShadowFitter::new(config.shadow_offset, config.shadow_distance),
            passes,
            shadow_map_bind_group,
            water_targets_bind_group,
            meshes: Vec::new(),
            texture_bind_groups: vec![white_group],
            white_bind_group: 0,
            objects: Vec::new(),
            particle_mesh: ParticleMesh::new(device, MAX_PARTICLES),
            water_height: config.water_height,
        }
    }

    /// Upload a mesh; the returned index goes into `SceneObject::mesh`
    pub fn add_mesh(&mut self, gpu: &GpuContext, label: &str, mesh: &MeshData) -> usize {
        self.meshes.push(GpuMesh::upload(&gpu.device, label, mesh));
        self.meshes.len() - 1
    }

    /// Upload a texture; the returned index goes into `SceneObject::texture`
    pub fn add_texture(&mut self, gpu: &GpuContext, texture: &Texture) -> usize {
        self.texture_bind_groups
            .push(self.scene_pipeline.texture_bind_group(&gpu.device, texture));
        self.texture_bind_groups.len() - 1
    }

    /// Create per-object uniform buffers and bind groups for a built scene.
    /// Must be called once before the first `render`.
    pub fn prepare_scene(&mut self, gpu: &GpuContext, scene: &Scene) {
        self.objects = scene
            .objects
            .iter()
            .map(|object| {
                let uniforms = ObjectUniforms {
                    model: object.model.to_cols_array_2d(),
                    tint: object.material.tint.to_array(),
                    receives_shadow: object.material.receives_shadow,
                    emissive: object.material.emissive,
                    uv_scroll: object.material.uv_scroll,
                    _pad: 0.0,
                };
                let uniform_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(object.name),
                    size: std::mem::size_of::<ObjectUniforms>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                gpu.queue
                    .write_buffer(&uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
                let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(object.name),
                    layout: &self.layouts.object,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    }],
                });
                ObjectBinding {
                    bind_group,
                    texture_bind_group_index: object.texture.map(|t| t + 1),
                }
            })
            .collect();
    }

    pub fn resize(&mut self, gpu: &GpuContext, width: u32, height: u32) {
        self.main_depth = MainDepth::new(&gpu.device, width, height);
    }

    /// Render one frame: fit the shadow frustum, refresh the four per-pass
    /// uniform sets, then encode the passes in order. The camera is mirrored
    /// across the water plane for the reflection pass and restored after.
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        scene: &Scene,
        camera: &mut FlyoutCamera,
        frame: &FrameContext,
        particles_active: bool,
        batch: &ParticleBatch,
    ) -> Result<()> {
        let (width, height) = gpu.size();
        let aspect = width as f32 / height as f32;

        let corners = FrustumCorners::from_camera(
            camera.position,
            camera.front(),
            camera.up(),
            camera.right(),
            camera.fov.to_radians(),
            aspect,
            camera.near,
            self.fitter.fit_distance(),
        );
        let (light_view, light_proj, _) = self.fitter.compute(
            frame.light_position,
            camera.position,
            camera.front(),
            &corners,
        );
        let light_space = light_proj * light_view;

        let camera_proj = camera.projection_matrix(width, height);
        let view_proj = camera_proj * camera.view_matrix();

        camera.underwater_cam(self.water_height);
        let mirrored_view_proj = camera_proj * camera.view_matrix();
        let mirrored_pos = camera.position;
        camera.underwater_cam(self.water_height);

        let shadow_distance = self.fitter.fit_distance();
        let globals = [
            // shadow pass renders from the light
            Globals::new(
                light_space,
                light_space,
                camera.position,
                frame,
                CLIP_NONE,
                shadow_distance,
            ),
            // reflection: mirrored camera, keep geometry above the water
            Globals::new(
                mirrored_view_proj,
                light_space,
                mirrored_pos,
                frame,
                Vec4::new(0.0, 1.0, 0.0, -self.water_height + CLIP_BIAS),
                shadow_distance,
            ),
            // refraction: keep geometry below the water
            Globals::new(
                view_proj,
                light_space,
                camera.position,
                frame,
                Vec4::new(0.0, -1.0, 0.0, self.water_height + CLIP_BIAS),
                shadow_distance,
            ),
            Globals::new(
                view_proj,
                light_space,
                camera.position,
                frame,
                CLIP_NONE,
                shadow_distance,
            ),
        ];
        for (pass, g) in self.passes.iter().zip(&globals) {
            gpu.queue
                .write_buffer(&pass.globals_buffer, 0, bytemuck::bytes_of(g));
        }

        self.particle_mesh.write(&gpu.queue, batch);

        let surface = gpu.get_current_texture()?;
        let surface_view = surface
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        self.encode_shadow_pass(&mut encoder, scene);
        self.encode_offscreen_pass(&mut encoder, scene, PassKind::Reflection, particles_active);
        self.encode_offscreen_pass(&mut encoder, scene, PassKind::Refraction, particles_active);
        self.encode_composite_pass(&mut encoder, scene, &surface_view, particles_active);

        gpu.queue.submit(Some(encoder.finish()));
        surface.present();
        Ok(())
    }

    fn encode_shadow_pass(&self, encoder: &mut wgpu::CommandEncoder, scene: &Scene) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("shadow_pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.shadow_target.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_viewport(0.0, 0.0, SHADOW_SIZE as f32, SHADOW_SIZE as f32, 0.0, 1.0);
        pass.set_pipeline(&self.shadow_pipeline.pipeline);
        pass.set_bind_group(0, &self.passes[0].globals_bind_group, &[]);
        for (index, object) in scene.visible_in(PassKind::Shadow, false) {
            let mesh = &self.meshes[object.mesh];
            pass.set_bind_group(1, &self.objects[index].bind_group, &[]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }

    fn encode_offscreen_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        scene: &Scene,
        kind: PassKind,
        particles_active: bool,
    ) {
        let (target, pass_index) = match kind {
            PassKind::Reflection => (&self.reflection, 1),
            _ => (&self.refraction, 2),
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("offscreen_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.color_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(SKY_CLEAR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        self.draw_scene_objects(&mut pass, scene, kind, pass_index, particles_active);
    }

    fn encode_composite_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        scene: &Scene,
        surface_view: &wgpu::TextureView,
        particles_active: bool,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("composite_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(SKY_CLEAR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.main_depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        self.draw_scene_objects(&mut pass, scene, PassKind::Composite, 3, particles_active);
    }

    /// Shared draw loop for the three camera passes. Pipeline selection
    /// follows the object's render category; water and particles use their
    /// dedicated pipelines.
    fn draw_scene_objects<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        scene: &Scene,
        kind: PassKind,
        pass_index: usize,
        particles_active: bool,
    ) {
        let globals = &self.passes[pass_index].globals_bind_group;

        // gradient sky first; depth is untouched so geometry draws over it
        pass.set_pipeline(&self.sky_pipeline.pipeline);
        pass.set_bind_group(0, globals, &[]);
        pass.draw(0..3, 0..1);

        for (index, object) in scene.visible_in(kind, particles_active) {
            let binding = &self.objects[index];
            match object.category {
                RenderCategory::Water => {
                    pass.set_pipeline(&self.water_pipeline.pipeline);
                    pass.set_bind_group(0, globals, &[]);
                    pass.set_bind_group(1, &self.water_targets_bind_group, &[]);
                    pass.set_bind_group(2, &binding.bind_group, &[]);
                }
                RenderCategory::Particles => {
                    pass.set_pipeline(&self.particle_pipeline.pipeline);
                    pass.set_bind_group(0, globals, &[]);
                    let mesh = &self.particle_mesh;
                    if mesh.index_count == 0 {
                        continue;
                    }
                    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                    continue;
                }
                _ => {
                    let pipeline = if object.category.wants_culling_disabled() {
                        &self.scene_pipeline.pipeline_no_cull
                    } else {
                        &self.scene_pipeline.pipeline
                    };
                    pass.set_pipeline(pipeline);
                    pass.set_bind_group(0, globals, &[]);
                    pass.set_bind_group(1, &self.shadow_map_bind_group, &[]);
                    pass.set_bind_group(2, &binding.bind_group, &[]);
                    let texture = binding
                        .texture_bind_group_index
                        .unwrap_or(self.white_bind_group);
                    pass.set_bind_group(3, &self.texture_bind_groups[texture], &[]);
                }
            }
            let mesh = &self.meshes[object.mesh];
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}

/// Clear color behind the gradient sky, matching the fog tint
const SKY_CLEAR: wgpu::Color = wgpu::Color {
    r: 0.75,
    g: 0.4,
    b: 0.25,
    a: 1.0,
};
