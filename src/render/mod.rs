//! GPU rendering: device context, resource upload, and the multi-pass
//! frame orchestrator

pub mod context;
pub mod frame;
pub mod mesh;
pub mod orchestrator;
pub mod pipeline;
pub mod shadow;
pub mod target;
pub mod texture;

pub use context::GpuContext;
pub use frame::{FrameContext, Globals};
pub use mesh::{GpuMesh, ParticleVertex, Vertex};
pub use orchestrator::Renderer;
pub use shadow::{OrthoBounds, ShadowFitter};
pub use texture::Texture;
