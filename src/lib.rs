//! Pipeline state, filter descriptors and cross-backend shader fragments for 2D
//! renderers built on wgpu (WGSL) or a GLSL backend.

pub use wgpu;

mod batch;
mod blend_mode;
mod color;
mod error;
pub mod filter;
mod id;
pub mod shader;
pub mod state;

pub use batch::{BatchDescriptor, BatchDescriptorPool, Bounds, GroupStateSource, Topology};
pub use blend_mode::{BlendMode, UnknownBlendMode};
pub use color::{pack_color, Color};
pub use error::FilterError;
pub use filter::{
    AlphaFilter, AlphaUniforms, Antialias, ClearMode, Filter, FilterDefaults, FilterOptions,
    FilterSources, FilterSystem, Resolution,
};
pub use id::{BatchId, BatcherId, RenderableId, TextureId};
pub use shader::bits::{
    local_uniform_bit, round_pixels_bit, ShaderFragmentBundle, ShaderTarget, StageFragments,
    LOCAL_UNIFORM_GROUP, LOCAL_UNIFORM_GROUP_SHIFTED,
};
pub use shader::local_uniform::{GpuLocalUniforms, LocalUniforms, VertexSample};
pub use shader::{Backend, Programs, ResourceBinding, Shader};
pub use state::{CullMode, RenderState, StateFlags};
