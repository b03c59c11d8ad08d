//! Filters: post-processing effects applied to a rendered region.
//!
//! A [`Filter`] is a declarative descriptor. It owns the programs for each
//! backend, the resources those programs expect, and a [`RenderState`] used when
//! the result is composited back. Running the passes is the job of a
//! [`FilterSystem`] implementation in the renderer.
//!
//! Every filter binds its input texture at `@group(0) @binding(1)`. Filters with
//! `blend_required` also get the current framebuffer contents at
//! `@group(0) @binding(3)`. Slots 0 and 2 belong to the filter system (global
//! filter uniforms and the sampler).

use smallvec::SmallVec;

use crate::blend_mode::BlendMode;
use crate::error::FilterError;
use crate::shader::{
    Backend, GlProgram, GlProgramSource, GpuProgram, GpuProgramSource, Programs, Shader,
};
use crate::state::RenderState;

mod alpha;
mod options;

pub use alpha::{AlphaFilter, AlphaUniforms};
pub use options::{Antialias, FilterDefaults, FilterOptions, Resolution};

pub const INPUT_TEXTURE: &str = "uTexture";
pub const INPUT_TEXTURE_SLOT: u32 = 1;
pub const BACK_TEXTURE: &str = "uBackTexture";
pub const BACK_TEXTURE_SLOT: u32 = 3;
/// Bind group holding the filter textures.
pub const FILTER_GROUP: u32 = 0;

/// Shared WGSL for filter programs: global filter uniforms, the input texture
/// and sampler, and a `mainVertex` entry point covering the output frame.
///
/// Fragment code appended to it reads `uTexture` with `uSampler` at `uv`.
pub const DEFAULT_FILTER_WGSL: &str = r#"
struct GlobalFilterUniforms {
    uInputSize: vec4<f32>,
    uInputPixel: vec4<f32>,
    uInputClamp: vec4<f32>,
    uOutputFrame: vec4<f32>,
    uGlobalFrame: vec4<f32>,
    uOutputTexture: vec4<f32>,
};

@group(0) @binding(0) var<uniform> gfu: GlobalFilterUniforms;
@group(0) @binding(1) var uTexture: texture_2d<f32>;
@group(0) @binding(2) var uSampler: sampler;

struct VSOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

fn filterVertexPosition(aPosition: vec2<f32>) -> vec4<f32> {
    var position = aPosition * gfu.uOutputFrame.zw + gfu.uOutputFrame.xy;
    position.x = position.x * (2.0 / gfu.uOutputTexture.x) - 1.0;
    position.y = position.y * (2.0 * gfu.uOutputTexture.z / gfu.uOutputTexture.y) - gfu.uOutputTexture.z;
    return vec4<f32>(position, 0.0, 1.0);
}

fn filterTextureCoord(aPosition: vec2<f32>) -> vec2<f32> {
    return aPosition * (gfu.uOutputFrame.zw * gfu.uInputSize.zw);
}

@vertex
fn mainVertex(@location(0) aPosition: vec2<f32>) -> VSOutput {
    return VSOutput(filterVertexPosition(aPosition), filterTextureCoord(aPosition));
}
"#;

/// Shared GLSL vertex stage for filter programs. Outputs `vTextureCoord`.
pub const DEFAULT_FILTER_VERTEX_GLSL: &str = r#"
in vec2 aPosition;
out vec2 vTextureCoord;

uniform vec4 uInputSize;
uniform vec4 uOutputFrame;
uniform vec4 uOutputTexture;

vec4 filterVertexPosition(void)
{
    vec2 position = aPosition * uOutputFrame.zw + uOutputFrame.xy;
    position.x = position.x * (2.0 / uOutputTexture.x) - 1.0;
    position.y = position.y * (2.0 * uOutputTexture.z / uOutputTexture.y) - uOutputTexture.z;
    return vec4(position, 0.0, 1.0);
}

vec2 filterTextureCoord(void)
{
    return aPosition * (uOutputFrame.zw * uInputSize.zw);
}

void main(void)
{
    gl_Position = filterVertexPosition();
    vTextureCoord = filterTextureCoord();
}
"#;

/// How the output target is prepared before a filter pass writes to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClearMode {
    /// Keep the existing contents.
    #[default]
    Load,
    /// Clear to transparent first.
    Clear,
}

/// Runs filter passes. Implemented by the renderer.
pub trait FilterSystem {
    type Texture;

    fn apply_filter(
        &mut self,
        filter: &Filter,
        input: &Self::Texture,
        output: &Self::Texture,
        clear_mode: ClearMode,
    );
}

/// Program sources plus generic options, for [`Filter::from_sources`].
#[derive(Debug, Clone, Default)]
pub struct FilterSources {
    pub gpu: Option<GpuProgramSource>,
    pub gl: Option<GlProgramSource>,
    pub options: FilterOptions,
}

#[derive(Debug, Clone)]
pub struct Filter {
    pub enabled: bool,
    pub state: RenderState,
    pub padding: f32,
    pub antialias: Antialias,
    pub resolution: Resolution,
    pub blend_required: bool,
    pub clip_to_viewport: bool,
    shader: Shader,
}

impl Filter {
    /// Creates a filter with [`FilterDefaults::DEFAULT`] overridden by `options`.
    pub fn new(programs: Programs, options: FilterOptions) -> Self {
        Self::with_defaults(programs, &FilterDefaults::DEFAULT, options)
    }

    /// Creates a filter from an effect's own defaults overridden by `options`.
    pub fn with_defaults(
        programs: Programs,
        defaults: &FilterDefaults,
        options: FilterOptions,
    ) -> Self {
        let merged = defaults.merge(&options);

        let mut state = RenderState::for_2d();
        state.set_blend_mode(merged.blend_mode);

        let mut shader = Shader::new(programs);
        shader.add_resource(INPUT_TEXTURE, FILTER_GROUP, INPUT_TEXTURE_SLOT);
        if merged.blend_required {
            shader.add_resource(BACK_TEXTURE, FILTER_GROUP, BACK_TEXTURE_SLOT);
        }

        tracing::debug!(
            "Created filter: blend_mode={}, padding={}, resolution={:?}, blend_required={}",
            merged.blend_mode,
            merged.padding,
            merged.resolution,
            merged.blend_required
        );

        Self {
            enabled: true,
            state,
            padding: merged.padding,
            antialias: merged.antialias,
            resolution: merged.resolution,
            blend_required: merged.blend_required,
            clip_to_viewport: merged.clip_to_viewport,
            shader,
        }
    }

    /// Builds the program for each backend whose source is present, then the filter.
    ///
    /// A filter with only one backend is valid; it simply cannot run on the other.
    /// With neither it supports no backend and [`validate_bindings`](Self::validate_bindings)
    /// reports [`FilterError::NoProgram`].
    pub fn from_sources(sources: FilterSources) -> Result<Self, FilterError> {
        Self::from_sources_with_defaults(sources, &FilterDefaults::DEFAULT)
    }

    pub(crate) fn from_sources_with_defaults(
        sources: FilterSources,
        defaults: &FilterDefaults,
    ) -> Result<Self, FilterError> {
        let FilterSources { gpu, gl, options } = sources;
        if gpu.is_none() && gl.is_none() {
            tracing::warn!("Filter created without a program for any backend");
        }

        let programs = Programs {
            gpu: gpu.map(GpuProgram::from_source).transpose()?,
            gl: gl.map(GlProgram::from_source).transpose()?,
        };

        Ok(Self::with_defaults(programs, defaults, options))
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.state.blend_mode()
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.set_blend_mode(mode);
    }

    pub fn shader(&self) -> &Shader {
        &self.shader
    }

    pub fn supports(&self, backend: Backend) -> bool {
        self.shader.supports(backend)
    }

    /// Checks that the programs declare every texture this filter binds.
    pub fn validate_bindings(&self) -> Result<(), FilterError> {
        self.shader.validate_bindings()
    }

    /// Layout entries for the filter textures in [`FILTER_GROUP`].
    pub fn texture_layout_entries(&self) -> SmallVec<[wgpu::BindGroupLayoutEntry; 2]> {
        self.shader
            .resources()
            .iter()
            .filter(|resource| resource.group == FILTER_GROUP)
            .map(|resource| wgpu::BindGroupLayoutEntry {
                binding: resource.slot,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            })
            .collect()
    }

    /// Hands the filter to the filter system, which renders `input` into `output`.
    pub fn apply<S: FilterSystem>(
        &self,
        system: &mut S,
        input: &S::Texture,
        output: &S::Texture,
        clear_mode: ClearMode,
    ) {
        system.apply_filter(self, input, output, clear_mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WGSL: &str = r#"
@group(0) @binding(1) var uTexture: texture_2d<f32>;
@group(0) @binding(2) var uSampler: sampler;
@group(0) @binding(3) var uBackTexture: texture_2d<f32>;
"#;

    const GLSL: &str = "uniform sampler2D uTexture;\nvoid main() {}\n";

    fn gpu_source() -> GpuProgramSource {
        GpuProgramSource {
            vertex: crate::shader::StageSource::new(WGSL, "mainVertex"),
            fragment: crate::shader::StageSource::new(WGSL, "mainFragment"),
        }
    }

    #[derive(Default)]
    struct RecordingSystem {
        calls: Vec<(u32, u32, ClearMode, f32)>,
    }

    impl FilterSystem for RecordingSystem {
        type Texture = u32;

        fn apply_filter(
            &mut self,
            filter: &Filter,
            input: &u32,
            output: &u32,
            clear_mode: ClearMode,
        ) {
            self.calls.push((*input, *output, clear_mode, filter.padding));
        }
    }

    #[test]
    fn default_filter_has_one_binding() {
        let filter = Filter::new(Programs::default(), FilterOptions::new());
        assert!(filter.enabled);
        assert_eq!(filter.blend_mode(), BlendMode::Normal);
        assert_eq!(filter.padding, 0.0);
        assert_eq!(filter.resolution, Resolution::Value(1.0));
        assert_eq!(filter.antialias, Antialias::Off);
        assert!(filter.clip_to_viewport);

        let resources = filter.shader().resources();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].name, INPUT_TEXTURE);
        assert_eq!((resources[0].group, resources[0].slot), (0, 1));
    }

    #[test]
    fn blend_required_adds_back_texture_after_input() {
        let filter = Filter::new(Programs::default(), FilterOptions::new().blend_required(true));
        let slots: Vec<_> = filter
            .shader()
            .resources()
            .iter()
            .map(|r| (&*r.name, r.slot))
            .collect();
        assert_eq!(slots, [(INPUT_TEXTURE, 1), (BACK_TEXTURE, 3)]);

        let entries = filter.texture_layout_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].binding, BACK_TEXTURE_SLOT);
    }

    #[test]
    fn state_starts_from_2d_preset() {
        let filter = Filter::new(
            Programs::default(),
            FilterOptions::new().blend_mode(BlendMode::None),
        );
        assert!(!filter.state.depth_test());
        assert!(!filter.state.blend());

        let mut filter = Filter::new(Programs::default(), FilterOptions::new());
        filter.set_blend_mode(BlendMode::Add);
        assert_eq!(filter.state.blend_mode_id(), 1);
    }

    #[test]
    fn apply_delegates_to_filter_system() {
        let filter = Filter::new(Programs::default(), FilterOptions::new().padding(3.0));
        let mut system = RecordingSystem::default();
        filter.apply(&mut system, &10, &20, ClearMode::Clear);
        assert_eq!(system.calls, [(10, 20, ClearMode::Clear, 3.0)]);
    }

    #[test]
    fn from_sources_builds_only_supplied_backends() {
        let filter = Filter::from_sources(FilterSources {
            gpu: Some(gpu_source()),
            ..Default::default()
        })
        .unwrap();
        assert!(filter.supports(Backend::Gpu));
        assert!(!filter.supports(Backend::Gl));
        assert!(filter.validate_bindings().is_ok());

        let filter = Filter::from_sources(FilterSources {
            gl: Some(GlProgramSource {
                vertex: "void main() {}".into(),
                fragment: GLSL.into(),
            }),
            ..Default::default()
        })
        .unwrap();
        assert!(filter.supports(Backend::Gl));
        assert!(!filter.supports(Backend::Gpu));
    }

    #[test]
    fn from_sources_without_programs_defers_to_validation() {
        let filter = Filter::from_sources(FilterSources {
            options: FilterOptions::new().padding(2.0),
            ..Default::default()
        })
        .unwrap();
        assert!(!filter.supports(Backend::Gpu));
        assert!(!filter.supports(Backend::Gl));
        assert_eq!(filter.padding, 2.0);
        assert_eq!(filter.shader().resources().len(), 1);
        assert_eq!(filter.validate_bindings(), Err(FilterError::NoProgram));
    }

    #[test]
    fn from_sources_rejects_empty_stage() {
        let err = Filter::from_sources(FilterSources {
            gl: Some(GlProgramSource {
                vertex: "void main() {}".into(),
                fragment: "".into(),
            }),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(
            err,
            FilterError::EmptySource {
                backend: Backend::Gl,
                stage: "fragment"
            }
        );
    }

    #[test]
    fn missing_back_texture_declaration_is_reported() {
        let filter = Filter::from_sources(FilterSources {
            gl: Some(GlProgramSource {
                vertex: "void main() {}".into(),
                fragment: GLSL.into(),
            }),
            options: FilterOptions::new().blend_required(true),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            filter.validate_bindings(),
            Err(FilterError::MissingGlUniform {
                name: BACK_TEXTURE.to_owned()
            })
        );
    }
}
