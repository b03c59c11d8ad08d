use super::{
    Filter, FilterDefaults, FilterOptions, FilterSources, DEFAULT_FILTER_VERTEX_GLSL,
    DEFAULT_FILTER_WGSL,
};
use crate::error::FilterError;
use crate::shader::{GlProgramSource, GpuProgramSource, StageSource};

const ALPHA_FRAGMENT_WGSL: &str = r#"
struct AlphaUniforms {
    uAlpha: f32,
};

@group(1) @binding(0) var<uniform> alphaUniforms: AlphaUniforms;

@fragment
fn mainFragment(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return textureSample(uTexture, uSampler, uv) * alphaUniforms.uAlpha;
}
"#;

const ALPHA_FRAGMENT_GLSL: &str = r#"
in vec2 vTextureCoord;
out vec4 finalColor;

uniform float uAlpha;
uniform sampler2D uTexture;

void main()
{
    finalColor = texture(uTexture, vTextureCoord) * uAlpha;
}
"#;

/// Uniform block of [`AlphaFilter`], `@group(1) @binding(0)`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AlphaUniforms {
    pub alpha: f32,
    pub _pad: [f32; 3],
}

/// Multiplies the filtered region by a constant alpha.
///
/// Unlike setting the alpha of every child, the region is flattened first, so
/// overlapping children do not show through each other.
///
/// ```
/// use rendition::{AlphaFilter, Backend, FilterOptions};
///
/// let filter = AlphaFilter::new(Some(0.5), FilterOptions::new()).unwrap();
/// assert_eq!(filter.alpha(), 0.5);
/// assert!(filter.filter().supports(Backend::Gpu));
/// assert!(filter.filter().supports(Backend::Gl));
/// ```
#[derive(Debug, Clone)]
pub struct AlphaFilter {
    filter: Filter,
    alpha: f32,
}

impl AlphaFilter {
    pub const DEFAULTS: FilterDefaults = FilterDefaults::DEFAULT;
    pub const DEFAULT_ALPHA: f32 = 1.0;

    pub fn new(alpha: Option<f32>, options: FilterOptions) -> Result<Self, FilterError> {
        let sources = FilterSources {
            gpu: Some(GpuProgramSource {
                vertex: StageSource::new(wgsl_module(), "mainVertex"),
                fragment: StageSource::new(wgsl_module(), "mainFragment"),
            }),
            gl: Some(GlProgramSource {
                vertex: DEFAULT_FILTER_VERTEX_GLSL.into(),
                fragment: ALPHA_FRAGMENT_GLSL.into(),
            }),
            options,
        };

        Ok(Self {
            filter: Filter::from_sources_with_defaults(sources, &Self::DEFAULTS)?,
            alpha: alpha.unwrap_or(Self::DEFAULT_ALPHA),
        })
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut Filter {
        &mut self.filter
    }

    pub fn uniforms(&self) -> AlphaUniforms {
        AlphaUniforms {
            alpha: self.alpha,
            _pad: [0.0; 3],
        }
    }
}

fn wgsl_module() -> String {
    format!("{DEFAULT_FILTER_WGSL}\n{ALPHA_FRAGMENT_WGSL}")
}
