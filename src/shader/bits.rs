//! Vertex-stage code fragments ("bits") that a program builder splices into
//! its templates.
//!
//! The local-uniform bit is described once, as data: a uniform block, the order
//! in which its uniforms are folded into the vertex, and the pixel-rounding rule.
//! A WGSL emitter and a GLSL emitter render that description into source text,
//! so both backends always compose the same way. The WGSL binding group is an
//! emitter parameter and only ever reaches the header.

use std::fmt::Write;

/// Group the local uniforms normally live in.
pub const LOCAL_UNIFORM_GROUP: u32 = 1;
/// Group used where group 1 is already taken by the pipeline.
pub const LOCAL_UNIFORM_GROUP_SHIFTED: u32 = 2;

/// Which backend, and for WGSL which bind group, a bundle is emitted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderTarget {
    Wgsl { group: u32 },
    Glsl,
}

impl ShaderTarget {
    pub const WGSL: Self = ShaderTarget::Wgsl {
        group: LOCAL_UNIFORM_GROUP,
    };
    pub const WGSL_SHIFTED: Self = ShaderTarget::Wgsl {
        group: LOCAL_UNIFORM_GROUP_SHIFTED,
    };
}

/// Code for one pipeline stage, spliced into a template at three points.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StageFragments {
    /// Declarations placed before the entry point.
    pub header: String,
    /// Per-vertex composition, placed after the vertex inputs are read.
    pub main: String,
    /// Post-processing of the output position.
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderFragmentBundle {
    pub name: &'static str,
    pub vertex: StageFragments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UniformType {
    Mat3,
    Vec4,
    F32,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct UniformField {
    pub name: &'static str,
    pub ty: UniformType,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct UniformBlock {
    pub struct_name: &'static str,
    pub instance_name: &'static str,
    pub binding: u32,
    pub fields: &'static [UniformField],
}

/// Vertex values a uniform can be folded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VertexValue {
    Color,
    ModelMatrix,
}

impl VertexValue {
    fn variable(self) -> &'static str {
        match self {
            VertexValue::Color => "vColor",
            VertexValue::ModelMatrix => "modelMatrix",
        }
    }
}

/// `target *= uniform`
#[derive(Debug, Clone, Copy)]
pub(crate) struct Compose {
    pub target: VertexValue,
    pub uniform: &'static str,
}

/// Snap the output position to the pixel grid when `flag == 1`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RoundRule {
    pub flag: &'static str,
    pub resolution: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct BitDescription {
    pub name: &'static str,
    pub block: UniformBlock,
    pub compose: &'static [Compose],
    pub round: RoundRule,
}

pub(crate) const LOCAL_UNIFORM: BitDescription = BitDescription {
    name: "local-uniform-bit",
    block: UniformBlock {
        struct_name: "LocalUniforms",
        instance_name: "localUniforms",
        binding: 0,
        fields: &[
            UniformField {
                name: "uTransformMatrix",
                ty: UniformType::Mat3,
            },
            UniformField {
                name: "uColor",
                ty: UniformType::Vec4,
            },
            UniformField {
                name: "uRound",
                ty: UniformType::F32,
            },
        ],
    },
    compose: &[
        Compose {
            target: VertexValue::Color,
            uniform: "uColor",
        },
        Compose {
            target: VertexValue::ModelMatrix,
            uniform: "uTransformMatrix",
        },
    ],
    round: RoundRule {
        flag: "uRound",
        resolution: "uResolution",
    },
};

/// Turns a [`BitDescription`] into source text for one backend.
pub(crate) trait FragmentEmitter {
    fn header(&self, block: &UniformBlock) -> String;

    /// Expression reading a local uniform.
    fn uniform(&self, block: &UniformBlock, name: &str) -> String;

    /// Expression reading a renderer-wide uniform.
    fn global_uniform(&self, name: &str) -> String;

    /// Statement snapping the output position with `roundPixels(…, resolution)`.
    fn snap_position(&self, resolution: &str) -> String;
}

pub(crate) struct WgslEmitter {
    pub group: u32,
}

impl FragmentEmitter for WgslEmitter {
    fn header(&self, block: &UniformBlock) -> String {
        let mut header = format!("struct {} {{\n", block.struct_name);
        for field in block.fields {
            let ty = match field.ty {
                UniformType::Mat3 => "mat3x3<f32>",
                UniformType::Vec4 => "vec4<f32>",
                UniformType::F32 => "f32",
            };
            let _ = writeln!(header, "    {}: {},", field.name, ty);
        }
        let _ = writeln!(header, "}};");
        let _ = writeln!(
            header,
            "@group({}) @binding({}) var<uniform> {}: {};",
            self.group, block.binding, block.instance_name, block.struct_name
        );
        header
    }

    fn uniform(&self, block: &UniformBlock, name: &str) -> String {
        format!("{}.{}", block.instance_name, name)
    }

    fn global_uniform(&self, name: &str) -> String {
        format!("globalUniforms.{name}")
    }

    fn snap_position(&self, resolution: &str) -> String {
        format!("vPosition = vec4<f32>(roundPixels(vPosition.xy, {resolution}), vPosition.zw);")
    }
}

pub(crate) struct GlslEmitter;

impl FragmentEmitter for GlslEmitter {
    fn header(&self, block: &UniformBlock) -> String {
        let mut header = String::new();
        for field in block.fields {
            let ty = match field.ty {
                UniformType::Mat3 => "mat3",
                UniformType::Vec4 => "vec4",
                UniformType::F32 => "float",
            };
            let _ = writeln!(header, "uniform {} {};", ty, field.name);
        }
        header
    }

    fn uniform(&self, _block: &UniformBlock, name: &str) -> String {
        name.to_owned()
    }

    fn global_uniform(&self, name: &str) -> String {
        name.to_owned()
    }

    fn snap_position(&self, resolution: &str) -> String {
        format!("gl_Position.xy = roundPixels(gl_Position.xy, {resolution});")
    }
}

fn render_main(description: &BitDescription, emitter: &dyn FragmentEmitter) -> String {
    let mut main = String::new();
    for step in description.compose {
        let _ = writeln!(
            main,
            "{} *= {};",
            step.target.variable(),
            emitter.uniform(&description.block, step.uniform)
        );
    }
    main
}

fn render_end(description: &BitDescription, emitter: &dyn FragmentEmitter) -> String {
    let flag = emitter.uniform(&description.block, description.round.flag);
    let resolution = emitter.global_uniform(description.round.resolution);
    format!(
        "if ({flag} == 1.0)\n{{\n    {}\n}}\n",
        emitter.snap_position(&resolution)
    )
}

pub(crate) fn render(
    description: &BitDescription,
    emitter: &dyn FragmentEmitter,
) -> ShaderFragmentBundle {
    ShaderFragmentBundle {
        name: description.name,
        vertex: StageFragments {
            header: emitter.header(&description.block),
            main: render_main(description, emitter),
            end: render_end(description, emitter),
        },
    }
}

fn emitter_for(target: ShaderTarget) -> Box<dyn FragmentEmitter> {
    match target {
        ShaderTarget::Wgsl { group } => Box::new(WgslEmitter { group }),
        ShaderTarget::Glsl => Box::new(GlslEmitter),
    }
}

/// Multiplies the vertex color by `uColor`, the model matrix by
/// `uTransformMatrix`, and rounds the output position when `uRound == 1`.
///
/// Needs [`round_pixels_bit`] for the `roundPixels` helper and a global
/// `uResolution` uniform.
///
/// ```
/// use rendition::{local_uniform_bit, ShaderTarget};
///
/// let bit = local_uniform_bit(ShaderTarget::Wgsl { group: 2 });
/// assert!(bit.vertex.header.contains("@group(2) @binding(0)"));
/// ```
pub fn local_uniform_bit(target: ShaderTarget) -> ShaderFragmentBundle {
    render(&LOCAL_UNIFORM, emitter_for(target).as_ref())
}

const ROUND_PIXELS_WGSL: &str = r#"
fn roundPixels(position: vec2<f32>, targetSize: vec2<f32>) -> vec2<f32>
{
    return (floor(((position * 0.5 + 0.5) * targetSize) + 0.5) / targetSize) * 2.0 - 1.0;
}
"#;

const ROUND_PIXELS_GLSL: &str = r#"
vec2 roundPixels(vec2 position, vec2 targetSize)
{
    return (floor(((position * 0.5 + 0.5) * targetSize) + 0.5) / targetSize) * 2.0 - 1.0;
}
"#;

/// Declares `roundPixels(position, targetSize)`, snapping clip-space positions to
/// pixel centers.
pub fn round_pixels_bit(target: ShaderTarget) -> ShaderFragmentBundle {
    let header = match target {
        ShaderTarget::Wgsl { .. } => ROUND_PIXELS_WGSL,
        ShaderTarget::Glsl => ROUND_PIXELS_GLSL,
    };

    ShaderFragmentBundle {
        name: "round-pixels-bit",
        vertex: StageFragments {
            header: header.to_owned(),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wgsl_header_declares_block_at_group() {
        let bit = local_uniform_bit(ShaderTarget::WGSL);
        let header = &bit.vertex.header;
        assert!(header.contains("struct LocalUniforms {"));
        assert!(header.contains("uTransformMatrix: mat3x3<f32>,"));
        assert!(header.contains("uColor: vec4<f32>,"));
        assert!(header.contains("uRound: f32,"));
        assert!(header
            .contains("@group(1) @binding(0) var<uniform> localUniforms: LocalUniforms;"));

        let transform = header.find("uTransformMatrix").unwrap();
        let color = header.find("uColor").unwrap();
        let round = header.find("uRound").unwrap();
        assert!(transform < color && color < round);
    }

    #[test]
    fn shifted_group_only_changes_the_header() {
        let group1 = local_uniform_bit(ShaderTarget::WGSL);
        let group2 = local_uniform_bit(ShaderTarget::WGSL_SHIFTED);

        assert_eq!(group1.name, group2.name);
        assert_eq!(group1.vertex.main, group2.vertex.main);
        assert_eq!(group1.vertex.end, group2.vertex.end);
        assert!(group2.vertex.header.contains("@group(2) @binding(0)"));
        assert!(!group2.vertex.header.contains("@group(1)"));
        assert_eq!(
            group1.vertex.header.replace("@group(1)", "@group(2)"),
            group2.vertex.header
        );
    }

    #[test]
    fn glsl_header_declares_three_uniforms() {
        let bit = local_uniform_bit(ShaderTarget::Glsl);
        assert_eq!(
            bit.vertex.header,
            "uniform mat3 uTransformMatrix;\nuniform vec4 uColor;\nuniform float uRound;\n"
        );
    }

    #[test]
    fn both_backends_compose_color_then_transform() {
        let wgsl = local_uniform_bit(ShaderTarget::WGSL);
        let glsl = local_uniform_bit(ShaderTarget::Glsl);

        assert_eq!(
            wgsl.vertex.main,
            "vColor *= localUniforms.uColor;\nmodelMatrix *= localUniforms.uTransformMatrix;\n"
        );
        assert_eq!(
            glsl.vertex.main,
            "vColor *= uColor;\nmodelMatrix *= uTransformMatrix;\n"
        );
    }

    #[test]
    fn both_backends_round_when_flag_is_one() {
        let wgsl = local_uniform_bit(ShaderTarget::WGSL);
        let glsl = local_uniform_bit(ShaderTarget::Glsl);

        assert!(wgsl.vertex.end.starts_with("if (localUniforms.uRound == 1.0)"));
        assert!(wgsl
            .vertex
            .end
            .contains("roundPixels(vPosition.xy, globalUniforms.uResolution)"));
        assert!(glsl.vertex.end.starts_with("if (uRound == 1.0)"));
        assert!(glsl
            .vertex
            .end
            .contains("gl_Position.xy = roundPixels(gl_Position.xy, uResolution);"));
    }

    #[test]
    fn round_pixels_helper_matches_backend() {
        assert!(round_pixels_bit(ShaderTarget::WGSL)
            .vertex
            .header
            .contains("fn roundPixels(position: vec2<f32>"));
        let glsl = round_pixels_bit(ShaderTarget::Glsl);
        assert!(glsl.vertex.header.contains("vec2 roundPixels(vec2 position"));
        assert!(glsl.vertex.main.is_empty() && glsl.vertex.end.is_empty());
    }
}
