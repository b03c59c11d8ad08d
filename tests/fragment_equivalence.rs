/// Cross-backend checks for the local-uniform shader bit.
///
/// Both backends are generated from one description, so the composition lines
/// and the rounding condition must agree, and the CPU evaluator must match what
/// the generated code does.
use rendition::shader::local_uniform::{round_pixels, IDENTITY};
use rendition::{
    local_uniform_bit, pack_color, round_pixels_bit, BatchDescriptor, Bounds, GroupStateSource,
    LocalUniforms, RenderableId, ShaderTarget, TextureId, VertexSample, LOCAL_UNIFORM_GROUP,
    LOCAL_UNIFORM_GROUP_SHIFTED,
};

fn vertex(position: [f32; 2]) -> VertexSample {
    VertexSample {
        color: [0.2, 0.4, 0.6, 0.8],
        model_matrix: IDENTITY,
        position,
    }
}

#[test]
fn group_variants_differ_only_in_header() {
    let default = local_uniform_bit(ShaderTarget::WGSL);
    let shifted = local_uniform_bit(ShaderTarget::WGSL_SHIFTED);

    assert_eq!(default.name, shifted.name);
    assert_eq!(default.vertex.main, shifted.vertex.main);
    assert_eq!(default.vertex.end, shifted.vertex.end);
    assert!(default
        .vertex
        .header
        .contains(&format!("@group({LOCAL_UNIFORM_GROUP}) @binding(0)")));
    assert!(shifted
        .vertex
        .header
        .contains(&format!("@group({LOCAL_UNIFORM_GROUP_SHIFTED}) @binding(0)")));
}

#[test]
fn backends_compose_in_the_same_order() {
    let wgsl = local_uniform_bit(ShaderTarget::WGSL);
    let glsl = local_uniform_bit(ShaderTarget::Glsl);

    let targets = |main: &str| -> Vec<String> {
        main.lines()
            .map(|line| line.split(" *= ").next().unwrap_or_default().to_owned())
            .collect()
    };
    assert_eq!(targets(&wgsl.vertex.main), ["vColor", "modelMatrix"]);
    assert_eq!(targets(&wgsl.vertex.main), targets(&glsl.vertex.main));

    assert!(wgsl.vertex.end.starts_with("if (localUniforms.uRound == 1.0)"));
    assert!(glsl.vertex.end.starts_with("if (uRound == 1.0)"));
}

#[test]
fn round_pixels_helper_exists_for_both_backends() {
    assert!(round_pixels_bit(ShaderTarget::WGSL)
        .vertex
        .header
        .contains("fn roundPixels("));
    assert!(round_pixels_bit(ShaderTarget::Glsl)
        .vertex
        .header
        .contains("vec2 roundPixels("));
}

#[test]
fn identity_uniforms_leave_vertex_unchanged() {
    let input = vertex([0.25, -0.5]);
    let output = LocalUniforms::IDENTITY.evaluate(input, [800.0, 600.0]);
    assert_eq!(output, input);
}

#[test]
fn rounding_applies_only_when_flag_is_set() {
    let input = vertex([0.1234, 0.5678]);
    let resolution = [100.0, 100.0];

    let off = LocalUniforms::new(IDENTITY, 0xFFFF_FFFF, false).evaluate(input, resolution);
    assert_eq!(off.position, input.position);

    let on = LocalUniforms::new(IDENTITY, 0xFFFF_FFFF, true).evaluate(input, resolution);
    assert_eq!(on.position, round_pixels(input.position, resolution));
}

struct Scene;

impl GroupStateSource for Scene {
    fn group_blend_mode(&self, _renderable: RenderableId) -> Option<rendition::BlendMode> {
        Some(rendition::BlendMode::Normal)
    }

    fn group_color_alpha(&self, _renderable: RenderableId) -> Option<u32> {
        // Opaque red, 0xAABBGGRR.
        Some(0xFF00_00FF)
    }
}

#[test]
fn descriptor_color_flows_into_local_uniforms() {
    let descriptor = BatchDescriptor::for_quad(
        RenderableId(1),
        TextureId(2),
        Bounds::new(0.0, 0.0, 10.0, 10.0),
    );
    let color = descriptor.color(&Scene).unwrap();

    let uniforms = LocalUniforms::new(IDENTITY, color, descriptor.round_pixels);
    let mut expected = [0.0; 4];
    pack_color(color, &mut expected, 0);
    assert_eq!(uniforms.color, expected);
    assert_eq!(uniforms.color, [1.0, 0.0, 0.0, 1.0]);

    let shaded = uniforms.evaluate(vertex([0.0, 0.0]), [64.0, 64.0]);
    assert_eq!(shaded.color, [0.2, 0.0, 0.0, 0.8]);

    let gpu = uniforms.to_gpu();
    assert_eq!(bytemuck::bytes_of(&gpu).len(), 80);
}
