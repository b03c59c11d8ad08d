/// Horizontal separable Gaussian blur pass (direction = (1,0)).
///
/// Appended to `DEFAULT_FILTER_WGSL`, which provides `uTexture` and `uSampler`.
pub const HORIZONTAL_BLUR_WGSL: &str = r#"
const DIRECTION: vec2<f32> = vec2<f32>(1.0, 0.0);

struct BlurParams {
    radius: f32,
    _pad: f32,
    tex_size: vec2<f32>,
}
@group(1) @binding(0) var<uniform> blurParams: BlurParams;

@fragment
fn mainFragment(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    let pixel = DIRECTION / blurParams.tex_size;
    let sigma = max(blurParams.radius / 3.0, 0.001);
    var color = vec4<f32>(0.0);
    var total_weight = 0.0;
    let r = i32(ceil(blurParams.radius));
    for (var i = -r; i <= r; i++) {
        let offset = f32(i);
        let weight = exp(-(offset * offset) / (2.0 * sigma * sigma));
        color += textureSample(uTexture, uSampler, uv + pixel * offset) * weight;
        total_weight += weight;
    }
    return color / total_weight;
}
"#;

/// Vertical separable Gaussian blur pass (direction = (0,1)).
pub const VERTICAL_BLUR_WGSL: &str = r#"
const DIRECTION: vec2<f32> = vec2<f32>(0.0, 1.0);

struct BlurParams {
    radius: f32,
    _pad: f32,
    tex_size: vec2<f32>,
}
@group(1) @binding(0) var<uniform> blurParams: BlurParams;

@fragment
fn mainFragment(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    let pixel = DIRECTION / blurParams.tex_size;
    let sigma = max(blurParams.radius / 3.0, 0.001);
    var color = vec4<f32>(0.0);
    var total_weight = 0.0;
    let r = i32(ceil(blurParams.radius));
    for (var i = -r; i <= r; i++) {
        let offset = f32(i);
        let weight = exp(-(offset * offset) / (2.0 * sigma * sigma));
        color += textureSample(uTexture, uSampler, uv + pixel * offset) * weight;
        total_weight += weight;
    }
    return color / total_weight;
}
"#;

/// GLSL blur pass, both directions through `uDirection`.
pub const BLUR_GLSL: &str = r#"
in vec2 vTextureCoord;
out vec4 finalColor;

uniform sampler2D uTexture;
uniform vec2 uDirection;
uniform float uRadius;
uniform vec2 uTexSize;

void main()
{
    vec2 pixel = uDirection / uTexSize;
    float sigma = max(uRadius / 3.0, 0.001);
    vec4 color = vec4(0.0);
    float totalWeight = 0.0;
    int r = int(ceil(uRadius));
    for (int i = -r; i <= r; i++) {
        float offset = float(i);
        float weight = exp(-(offset * offset) / (2.0 * sigma * sigma));
        color += texture(uTexture, vTextureCoord + pixel * offset) * weight;
        totalWeight += weight;
    }
    finalColor = color / totalWeight;
}
"#;

/// Backdrop tint: mixes the filtered region over what is already on screen.
/// Declares the back texture at `@group(0) @binding(3)`.
pub const BACKDROP_TINT_WGSL: &str = r#"
@group(0) @binding(3) var uBackTexture: texture_2d<f32>;

@fragment
fn mainFragment(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    let front = textureSample(uTexture, uSampler, uv);
    let back = textureSample(uBackTexture, uSampler, uv);
    return front + back * (1.0 - front.a);
}
"#;

/// Same as [`BACKDROP_TINT_WGSL`] but forgets to declare `uBackTexture`.
pub const BROKEN_BACKDROP_WGSL: &str = r#"
@fragment
fn mainFragment(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    // @group(0) @binding(3) var uBackTexture: texture_2d<f32>;
    return textureSample(uTexture, uSampler, uv);
}
"#;
