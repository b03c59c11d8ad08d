//! CPU side of the local-uniform bit: the values uploaded per draw and a
//! reference evaluator of the composition the shader bits perform.

use super::bits::{BitDescription, VertexValue, LOCAL_UNIFORM};
use crate::color::pack_color;

/// Column-major 3x3 matrix, matching `mat3x3<f32>` / `mat3`.
pub type Mat3 = [[f32; 3]; 3];

pub const IDENTITY: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Values of the local-uniform block for one draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalUniforms {
    pub transform: Mat3,
    /// Premultiplied RGBA.
    pub color: [f32; 4],
    /// `1.0` rounds positions to the pixel grid.
    pub round: f32,
}

impl Default for LocalUniforms {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// `LocalUniforms` laid out for a WGSL uniform buffer: every matrix column is
/// padded to 16 bytes and the struct size is rounded up to 16.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLocalUniforms {
    pub transform: [[f32; 4]; 3],
    pub color: [f32; 4],
    pub round: f32,
    pub _pad: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum UniformValue {
    Mat3(Mat3),
    Vec4([f32; 4]),
    F32(f32),
}

/// The per-vertex values the local-uniform bit reads and writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexSample {
    pub color: [f32; 4],
    pub model_matrix: Mat3,
    /// Clip-space position.
    pub position: [f32; 2],
}

impl LocalUniforms {
    /// No transform, white, no rounding: leaves every vertex unchanged.
    pub const IDENTITY: Self = Self {
        transform: IDENTITY,
        color: [1.0; 4],
        round: 0.0,
    };

    /// Builds the uniforms from a renderable's group color packed as `0xAABBGGRR`.
    pub fn new(transform: Mat3, color_abgr: u32, round_pixels: bool) -> Self {
        let mut color = [0.0; 4];
        pack_color(color_abgr, &mut color, 0);
        Self {
            transform,
            color,
            round: if round_pixels { 1.0 } else { 0.0 },
        }
    }

    pub fn to_gpu(&self) -> GpuLocalUniforms {
        let [c0, c1, c2] = self.transform;
        GpuLocalUniforms {
            transform: [
                [c0[0], c0[1], c0[2], 0.0],
                [c1[0], c1[1], c1[2], 0.0],
                [c2[0], c2[1], c2[2], 0.0],
            ],
            color: self.color,
            round: self.round,
            _pad: [0.0; 3],
        }
    }

    fn value(&self, name: &str) -> Option<UniformValue> {
        match name {
            "uTransformMatrix" => Some(UniformValue::Mat3(self.transform)),
            "uColor" => Some(UniformValue::Vec4(self.color)),
            "uRound" => Some(UniformValue::F32(self.round)),
            _ => None,
        }
    }

    /// Runs the local-uniform bit on one vertex, the way both backends do.
    ///
    /// The output position is the model matrix applied to the input position,
    /// rounded to the pixel grid of `resolution` when `round == 1`.
    pub fn evaluate(&self, vertex: VertexSample, resolution: [f32; 2]) -> VertexSample {
        evaluate(&LOCAL_UNIFORM, self, vertex, resolution)
    }
}

fn evaluate(
    description: &BitDescription,
    uniforms: &LocalUniforms,
    mut vertex: VertexSample,
    resolution: [f32; 2],
) -> VertexSample {
    for step in description.compose {
        match (step.target, uniforms.value(step.uniform)) {
            (VertexValue::Color, Some(UniformValue::Vec4(color))) => {
                for (channel, factor) in vertex.color.iter_mut().zip(color) {
                    *channel *= factor;
                }
            }
            (VertexValue::ModelMatrix, Some(UniformValue::Mat3(transform))) => {
                vertex.model_matrix = mul(&vertex.model_matrix, &transform);
            }
            (target, value) => {
                tracing::warn!("Cannot fold {value:?} into {target:?}");
            }
        }
    }

    let [x, y] = vertex.position;
    let m = &vertex.model_matrix;
    let mut position = [
        m[0][0] * x + m[1][0] * y + m[2][0],
        m[0][1] * x + m[1][1] * y + m[2][1],
    ];

    if let Some(UniformValue::F32(flag)) = uniforms.value(description.round.flag) {
        if flag == 1.0 {
            position = round_pixels(position, resolution);
        }
    }

    vertex.position = position;
    vertex
}

/// Column-major `a * b`.
fn mul(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut out = [[0.0; 3]; 3];
    for (col, out_col) in out.iter_mut().enumerate() {
        for (row, cell) in out_col.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[k][row] * b[col][k]).sum();
        }
    }
    out
}

/// Snaps a clip-space position to the nearest pixel center of a `target_size` target.
pub fn round_pixels(position: [f32; 2], target_size: [f32; 2]) -> [f32; 2] {
    [0, 1].map(|i| {
        (((position[i] * 0.5 + 0.5) * target_size[i] + 0.5).floor() / target_size[i]) * 2.0 - 1.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VertexSample {
        VertexSample {
            color: [0.2, 0.4, 0.6, 0.8],
            model_matrix: IDENTITY,
            position: [0.25, -0.5],
        }
    }

    #[test]
    fn identity_uniforms_leave_vertex_unchanged() {
        let vertex = sample();
        assert_eq!(LocalUniforms::IDENTITY.evaluate(vertex, [800.0, 600.0]), vertex);
    }

    #[test]
    fn color_is_multiplied_channel_wise() {
        let uniforms = LocalUniforms::new(IDENTITY, 0xFF0000FF, false);
        let out = uniforms.evaluate(sample(), [1.0, 1.0]);
        assert_eq!(out.color, [0.2, 0.0, 0.0, 0.8]);
    }

    #[test]
    fn transform_translates_position() {
        let translate = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.5, 0.25, 1.0]];
        let uniforms = LocalUniforms {
            transform: translate,
            ..LocalUniforms::IDENTITY
        };
        let out = uniforms.evaluate(sample(), [1.0, 1.0]);
        assert_eq!(out.position, [0.75, -0.25]);
        assert_eq!(out.model_matrix, translate);
    }

    #[test]
    fn rounding_snaps_only_when_flag_is_one() {
        let mut vertex = sample();
        vertex.position = [0.013, 0.0];
        let resolution = [100.0, 100.0];

        let unrounded = LocalUniforms::IDENTITY.evaluate(vertex, resolution);
        assert_eq!(unrounded.position, [0.013, 0.0]);

        let rounded = LocalUniforms::new(IDENTITY, u32::MAX, true).evaluate(vertex, resolution);
        assert!((rounded.position[0] - 0.02).abs() < 1e-6);
        assert_eq!(rounded.position[1], 0.0);
    }

    #[test]
    fn every_described_uniform_has_a_value() {
        use crate::shader::bits::UniformType;

        let uniforms = LocalUniforms::IDENTITY;
        for field in LOCAL_UNIFORM.block.fields {
            let value = uniforms.value(field.name);
            let matches = matches!(
                (field.ty, value),
                (UniformType::Mat3, Some(UniformValue::Mat3(_)))
                    | (UniformType::Vec4, Some(UniformValue::Vec4(_)))
                    | (UniformType::F32, Some(UniformValue::F32(_)))
            );
            assert!(matches, "{} resolves to {value:?}", field.name);
        }

        let declared: Vec<_> = LOCAL_UNIFORM.block.fields.iter().map(|f| f.name).collect();
        for step in LOCAL_UNIFORM.compose {
            assert!(declared.contains(&step.uniform), "{}", step.uniform);
        }
        assert!(declared.contains(&LOCAL_UNIFORM.round.flag));
    }

    #[test]
    fn gpu_layout_is_eighty_bytes() {
        assert_eq!(std::mem::size_of::<GpuLocalUniforms>(), 80);
        let gpu = LocalUniforms::new(IDENTITY, 0xFFFFFFFF, true).to_gpu();
        assert_eq!(gpu.transform[2], [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(gpu.color, [1.0; 4]);
        assert_eq!(gpu.round, 1.0);
        assert_eq!(bytemuck::bytes_of(&gpu).len(), 80);
    }
}
