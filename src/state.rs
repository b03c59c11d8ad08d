//! Fixed-function pipeline toggles packed into a single bitmask.

use std::sync::OnceLock;

use bitflags::bitflags;

use crate::blend_mode::BlendMode;

/// Bit positions inside [`RenderState::data`].
pub mod bit {
    pub const BLEND: u32 = 0;
    pub const OFFSET: u32 = 1;
    pub const CULLING: u32 = 2;
    pub const DEPTH_TEST: u32 = 3;
    pub const WINDING: u32 = 4;
    pub const DEPTH_MASK: u32 = 5;
}

bitflags! {
    /// The raw toggle set. Each flag is exactly one bit, see [`bit`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StateFlags: u32 {
        const BLEND = 1 << bit::BLEND;
        const OFFSET = 1 << bit::OFFSET;
        const CULLING = 1 << bit::CULLING;
        const DEPTH_TEST = 1 << bit::DEPTH_TEST;
        const WINDING = 1 << bit::WINDING;
        const DEPTH_MASK = 1 << bit::DEPTH_MASK;
    }
}

/// Face culling as seen by callers. Stored as the CULLING and WINDING bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    #[default]
    None,
    Front,
    Back,
}

/// GPU pipeline state applied before a draw call: blending, depth test and mask,
/// culling, winding and polygon offset.
///
/// Boolean toggles live in one bitmask so that two states can be compared or
/// hashed cheaply. The blend mode and polygon offset are cached next to it.
///
/// ```
/// use rendition::{BlendMode, CullMode, RenderState};
///
/// let mut state = RenderState::for_2d();
/// state.set_blend_mode(BlendMode::Add);
/// state.set_cull_mode(CullMode::Front);
///
/// assert_eq!(state.blend_mode_id(), 1);
/// assert!(state.culling());
/// assert!(state.clockwise_front_face());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    data: StateFlags,
    blend_mode: BlendMode,
    blend_mode_id: u32,
    polygon_offset: f32,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            data: StateFlags::BLEND | StateFlags::DEPTH_MASK,
            blend_mode: BlendMode::Normal,
            blend_mode_id: BlendMode::Normal.id(),
            polygon_offset: 0.0,
        }
    }
}

static SHARED_2D: OnceLock<RenderState> = OnceLock::new();

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The canonical state for 2D rendering: blending on, no depth test.
    pub fn for_2d() -> Self {
        let mut state = Self::new();
        state.set_depth_test(false);
        state.set_blend(true);
        state
    }

    /// A process-wide 2D preset. Copy it before changing anything.
    pub fn shared_2d() -> &'static RenderState {
        SHARED_2D.get_or_init(Self::for_2d)
    }

    /// The raw bitmask.
    #[inline]
    pub fn data(&self) -> u32 {
        self.data.bits()
    }

    #[inline]
    pub fn flags(&self) -> StateFlags {
        self.data
    }

    #[inline]
    fn set_flag(&mut self, flag: StateFlags, value: bool) {
        if self.data.contains(flag) != value {
            self.data.toggle(flag);
        }
    }

    #[inline]
    pub fn blend(&self) -> bool {
        self.data.contains(StateFlags::BLEND)
    }

    pub fn set_blend(&mut self, value: bool) {
        self.set_flag(StateFlags::BLEND, value);
    }

    /// Whether polygon offset is active.
    #[inline]
    pub fn offsets(&self) -> bool {
        self.data.contains(StateFlags::OFFSET)
    }

    pub fn set_offsets(&mut self, value: bool) {
        self.set_flag(StateFlags::OFFSET, value);
    }

    #[inline]
    pub fn culling(&self) -> bool {
        self.data.contains(StateFlags::CULLING)
    }

    pub fn set_culling(&mut self, value: bool) {
        self.set_flag(StateFlags::CULLING, value);
    }

    #[inline]
    pub fn depth_test(&self) -> bool {
        self.data.contains(StateFlags::DEPTH_TEST)
    }

    pub fn set_depth_test(&mut self, value: bool) {
        self.set_flag(StateFlags::DEPTH_TEST, value);
    }

    #[inline]
    pub fn depth_mask(&self) -> bool {
        self.data.contains(StateFlags::DEPTH_MASK)
    }

    pub fn set_depth_mask(&mut self, value: bool) {
        self.set_flag(StateFlags::DEPTH_MASK, value);
    }

    /// Winding: true when clockwise triangles are front facing.
    #[inline]
    pub fn clockwise_front_face(&self) -> bool {
        self.data.contains(StateFlags::WINDING)
    }

    pub fn set_clockwise_front_face(&mut self, value: bool) {
        self.set_flag(StateFlags::WINDING, value);
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn blend_mode_id(&self) -> u32 {
        self.blend_mode_id
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.set_blend(mode != BlendMode::None);
        self.blend_mode = mode;
        self.blend_mode_id = mode.id();
    }

    /// Sets the blend mode from its name.
    ///
    /// Names outside the table fall back to `normal` (id 0) with blending on.
    pub fn set_blend_mode_name(&mut self, name: &str) {
        let mode = BlendMode::from_name(name).unwrap_or_else(|| {
            tracing::warn!("Unknown blend mode `{name}`, falling back to normal");
            BlendMode::Normal
        });
        self.set_blend_mode(mode);
    }

    pub fn polygon_offset(&self) -> f32 {
        self.polygon_offset
    }

    pub fn set_polygon_offset(&mut self, value: f32) {
        self.set_offsets(value != 0.0);
        self.polygon_offset = value;
    }

    pub fn cull_mode(&self) -> CullMode {
        if !self.culling() {
            CullMode::None
        } else if self.clockwise_front_face() {
            CullMode::Front
        } else {
            CullMode::Back
        }
    }

    pub fn set_cull_mode(&mut self, mode: CullMode) {
        if mode == CullMode::None {
            self.set_culling(false);
            return;
        }

        self.set_culling(true);
        self.set_clockwise_front_face(mode == CullMode::Front);
    }

    /// Primitive state for a pipeline drawing with this state.
    ///
    /// Culling always discards back faces; the winding bit decides which faces
    /// count as front.
    pub fn primitive_state(&self, topology: wgpu::PrimitiveTopology) -> wgpu::PrimitiveState {
        wgpu::PrimitiveState {
            topology,
            front_face: if self.clockwise_front_face() {
                wgpu::FrontFace::Cw
            } else {
                wgpu::FrontFace::Ccw
            },
            cull_mode: self.culling().then_some(wgpu::Face::Back),
            ..Default::default()
        }
    }

    /// Depth/stencil state for a target with the given depth format.
    ///
    /// The polygon offset becomes the constant depth bias (truncated to whole units)
    /// with a unit slope factor.
    pub fn depth_stencil_state(&self, format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
        let bias = if self.offsets() {
            wgpu::DepthBiasState {
                constant: self.polygon_offset as i32,
                slope_scale: 1.0,
                clamp: 0.0,
            }
        } else {
            wgpu::DepthBiasState::default()
        };

        wgpu::DepthStencilState {
            format,
            depth_write_enabled: self.depth_mask(),
            depth_compare: if self.depth_test() {
                wgpu::CompareFunction::Less
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias,
        }
    }

    /// Blend state of the current mode, `None` when the BLEND bit is off.
    pub fn blend_state(&self) -> Option<wgpu::BlendState> {
        if !self.blend() {
            return None;
        }
        self.blend_mode.blend_state()
    }
}
