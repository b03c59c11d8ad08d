//! Named blend modes and their GPU representation.
//!
//! Every mode has a small integer id that the GPU-state code uses as a cache key,
//! and a [`wgpu::BlendState`] describing how it combines premultiplied color with
//! the framebuffer.

use std::fmt;
use std::str::FromStr;

/// Rule for combining a fragment's color with the color already in the target.
///
/// `None` is the sentinel that turns blending off entirely; it is not part of the
/// id table and reports id `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    Add,
    Multiply,
    Screen,
    Overlay,
    Erase,
    NormalNpm,
    AddNpm,
    ScreenNpm,
    Min,
    Max,
    /// Disables blending.
    None,
}

impl BlendMode {
    /// Every mode that has an entry in the id table, in id order.
    pub const ALL: [BlendMode; 11] = [
        BlendMode::Normal,
        BlendMode::Add,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::Erase,
        BlendMode::NormalNpm,
        BlendMode::AddNpm,
        BlendMode::ScreenNpm,
        BlendMode::Min,
        BlendMode::Max,
    ];

    /// The wire id consumed by the GPU-state code.
    pub fn id(self) -> u32 {
        match self {
            BlendMode::Normal => 0,
            BlendMode::Add => 1,
            BlendMode::Multiply => 2,
            BlendMode::Screen => 3,
            BlendMode::Overlay => 4,
            BlendMode::Erase => 5,
            BlendMode::NormalNpm => 6,
            BlendMode::AddNpm => 7,
            BlendMode::ScreenNpm => 8,
            BlendMode::Min => 9,
            BlendMode::Max => 10,
            BlendMode::None => 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Add => "add",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Erase => "erase",
            BlendMode::NormalNpm => "normal-npm",
            BlendMode::AddNpm => "add-npm",
            BlendMode::ScreenNpm => "screen-npm",
            BlendMode::Min => "min",
            BlendMode::Max => "max",
            BlendMode::None => "none",
        }
    }

    /// Looks a mode up by its name. Returns `None` for names outside the table.
    pub fn from_name(name: &str) -> Option<Self> {
        let mode = match name {
            "normal" => BlendMode::Normal,
            "add" => BlendMode::Add,
            "multiply" => BlendMode::Multiply,
            "screen" => BlendMode::Screen,
            "overlay" => BlendMode::Overlay,
            "erase" => BlendMode::Erase,
            "normal-npm" => BlendMode::NormalNpm,
            "add-npm" => BlendMode::AddNpm,
            "screen-npm" => BlendMode::ScreenNpm,
            "min" => BlendMode::Min,
            "max" => BlendMode::Max,
            "none" => BlendMode::None,
            _ => return None,
        };
        Some(mode)
    }

    /// Builds the blend state for this mode, or `None` when blending is disabled.
    ///
    /// Colors are expected to be premultiplied, except for the `*Npm` modes which
    /// scale the source color by its alpha themselves.
    pub fn blend_state(self) -> Option<wgpu::BlendState> {
        use wgpu::BlendFactor as F;
        use wgpu::BlendOperation as Op;

        let (color, alpha) = match self {
            BlendMode::None => return None,
            BlendMode::Normal => (
                component(F::One, F::OneMinusSrcAlpha, Op::Add),
                component(F::One, F::OneMinusSrcAlpha, Op::Add),
            ),
            BlendMode::Add => (
                component(F::One, F::One, Op::Add),
                component(F::One, F::One, Op::Add),
            ),
            BlendMode::Multiply => (
                component(F::Dst, F::OneMinusSrcAlpha, Op::Add),
                component(F::One, F::OneMinusSrcAlpha, Op::Add),
            ),
            BlendMode::Screen | BlendMode::Overlay => (
                component(F::One, F::OneMinusSrc, Op::Add),
                component(F::One, F::OneMinusSrcAlpha, Op::Add),
            ),
            BlendMode::Erase => (
                component(F::Zero, F::OneMinusSrcAlpha, Op::Add),
                component(F::Zero, F::OneMinusSrcAlpha, Op::Add),
            ),
            BlendMode::NormalNpm => (
                component(F::SrcAlpha, F::OneMinusSrcAlpha, Op::Add),
                component(F::One, F::OneMinusSrcAlpha, Op::Add),
            ),
            BlendMode::AddNpm => (
                component(F::SrcAlpha, F::One, Op::Add),
                component(F::One, F::One, Op::Add),
            ),
            BlendMode::ScreenNpm => (
                component(F::SrcAlpha, F::OneMinusSrc, Op::Add),
                component(F::One, F::OneMinusSrcAlpha, Op::Add),
            ),
            // Min/max ignore the factors, wgpu requires them to be One.
            BlendMode::Min => (
                component(F::One, F::One, Op::Min),
                component(F::One, F::One, Op::Min),
            ),
            BlendMode::Max => (
                component(F::One, F::One, Op::Max),
                component(F::One, F::One, Op::Max),
            ),
        };

        Some(wgpu::BlendState { color, alpha })
    }
}

#[inline]
fn component(
    src_factor: wgpu::BlendFactor,
    dst_factor: wgpu::BlendFactor,
    operation: wgpu::BlendOperation,
) -> wgpu::BlendComponent {
    wgpu::BlendComponent {
        src_factor,
        dst_factor,
        operation,
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned by [`BlendMode::from_str`] for names outside the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown blend mode `{0}`")]
pub struct UnknownBlendMode(pub String);

impl FromStr for BlendMode {
    type Err = UnknownBlendMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlendMode::from_name(s).ok_or_else(|| UnknownBlendMode(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_table_order() {
        for (expected, mode) in BlendMode::ALL.iter().enumerate() {
            assert_eq!(mode.id(), expected as u32, "{mode}");
        }
    }

    #[test]
    fn names_round_trip_through_from_name() {
        for mode in BlendMode::ALL {
            assert_eq!(BlendMode::from_name(mode.name()), Some(mode));
        }
        assert_eq!(BlendMode::from_name("none"), Some(BlendMode::None));
        assert_eq!(BlendMode::from_name("color-dodge"), None);
    }

    #[test]
    fn from_str_reports_unknown_name() {
        let err = "darken".parse::<BlendMode>().unwrap_err();
        assert_eq!(err, UnknownBlendMode("darken".into()));
        assert_eq!("add-npm".parse::<BlendMode>(), Ok(BlendMode::AddNpm));
    }

    #[test]
    fn none_has_no_blend_state() {
        assert!(BlendMode::None.blend_state().is_none());
        assert_eq!(BlendMode::None.id(), 0);
    }

    #[test]
    fn normal_blend_state_is_premultiplied_source_over() {
        let state = BlendMode::Normal.blend_state().unwrap();
        assert_eq!(state.color.src_factor, wgpu::BlendFactor::One);
        assert_eq!(state.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
        assert_eq!(state, wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING);
    }

    #[test]
    fn min_and_max_use_unit_factors() {
        for mode in [BlendMode::Min, BlendMode::Max] {
            let state = mode.blend_state().unwrap();
            assert_eq!(state.color.src_factor, wgpu::BlendFactor::One);
            assert_eq!(state.color.dst_factor, wgpu::BlendFactor::One);
            assert_eq!(state.alpha.src_factor, wgpu::BlendFactor::One);
            assert_eq!(state.alpha.dst_factor, wgpu::BlendFactor::One);
        }
    }
}
