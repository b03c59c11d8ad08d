use crate::blend_mode::BlendMode;

/// Whether the filter output is antialiased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Antialias {
    On,
    #[default]
    Off,
    /// Follow the render target.
    Inherit,
}

impl From<bool> for Antialias {
    fn from(value: bool) -> Self {
        if value {
            Antialias::On
        } else {
            Antialias::Off
        }
    }
}

/// Resolution of the filter's intermediate textures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Value(f32),
    /// Follow the render target.
    Inherit,
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::Value(1.0)
    }
}

impl From<f32> for Resolution {
    fn from(value: f32) -> Self {
        Resolution::Value(value)
    }
}

/// A complete set of filter options. Each effect type has one as its defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterDefaults {
    pub blend_mode: BlendMode,
    pub resolution: Resolution,
    /// Extra pixels sampled around the filter area.
    pub padding: f32,
    pub antialias: Antialias,
    /// Whether the filter samples what is already in the framebuffer.
    pub blend_required: bool,
    pub clip_to_viewport: bool,
}

impl FilterDefaults {
    pub const DEFAULT: Self = Self {
        blend_mode: BlendMode::Normal,
        resolution: Resolution::Value(1.0),
        padding: 0.0,
        antialias: Antialias::Off,
        blend_required: false,
        clip_to_viewport: true,
    };

    /// Applies every `Some` field of `options` over these defaults.
    pub fn merge(&self, options: &FilterOptions) -> FilterDefaults {
        FilterDefaults {
            blend_mode: options.blend_mode.unwrap_or(self.blend_mode),
            resolution: options.resolution.unwrap_or(self.resolution),
            padding: options.padding.unwrap_or(self.padding),
            antialias: options.antialias.unwrap_or(self.antialias),
            blend_required: options.blend_required.unwrap_or(self.blend_required),
            clip_to_viewport: options.clip_to_viewport.unwrap_or(self.clip_to_viewport),
        }
    }
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Caller overrides. `None` keeps the effect's default.
///
/// ```
/// use rendition::{Antialias, BlendMode, FilterDefaults, FilterOptions};
///
/// let options = FilterOptions::new()
///     .blend_mode(BlendMode::Screen)
///     .antialias(true)
///     .padding(4.0);
///
/// let merged = FilterDefaults::DEFAULT.merge(&options);
/// assert_eq!(merged.blend_mode, BlendMode::Screen);
/// assert_eq!(merged.antialias, Antialias::On);
/// assert!(merged.clip_to_viewport);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterOptions {
    pub blend_mode: Option<BlendMode>,
    pub resolution: Option<Resolution>,
    pub padding: Option<f32>,
    pub antialias: Option<Antialias>,
    pub blend_required: Option<bool>,
    pub clip_to_viewport: Option<bool>,
}

impl FilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = Some(blend_mode);
        self
    }

    pub fn resolution(mut self, resolution: impl Into<Resolution>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    pub fn padding(mut self, padding: f32) -> Self {
        self.padding = Some(padding);
        self
    }

    /// Accepts an [`Antialias`] or a plain `bool` (`true` → `On`, `false` → `Off`).
    pub fn antialias(mut self, antialias: impl Into<Antialias>) -> Self {
        self.antialias = Some(antialias.into());
        self
    }

    pub fn blend_required(mut self, blend_required: bool) -> Self {
        self.blend_required = Some(blend_required);
        self
    }

    pub fn clip_to_viewport(mut self, clip_to_viewport: bool) -> Self {
        self.clip_to_viewport = Some(clip_to_viewport);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_options_keep_defaults() {
        assert_eq!(
            FilterDefaults::DEFAULT.merge(&FilterOptions::new()),
            FilterDefaults::DEFAULT
        );
    }

    #[test]
    fn caller_values_win() {
        let defaults = FilterDefaults {
            padding: 8.0,
            antialias: Antialias::Inherit,
            ..FilterDefaults::DEFAULT
        };
        let merged = defaults.merge(
            &FilterOptions::new()
                .padding(2.0)
                .resolution(Resolution::Inherit)
                .clip_to_viewport(false),
        );

        assert_eq!(merged.padding, 2.0);
        assert_eq!(merged.resolution, Resolution::Inherit);
        assert!(!merged.clip_to_viewport);
        assert_eq!(merged.antialias, Antialias::Inherit);
    }

    #[test]
    fn bool_antialias_normalizes() {
        assert_eq!(FilterOptions::new().antialias(true).antialias, Some(Antialias::On));
        assert_eq!(FilterOptions::new().antialias(false).antialias, Some(Antialias::Off));
        assert_eq!(
            FilterOptions::new().antialias(Antialias::Inherit).antialias,
            Some(Antialias::Inherit)
        );
    }
}
