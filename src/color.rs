/// Converts a packed ABGR color into premultiplied, normalized RGBA floats.
///
/// `abgr` stores alpha in bits 24-31, blue in 16-23, green in 8-15 and red in 0-7.
/// The four channels are written to `out[offset..offset + 4]` in R, G, B, A order,
/// with the color channels already multiplied by alpha.
///
/// # Panics
///
/// Panics if `out` is shorter than `offset + 4`.
///
/// # Examples
///
/// ```
/// use rendition::pack_color;
///
/// let mut out = [0.0; 8];
/// pack_color(0xFF0000FF, &mut out, 4);
/// assert_eq!(out[4..], [1.0, 0.0, 0.0, 1.0]);
/// ```
#[inline]
pub fn pack_color(abgr: u32, out: &mut [f32], offset: usize) {
    let alpha = ((abgr >> 24) & 0xFF) as f32 / 255.0;

    out[offset] = ((abgr & 0xFF) as f32 / 255.0) * alpha;
    out[offset + 1] = (((abgr >> 8) & 0xFF) as f32 / 255.0) * alpha;
    out[offset + 2] = (((abgr >> 16) & 0xFF) as f32 / 255.0) * alpha;
    out[offset + 3] = alpha;
}

/// Represents a color in RGBA format.
///
/// Each channel is an 8-bit unsigned integer. Renderables hand colors to the
/// batcher in the packed ABGR layout, see [`Color::to_abgr`].
///
/// # Examples
///
/// ```
/// use rendition::Color;
///
/// let semi_red = Color::rgba(255, 0, 0, 128);
/// assert_eq!(semi_red.to_abgr(), 0x800000FF);
/// assert_eq!(Color::from_abgr(0x800000FF), semi_red);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub [u8; 4]);

impl Color {
    /// A fully transparent color.
    pub const TRANSPARENT: Self = Self([0, 0, 0, 0]);
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    pub const WHITE: Self = Self([255, 255, 255, 255]);

    /// Creates a new color with full opacity.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Unpacks a color stored as `0xAABBGGRR`.
    pub fn from_abgr(abgr: u32) -> Self {
        let [r, g, b, a] = abgr.to_le_bytes();
        Self([r, g, b, a])
    }

    /// Packs the color as `0xAABBGGRR`.
    pub fn to_abgr(&self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    /// Normalizes the channels to `[0.0, 1.0]` without premultiplying.
    pub fn normalize(&self) -> [f32; 4] {
        self.0.map(|channel| channel as f32 / 255.0)
    }

    /// Normalized channels with red, green and blue multiplied by alpha.
    pub fn premultiplied(&self) -> [f32; 4] {
        let mut out = [0.0; 4];
        pack_color(self.to_abgr(), &mut out, 0);
        out
    }

    pub fn to_array(&self) -> [u8; 4] {
        self.0
    }
}
