use std::sync::atomic::{AtomicU64, Ordering};

use super::color::{rgb_to_rgba, rgb_to_rgbaw, rgb_to_rgbw, rgba_to_rgb, rgbw_to_rgb, Color, ColorStrategy, Raw};

fn to_dmx(v: f64) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scaled = (v * 255.0) as i64;
    scaled.clamp(0, 255) as u8
}

fn to_dmx_16bit(v: f64) -> (u8, u8) {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scaled = (v * 65535.0) as i64;
    let val = scaled.clamp(0, 65535) as u32;
    #[allow(clippy::cast_possible_truncation)]
    ((val >> 8) as u8, (val & 0xFF) as u8)
}

/// The value an [`Attribute`] reads and writes, and the shape a
/// `FixtureState` entry can hold: a normalized scalar, a normalized
/// tuple, a [`Color`], or a [`Raw`] tuple that bypasses conversion.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum AttrValue {
    Scalar(f64),
    Tuple(Vec<f64>),
    Color(Color),
    Raw(Raw),
}

impl AttrValue {
    #[must_use]
    pub fn scalar(&self) -> f64 {
        match self {
            AttrValue::Scalar(v) => *v,
            AttrValue::Tuple(t) => t.first().copied().unwrap_or(0.0),
            AttrValue::Color(c) => c.r(),
            AttrValue::Raw(r) => r.channels().first().copied().unwrap_or(0.0),
        }
    }

    /// Whether this value is a [`Raw`] tuple, meaning conversion must be
    /// bypassed for it.
    #[must_use]
    pub fn is_raw(&self) -> bool {
        matches!(self, AttrValue::Raw(_))
    }

    fn channel(&self, index: usize) -> f64 {
        match self {
            AttrValue::Scalar(v) => {
                if index == 0 {
                    *v
                } else {
                    0.0
                }
            }
            AttrValue::Tuple(t) => t.get(index).copied().unwrap_or(0.0),
            AttrValue::Color(c) => c.channel(index),
            AttrValue::Raw(r) => r.channels().get(index).copied().unwrap_or(0.0),
        }
    }

    fn len(&self) -> usize {
        match self {
            AttrValue::Scalar(_) => 1,
            AttrValue::Tuple(t) => t.len(),
            AttrValue::Color(c) => c.channels().len(),
            AttrValue::Raw(r) => r.channels().len(),
        }
    }

    fn as_tuple(&self, arity: usize) -> AttrValue {
        AttrValue::Tuple((0..arity).map(|i| self.channel(i)).collect())
    }
}

/// A composable, DMX-addressable fixture capability: a dimmer channel,
/// an RGB(W/A) color channel group, a pan/tilt axis, and so on.
///
/// `convert` maps an arbitrary input shape (e.g. any color representation)
/// into this attribute's native value shape; `encode` turns a native
/// per-segment value into the raw DMX bytes occupying
/// `channel_count / segments` channels.
pub trait Attribute: std::fmt::Debug + Send + Sync {
    /// Logical name this attribute responds to in a fixture's state
    /// (e.g. `"dimmer"`, `"color"`, `"pan"`).
    fn name(&self) -> &str;

    /// An alternate key that bypasses [`Attribute::convert`] entirely,
    /// if this attribute supports raw passthrough (color attributes do).
    fn raw_name(&self) -> Option<&str> {
        None
    }

    /// Total channels this attribute occupies, `segments * base_channels`.
    fn channel_count(&self) -> usize;

    /// Number of independently addressable segments (>= 1). Only
    /// meaningful for `name() == "color"` attributes per spec §4.3.
    fn segments(&self) -> usize {
        1
    }

    fn default_value(&self) -> AttrValue;

    /// Convert an arbitrary-shaped input into this attribute's native
    /// value shape. Identity by default; color attributes override it.
    fn convert(&self, value: &AttrValue) -> AttrValue {
        value.clone()
    }

    /// Encode a value for exactly one segment's worth of bytes.
    fn encode(&self, value: &AttrValue) -> Vec<u8>;
}

#[derive(Debug, Clone)]
pub struct DimmerAttr {
    pub name: String,
    pub fine: bool,
}

impl DimmerAttr {
    #[must_use]
    pub fn new(fine: bool) -> Self {
        Self { name: "dimmer".to_string(), fine }
    }
}

impl Default for DimmerAttr {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Attribute for DimmerAttr {
    fn name(&self) -> &str {
        &self.name
    }

    fn channel_count(&self) -> usize {
        if self.fine {
            2
        } else {
            1
        }
    }

    fn default_value(&self) -> AttrValue {
        AttrValue::Scalar(0.0)
    }

    fn encode(&self, value: &AttrValue) -> Vec<u8> {
        let v = value.scalar();
        if self.fine {
            let (coarse, fine) = to_dmx_16bit(v);
            vec![coarse, fine]
        } else {
            vec![to_dmx(v)]
        }
    }
}

/// Shared conversion helper for the four color-attribute variants: turns
/// an arbitrary input value into a plain RGB tuple of the given minimum
/// length, unless the value is [`Raw`] (bypasses conversion entirely).
fn as_rgb_channels(value: &AttrValue) -> (f64, f64, f64) {
    if value.len() >= 4 {
        if let AttrValue::Tuple(_) | AttrValue::Color(_) = value {
            let (r, g, b) = rgbw_to_rgb(value.channel(0), value.channel(1), value.channel(2), value.channel(3));
            return (r, g, b);
        }
    }
    (value.channel(0), value.channel(1), value.channel(2))
}

#[derive(Debug, Clone)]
pub struct RgbAttr {
    pub strategy: Option<ColorStrategy>,
    pub segments: usize,
}

impl RgbAttr {
    #[must_use]
    pub fn new(segments: usize) -> Self {
        Self { strategy: None, segments }
    }
}

impl Default for RgbAttr {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Attribute for RgbAttr {
    fn name(&self) -> &str {
        "color"
    }

    fn raw_name(&self) -> Option<&str> {
        Some("raw_rgb")
    }

    fn channel_count(&self) -> usize {
        3 * self.segments
    }

    fn segments(&self) -> usize {
        self.segments
    }

    fn default_value(&self) -> AttrValue {
        AttrValue::Tuple(vec![0.0, 0.0, 0.0])
    }

    fn convert(&self, value: &AttrValue) -> AttrValue {
        if value.is_raw() {
            return value.as_tuple(3);
        }
        let (r, g, b) = as_rgb_channels(value);
        AttrValue::Tuple(vec![r, g, b])
    }

    fn encode(&self, value: &AttrValue) -> Vec<u8> {
        (0..3).map(|i| to_dmx(value.channel(i))).collect()
    }
}

#[derive(Debug, Clone)]
pub struct RgbwAttr {
    pub strategy: Option<ColorStrategy>,
    pub segments: usize,
}

impl RgbwAttr {
    #[must_use]
    pub fn new(segments: usize) -> Self {
        Self { strategy: None, segments }
    }
}

impl Default for RgbwAttr {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Attribute for RgbwAttr {
    fn name(&self) -> &str {
        "color"
    }

    fn raw_name(&self) -> Option<&str> {
        Some("raw_rgbw")
    }

    fn channel_count(&self) -> usize {
        4 * self.segments
    }

    fn segments(&self) -> usize {
        self.segments
    }

    fn default_value(&self) -> AttrValue {
        AttrValue::Tuple(vec![0.0, 0.0, 0.0, 0.0])
    }

    fn convert(&self, value: &AttrValue) -> AttrValue {
        if value.is_raw() {
            return value.as_tuple(4);
        }
        if value.len() >= 4 {
            return value.as_tuple(4);
        }
        let (r, g, b, w) = rgb_to_rgbw(value.channel(0), value.channel(1), value.channel(2), self.strategy);
        AttrValue::Tuple(vec![r, g, b, w])
    }

    fn encode(&self, value: &AttrValue) -> Vec<u8> {
        (0..4).map(|i| to_dmx(value.channel(i))).collect()
    }
}

#[derive(Debug, Clone)]
pub struct RgbaAttr {
    pub segments: usize,
}

impl RgbaAttr {
    #[must_use]
    pub fn new(segments: usize) -> Self {
        Self { segments }
    }
}

impl Default for RgbaAttr {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Attribute for RgbaAttr {
    fn name(&self) -> &str {
        "color"
    }

    fn raw_name(&self) -> Option<&str> {
        Some("raw_rgba")
    }

    fn channel_count(&self) -> usize {
        4 * self.segments
    }

    fn segments(&self) -> usize {
        self.segments
    }

    fn default_value(&self) -> AttrValue {
        AttrValue::Tuple(vec![0.0, 0.0, 0.0, 0.0])
    }

    fn convert(&self, value: &AttrValue) -> AttrValue {
        if value.is_raw() {
            return value.as_tuple(4);
        }
        if value.len() >= 4 {
            return value.as_tuple(4);
        }
        let (r, g, b, a) = rgb_to_rgba(value.channel(0), value.channel(1), value.channel(2));
        AttrValue::Tuple(vec![r, g, b, a])
    }

    fn encode(&self, value: &AttrValue) -> Vec<u8> {
        (0..4).map(|i| to_dmx(value.channel(i))).collect()
    }
}

#[derive(Debug, Clone)]
pub struct RgbawAttr {
    pub strategy: Option<ColorStrategy>,
    pub segments: usize,
}

impl RgbawAttr {
    #[must_use]
    pub fn new(segments: usize) -> Self {
        Self { strategy: None, segments }
    }
}

impl Default for RgbawAttr {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Attribute for RgbawAttr {
    fn name(&self) -> &str {
        "color"
    }

    fn raw_name(&self) -> Option<&str> {
        Some("raw_rgbaw")
    }

    fn channel_count(&self) -> usize {
        5 * self.segments
    }

    fn segments(&self) -> usize {
        self.segments
    }

    fn default_value(&self) -> AttrValue {
        AttrValue::Tuple(vec![0.0, 0.0, 0.0, 0.0, 0.0])
    }

    fn convert(&self, value: &AttrValue) -> AttrValue {
        if value.is_raw() {
            return value.as_tuple(5);
        }
        if value.len() >= 5 {
            return value.as_tuple(5);
        }
        let (r, g, b, a, w) = rgb_to_rgbaw(value.channel(0), value.channel(1), value.channel(2));
        AttrValue::Tuple(vec![r, g, b, a, w])
    }

    fn encode(&self, value: &AttrValue) -> Vec<u8> {
        (0..5).map(|i| to_dmx(value.channel(i))).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StrobeAttr;

impl Attribute for StrobeAttr {
    fn name(&self) -> &str {
        "strobe"
    }

    fn channel_count(&self) -> usize {
        1
    }

    fn default_value(&self) -> AttrValue {
        AttrValue::Scalar(0.0)
    }

    fn encode(&self, value: &AttrValue) -> Vec<u8> {
        vec![to_dmx(value.scalar())]
    }
}

#[derive(Debug, Clone)]
pub struct PanAttr {
    pub fine: bool,
}

impl Attribute for PanAttr {
    fn name(&self) -> &str {
        "pan"
    }

    fn channel_count(&self) -> usize {
        if self.fine {
            2
        } else {
            1
        }
    }

    fn default_value(&self) -> AttrValue {
        AttrValue::Scalar(0.5)
    }

    fn encode(&self, value: &AttrValue) -> Vec<u8> {
        let v = value.scalar();
        if self.fine {
            let (coarse, fine) = to_dmx_16bit(v);
            vec![coarse, fine]
        } else {
            vec![to_dmx(v)]
        }
    }
}

#[derive(Debug, Clone)]
pub struct TiltAttr {
    pub fine: bool,
}

impl Attribute for TiltAttr {
    fn name(&self) -> &str {
        "tilt"
    }

    fn channel_count(&self) -> usize {
        if self.fine {
            2
        } else {
            1
        }
    }

    fn default_value(&self) -> AttrValue {
        AttrValue::Scalar(0.5)
    }

    fn encode(&self, value: &AttrValue) -> Vec<u8> {
        let v = value.scalar();
        if self.fine {
            let (coarse, fine) = to_dmx_16bit(v);
            vec![coarse, fine]
        } else {
            vec![to_dmx(v)]
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GoboAttr;

impl Attribute for GoboAttr {
    fn name(&self) -> &str {
        "gobo"
    }

    fn channel_count(&self) -> usize {
        1
    }

    fn default_value(&self) -> AttrValue {
        AttrValue::Scalar(0.0)
    }

    fn encode(&self, value: &AttrValue) -> Vec<u8> {
        vec![to_dmx(value.scalar())]
    }
}

static SKIP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Placeholder for unused/reserved channels in a fixture's channel
/// layout. Each instance gets a unique synthetic name so two skips in
/// the same fixture type never collide as state keys.
#[derive(Debug, Clone)]
pub struct SkipAttr {
    pub count: usize,
    name: String,
}

impl SkipAttr {
    #[must_use]
    pub fn new(count: usize) -> Self {
        let id = SKIP_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self { count, name: format!("_skip_{id}") }
    }
}

impl Attribute for SkipAttr {
    fn name(&self) -> &str {
        &self.name
    }

    fn channel_count(&self) -> usize {
        self.count
    }

    fn default_value(&self) -> AttrValue {
        AttrValue::Scalar(0.0)
    }

    fn encode(&self, _value: &AttrValue) -> Vec<u8> {
        vec![0; self.count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimmer_fine_splits_into_coarse_and_fine_bytes() {
        let attr = DimmerAttr::new(true);
        let bytes = attr.encode(&AttrValue::Scalar(1.0));
        assert_eq!(bytes, vec![255, 255]);
    }

    #[test]
    fn dimmer_coarse_only_clamps() {
        let attr = DimmerAttr::new(false);
        assert_eq!(attr.encode(&AttrValue::Scalar(2.0)), vec![255]);
        assert_eq!(attr.encode(&AttrValue::Scalar(-1.0)), vec![0]);
    }

    #[test]
    fn rgb_convert_from_rgbw_drops_white() {
        let attr = RgbAttr::default();
        let converted = attr.convert(&AttrValue::Tuple(vec![0.0, 0.0, 0.0, 1.0]));
        assert_eq!(converted, AttrValue::Tuple(vec![1.0, 1.0, 1.0]));
    }

    #[test]
    fn rgbw_convert_from_rgb_extracts_white() {
        let mut attr = RgbwAttr::default();
        attr.strategy = Some(ColorStrategy::Balanced);
        let converted = attr.convert(&AttrValue::Tuple(vec![1.0, 1.0, 1.0]));
        assert_eq!(converted, AttrValue::Tuple(vec![0.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn rgbw_segmented_attribute_channel_count_scales() {
        let attr = RgbwAttr::new(4);
        assert_eq!(attr.channel_count(), 16);
        assert_eq!(attr.segments(), 4);
    }

    #[test]
    fn raw_bypasses_color_conversion() {
        let attr = RgbwAttr::default();
        let raw = AttrValue::Raw(Raw::new(vec![0.1, 0.2, 0.3, 0.4]));
        assert_eq!(attr.convert(&raw), AttrValue::Tuple(vec![0.1, 0.2, 0.3, 0.4]));
    }

    #[test]
    fn skip_attrs_get_distinct_names() {
        let a = SkipAttr::new(1);
        let b = SkipAttr::new(1);
        assert_ne!(a.name(), b.name());
        assert_eq!(a.encode(&AttrValue::Scalar(0.0)), vec![0]);
    }

    #[test]
    fn pan_default_is_centered() {
        let attr = PanAttr { fine: false };
        assert_eq!(attr.default_value(), AttrValue::Scalar(0.5));
    }
}
