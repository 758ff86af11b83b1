use std::sync::atomic::{AtomicU8, Ordering};

/// Process-wide strategy for extracting a white (and amber) component when
/// converting RGB into a fixture's native color format. Set once at
/// startup via [`set_color_strategy`]; read by attribute codecs during
/// [`crate::model::fixture::FixtureType`] construction and encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorStrategy {
    /// Extract white from the common RGB component (default).
    Balanced,
    /// Keep RGB as-is; white is always 0.
    PreserveRgb,
    /// Maximize white LED usage, rescaling the residual RGB.
    MaxWhite,
}

impl Default for ColorStrategy {
    fn default() -> Self {
        ColorStrategy::Balanced
    }
}

impl ColorStrategy {
    /// Parse a strategy from a configuration string. Case-insensitive.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "balanced" => Some(ColorStrategy::Balanced),
            "preserve_rgb" => Some(ColorStrategy::PreserveRgb),
            "max_white" => Some(ColorStrategy::MaxWhite),
            _ => None,
        }
    }

    const fn as_u8(self) -> u8 {
        match self {
            ColorStrategy::Balanced => 0,
            ColorStrategy::PreserveRgb => 1,
            ColorStrategy::MaxWhite => 2,
        }
    }

    const fn from_u8(v: u8) -> Self {
        match v {
            1 => ColorStrategy::PreserveRgb,
            2 => ColorStrategy::MaxWhite,
            _ => ColorStrategy::Balanced,
        }
    }
}

static GLOBAL_STRATEGY: AtomicU8 = AtomicU8::new(0);

/// Set the global color-conversion strategy. Intended to be called once at
/// startup, before any [`crate::model::fixture::FixtureType`] is built.
pub fn set_color_strategy(strategy: ColorStrategy) {
    GLOBAL_STRATEGY.store(strategy.as_u8(), Ordering::Relaxed);
}

/// Read the current global color-conversion strategy.
#[must_use]
pub fn color_strategy() -> ColorStrategy {
    ColorStrategy::from_u8(GLOBAL_STRATEGY.load(Ordering::Relaxed))
}

fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

// ── HSV <-> RGB ──────────────────────────────────────────────────────

/// Convert HSV (each 0.0-1.0, hue wraps) to RGB.
#[must_use]
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    let h = h.rem_euclid(1.0);
    if s <= 0.0 {
        return (v, v, v);
    }
    let h6 = h * 6.0;
    #[allow(clippy::cast_possible_truncation)]
    let i = h6.floor() as i64;
    let f = h6 - h6.floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match i.rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

/// Convert RGB (each 0.0-1.0) to HSV.
#[must_use]
pub fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max_c = r.max(g).max(b);
    let min_c = r.min(g).min(b);
    let v = max_c;

    if (max_c - min_c).abs() < f64::EPSILON {
        return (0.0, 0.0, v);
    }

    let diff = max_c - min_c;
    let s = diff / max_c;

    let mut h = if (max_c - r).abs() < f64::EPSILON {
        let mut h = (g - b) / diff;
        if g < b {
            h += 6.0;
        }
        h
    } else if (max_c - g).abs() < f64::EPSILON {
        (b - r) / diff + 2.0
    } else {
        (r - g) / diff + 4.0
    };
    h /= 6.0;
    h = h.rem_euclid(1.0);
    (h, s, v)
}

// ── RGB <-> RGBW ─────────────────────────────────────────────────────

/// Convert RGB to RGBW using the given strategy, or the global one if
/// `None`.
#[must_use]
pub fn rgb_to_rgbw(r: f64, g: f64, b: f64, strategy: Option<ColorStrategy>) -> (f64, f64, f64, f64) {
    let strategy = strategy.unwrap_or_else(color_strategy);

    match strategy {
        ColorStrategy::PreserveRgb => (r, g, b, 0.0),
        ColorStrategy::MaxWhite => {
            let w = r.min(g).min(b);
            if w > 0.0 {
                let remaining = 1.0 - w;
                if remaining > 0.0 {
                    let scale = |c: f64| if c > w { (c - w) / (1.0 - w) * remaining } else { 0.0 };
                    (scale(r), scale(g), scale(b), w)
                } else {
                    (r, g, b, 0.0)
                }
            } else {
                (r, g, b, 0.0)
            }
        }
        ColorStrategy::Balanced => {
            let w = r.min(g).min(b);
            (r - w, g - w, b - w, w)
        }
    }
}

/// Inverse of [`rgb_to_rgbw`]: `min(1, c + w)` per channel.
#[must_use]
pub fn rgbw_to_rgb(r: f64, g: f64, b: f64, w: f64) -> (f64, f64, f64) {
    (clamp01(r + w), clamp01(g + w), clamp01(b + w))
}

// ── RGB <-> RGBA (amber) ─────────────────────────────────────────────

/// Convert RGB to RGBA, extracting an amber component. Amber is only
/// extracted when blue is not dominant (amber has no blue content).
#[must_use]
pub fn rgb_to_rgba(r: f64, g: f64, b: f64) -> (f64, f64, f64, f64) {
    if b > 0.5 {
        return (r, g, b, 0.0);
    }

    let amber = if g > 0.0 { r.min(g / 0.75) } else { 0.0 };
    let amber = amber.min(1.0 - b).max(0.0);

    let r_out = (r - amber).max(0.0);
    let g_out = (g - amber * 0.75).max(0.0);

    (r_out, g_out, b, amber)
}

/// Inverse of [`rgb_to_rgba`].
#[must_use]
pub fn rgba_to_rgb(r: f64, g: f64, b: f64, a: f64) -> (f64, f64, f64) {
    (clamp01(r + a), clamp01(g + a * 0.75), b)
}

/// Convert RGB straight to RGBAW: extract white first, then extract amber
/// from the residual RGB.
#[must_use]
pub fn rgb_to_rgbaw(r: f64, g: f64, b: f64) -> (f64, f64, f64, f64, f64) {
    let (rw, gw, bw, w) = rgb_to_rgbw(r, g, b, None);
    let (ra, ga, ba, a) = rgb_to_rgba(rw, gw, bw);
    (ra, ga, ba, a, w)
}

// ── Color value ──────────────────────────────────────────────────────

/// A normalized color: an ordered tuple of channels of length >= 3, stored
/// as RGB plus optional further channels (e.g. white). Cheap to clone.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color(Vec<f64>);

impl Color {
    pub const BLACK: (f64, f64, f64) = (0.0, 0.0, 0.0);
    pub const WHITE: (f64, f64, f64) = (1.0, 1.0, 1.0);

    /// Construct a 3-channel RGB color.
    #[must_use]
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self(vec![r, g, b])
    }

    /// Construct from an arbitrary channel tuple (length >= 3).
    #[must_use]
    pub fn from_channels(channels: impl Into<Vec<f64>>) -> Self {
        Self(channels.into())
    }

    /// Construct from HSV (hue wraps modulo 1.0).
    #[must_use]
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Self {
        let (r, g, b) = hsv_to_rgb(h, s, v);
        Self::rgb(r, g, b)
    }

    #[must_use]
    pub fn channels(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn channel(&self, index: usize) -> f64 {
        self.0.get(index).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn r(&self) -> f64 {
        self.channel(0)
    }

    #[must_use]
    pub fn g(&self) -> f64 {
        self.channel(1)
    }

    #[must_use]
    pub fn b(&self) -> f64 {
        self.channel(2)
    }

    #[must_use]
    pub fn w(&self) -> f64 {
        self.channel(3)
    }

    /// Round-trip to HSV via the RGB channels.
    #[must_use]
    pub fn to_hsv(&self) -> (f64, f64, f64) {
        rgb_to_hsv(self.r(), self.g(), self.b())
    }

    /// Linear interpolation between two colors, channel-wise. `t` clamped
    /// to [0, 1]. Shorter color is zero-padded.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let len = self.0.len().max(other.0.len());
        let channels = (0..len)
            .map(|i| {
                let a = self.channel(i);
                let b = other.channel(i);
                a + (b - a) * t
            })
            .collect();
        Self(channels)
    }

    /// Scale every channel by a factor, clamped to [0, 1].
    #[must_use]
    pub fn scale(&self, factor: f64) -> Self {
        Self(self.0.iter().map(|c| clamp01(c * factor)).collect())
    }
}

/// Marker wrapping a channel tuple that bypasses format conversion
/// entirely and is delivered to the attribute codec verbatim.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Raw(Vec<f64>);

impl Raw {
    #[must_use]
    pub fn new(channels: impl Into<Vec<f64>>) -> Self {
        Self(channels.into())
    }

    #[must_use]
    pub fn channels(&self) -> &[f64] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn hsv_known_values() {
        let (r, g, b) = hsv_to_rgb(0.0, 1.0, 1.0);
        assert!(approx(r, 1.0) && approx(g, 0.0) && approx(b, 0.0));

        let (r, g, b) = hsv_to_rgb(1.0 / 3.0, 1.0, 1.0);
        assert!(approx(r, 0.0) && approx(g, 1.0) && approx(b, 0.0));

        let (r, g, b) = hsv_to_rgb(2.0 / 3.0, 1.0, 1.0);
        assert!(approx(r, 0.0) && approx(g, 0.0) && approx(b, 1.0));
    }

    #[test]
    fn hsv_round_trip() {
        for &(r, g, b) in &[(0.8, 0.2, 0.1), (0.1, 0.9, 0.4), (0.3, 0.3, 0.9)] {
            let (h, s, v) = rgb_to_hsv(r, g, b);
            let (r2, g2, b2) = hsv_to_rgb(h, s, v);
            assert!((r - r2).abs() < 1e-6);
            assert!((g - g2).abs() < 1e-6);
            assert!((b - b2).abs() < 1e-6);
        }
    }

    #[test]
    fn hue_wraps() {
        let (r1, g1, b1) = hsv_to_rgb(1.0, 1.0, 1.0);
        let (r2, g2, b2) = hsv_to_rgb(0.0, 1.0, 1.0);
        assert!(approx(r1, r2) && approx(g1, g2) && approx(b1, b2));
    }

    #[test]
    fn rgbw_balanced_extracts_common_white() {
        let (r, g, b, w) = rgb_to_rgbw(1.0, 1.0, 1.0, Some(ColorStrategy::Balanced));
        assert!(approx(r, 0.0) && approx(g, 0.0) && approx(b, 0.0) && approx(w, 1.0));

        let (r, g, b, w) = rgb_to_rgbw(1.0, 0.0, 0.0, Some(ColorStrategy::Balanced));
        assert!(approx(r, 1.0) && approx(g, 0.0) && approx(b, 0.0) && approx(w, 0.0));
    }

    #[test]
    fn rgbw_preserve_rgb_never_extracts_white() {
        let (r, g, b, w) = rgb_to_rgbw(0.5, 0.5, 0.5, Some(ColorStrategy::PreserveRgb));
        assert!(approx(r, 0.5) && approx(g, 0.5) && approx(b, 0.5) && approx(w, 0.0));
    }

    #[test]
    fn rgbw_round_trip_in_preservable_regime() {
        // min(r,g,b) <= 1 - max(r,g,b) guarantees exact recovery.
        let (r, g, b) = (0.2, 0.3, 0.1);
        let (rr, gg, bb, w) = rgb_to_rgbw(r, g, b, Some(ColorStrategy::Balanced));
        let (r2, g2, b2) = rgbw_to_rgb(rr, gg, bb, w);
        assert!(approx(r, r2) && approx(g, g2) && approx(b, b2));
    }

    #[test]
    fn rgba_skips_amber_when_blue_dominant() {
        let (_, _, _, a) = rgb_to_rgba(0.2, 0.2, 0.9);
        assert!(approx(a, 0.0));
    }

    #[test]
    fn rgba_extracts_amber_from_warm_colors() {
        let (_, _, _, a) = rgb_to_rgba(1.0, 0.75, 0.0);
        assert!(a > 0.9);
    }

    #[test]
    fn rgbaw_composes_white_then_amber() {
        let (_, _, b, a, w) = rgb_to_rgbaw(1.0, 0.8, 0.0);
        assert!(w > 0.0);
        assert!(a > 0.0);
        assert!(approx(b, 0.0));
    }

    #[test]
    fn strategy_parse_round_trips_known_strings() {
        assert_eq!(ColorStrategy::parse("balanced"), Some(ColorStrategy::Balanced));
        assert_eq!(ColorStrategy::parse("MAX_WHITE"), Some(ColorStrategy::MaxWhite));
        assert_eq!(ColorStrategy::parse("bogus"), None);
    }

    #[test]
    fn set_and_read_global_strategy() {
        set_color_strategy(ColorStrategy::MaxWhite);
        assert_eq!(color_strategy(), ColorStrategy::MaxWhite);
        set_color_strategy(ColorStrategy::Balanced);
        assert_eq!(color_strategy(), ColorStrategy::Balanced);
    }

    #[test]
    fn lerp_at_boundaries() {
        let a = Color::rgb(0.1, 0.2, 0.3);
        let b = Color::rgb(0.8, 0.4, 0.2);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
    }

    #[test]
    fn scale_zero_is_black() {
        let c = Color::rgb(0.5, 0.5, 0.5).scale(0.0);
        assert!(approx(c.r(), 0.0) && approx(c.g(), 0.0) && approx(c.b(), 0.0));
    }
}
