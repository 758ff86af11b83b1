use crate::model::attribute::AttrValue;
use crate::model::{Color, Fixture, FixtureState};

use super::EffectTemplate;

/// Cycles hue across fixture index and segment: `hue = (t*speed + 0.1*i +
/// 0.05*seg) mod 1`.
#[derive(Debug, Clone, Copy)]
pub struct Rainbow {
    pub speed: f64,
    pub saturation: f64,
}

impl Rainbow {
    #[must_use]
    pub fn new(speed: f64, saturation: f64) -> Self {
        Self { speed, saturation }
    }
}

impl Default for Rainbow {
    fn default() -> Self {
        Self { speed: 0.1, saturation: 1.0 }
    }
}

impl EffectTemplate for Rainbow {
    fn render_params(&self, t: f64, _fixture: &Fixture, index: usize, segment: usize) -> FixtureState {
        let hue = (t * self.speed + index as f64 * 0.1 + segment as f64 * 0.05).rem_euclid(1.0);
        let color = Color::from_hsv(hue, self.saturation, 1.0);

        let mut state = FixtureState::new();
        state.set("dimmer", AttrValue::Scalar(1.0));
        state.set("color", AttrValue::Color(color));
        state
    }

    fn template_name(&self) -> String {
        format!("Rainbow(speed={}, saturation={})", self.speed, self.saturation)
    }
}
