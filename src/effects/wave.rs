use std::f64::consts::TAU;

use crate::model::attribute::AttrValue;
use crate::model::{Fixture, FixtureState};

use super::EffectTemplate;

/// A sine wave that travels across fixtures by index: `phase = t*speed -
/// i/wavelength`.
#[derive(Debug, Clone, Copy)]
pub struct Wave {
    pub speed: f64,
    pub wavelength: f64,
}

impl Wave {
    #[must_use]
    pub fn new(speed: f64, wavelength: f64) -> Self {
        Self { speed, wavelength }
    }
}

impl Default for Wave {
    fn default() -> Self {
        Self { speed: 1.0, wavelength: 4.0 }
    }
}

impl EffectTemplate for Wave {
    fn render_params(&self, t: f64, _fixture: &Fixture, index: usize, _segment: usize) -> FixtureState {
        let phase = t * self.speed - index as f64 / self.wavelength;
        let value = 0.5 + 0.5 * (phase * TAU).sin();

        let mut state = FixtureState::new();
        state.set("dimmer", AttrValue::Scalar(value));
        state
    }

    fn template_name(&self) -> String {
        format!("Wave(speed={}, wavelength={})", self.speed, self.wavelength)
    }
}
