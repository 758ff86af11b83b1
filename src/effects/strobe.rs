use crate::model::attribute::AttrValue;
use crate::model::{Fixture, FixtureState};

use super::EffectTemplate;

/// On/off strobe: `phase = (t*rate) mod 1`; dimmer = 1 while `phase <
/// duty`, else 0.
#[derive(Debug, Clone, Copy)]
pub struct Strobe {
    pub rate: f64,
    pub duty: f64,
}

impl Strobe {
    #[must_use]
    pub fn new(rate: f64, duty: f64) -> Self {
        Self { rate, duty }
    }
}

impl Default for Strobe {
    fn default() -> Self {
        Self { rate: 10.0, duty: 0.5 }
    }
}

impl EffectTemplate for Strobe {
    fn render_params(&self, t: f64, _fixture: &Fixture, _index: usize, _segment: usize) -> FixtureState {
        let phase = (t * self.rate).rem_euclid(1.0);
        let value = if phase < self.duty { 1.0 } else { 0.0 };

        let mut state = FixtureState::new();
        state.set("dimmer", AttrValue::Scalar(value));
        state
    }

    fn template_name(&self) -> String {
        format!("Strobe(rate={}, duty={})", self.rate, self.duty)
    }
}
