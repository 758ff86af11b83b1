use std::f64::consts::TAU;

use crate::blend::BlendOp;
use crate::model::attribute::AttrValue;
use crate::model::{Fixture, FixtureState};

use super::EffectTemplate;

/// Sinusoidal dimmer pulse: `0.5 + 0.5 * sin(2*pi*t*rate)`. Modulates
/// (`MUL`) rather than replaces the dimmer, so it can layer over a scene
/// already driving the fixture.
#[derive(Debug, Clone, Copy)]
pub struct Pulse {
    pub rate: f64,
}

impl Pulse {
    #[must_use]
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl Default for Pulse {
    fn default() -> Self {
        Self { rate: 1.0 }
    }
}

impl EffectTemplate for Pulse {
    fn render_params(&self, t: f64, _fixture: &Fixture, _index: usize, _segment: usize) -> FixtureState {
        let value = 0.5 + 0.5 * (t * self.rate * TAU).sin();
        let mut state = FixtureState::new();
        state.set("dimmer", AttrValue::Scalar(value));
        state
    }

    fn template_name(&self) -> String {
        format!("Pulse(rate={})", self.rate)
    }

    fn dimmer_blend_op(&self) -> BlendOp {
        BlendOp::Mul
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{FixtureType, Vec3};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn dummy_fixture() -> Fixture {
        let ft = Arc::new(FixtureType::new(Vec::new()));
        ft.instantiate(1, 1, Vec3::ZERO, Vec::new(), HashMap::new())
    }

    #[test]
    fn quarter_period_peaks_at_one() {
        let pulse = Pulse::new(1.0);
        let fixture = dummy_fixture();
        let state = pulse.render_params(0.25, &fixture, 0, 0);
        assert!((state.get("dimmer").unwrap().scalar() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_time_starts_at_half() {
        let pulse = Pulse::new(1.0);
        let fixture = dummy_fixture();
        let state = pulse.render_params(0.0, &fixture, 0, 0);
        assert!((state.get("dimmer").unwrap().scalar() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn dimmer_composes_via_mul() {
        let pulse = Pulse::new(1.0);
        assert_eq!(pulse.dimmer_blend_op(), BlendOp::Mul);
    }
}
