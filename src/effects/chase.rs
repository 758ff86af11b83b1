use crate::model::attribute::AttrValue;
use crate::model::{Fixture, FixtureState};

use super::EffectTemplate;

/// Lights fixtures in sequence: a lit "comet" sweeps through the selector
/// order at `speed` cycles per second.
#[derive(Debug, Clone, Copy)]
pub struct Chase {
    pub fixture_count: usize,
    pub speed: f64,
    pub width: f64,
}

impl Chase {
    #[must_use]
    pub fn new(fixture_count: usize, speed: f64, width: f64) -> Self {
        Self { fixture_count, speed, width }
    }
}

impl EffectTemplate for Chase {
    fn render_params(&self, t: f64, _fixture: &Fixture, index: usize, _segment: usize) -> FixtureState {
        let count = self.fixture_count as f64;
        let position = (t * self.speed).rem_euclid(count);
        let distance = (index as f64 - position).abs();
        let distance = distance.min(count - distance);
        let value = (1.0 - distance / self.width).max(0.0);

        let mut state = FixtureState::new();
        state.set("dimmer", AttrValue::Scalar(value));
        state
    }

    fn template_name(&self) -> String {
        format!("Chase(fixture_count={}, speed={}, width={})", self.fixture_count, self.speed, self.width)
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
    fn fixture_at_head_position_is_fully_lit() {
        let chase = Chase::new(8, 1.0, 1.0);
        let fixture = dummy_fixture();
        let state = chase.render_params(3.0, &fixture, 3, 0);
        assert!((state.get("dimmer").unwrap().scalar() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn wraps_around_the_fixture_count() {
        let chase = Chase::new(4, 1.0, 1.0);
        let fixture = dummy_fixture();
        let state = chase.render_params(0.0, &fixture, 3, 0);
        assert!((state.get("dimmer").unwrap().scalar() - 0.0).abs() < 1e-9);
    }
}
