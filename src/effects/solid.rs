use crate::model::attribute::AttrValue;
use crate::model::{Color, Fixture, FixtureState};

use super::EffectTemplate;

/// Static dimmer/color, useful as a base layer under other templates.
#[derive(Debug, Clone)]
pub struct Solid {
    pub dimmer: f64,
    pub color: Option<Color>,
}

impl Solid {
    #[must_use]
    pub fn new(dimmer: f64) -> Self {
        Self { dimmer, color: None }
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

impl Default for Solid {
    fn default() -> Self {
        Self { dimmer: 1.0, color: None }
    }
}

impl EffectTemplate for Solid {
    fn render_params(&self, _t: f64, _fixture: &Fixture, _index: usize, _segment: usize) -> FixtureState {
        let mut state = FixtureState::new();
        state.set("dimmer", AttrValue::Scalar(self.dimmer));
        if let Some(color) = &self.color {
            state.set("color", AttrValue::Color(color.clone()));
        }
        state
    }

    fn template_name(&self) -> String {
        format!("Solid(dimmer={}, color={:?})", self.dimmer, self.color)
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
    fn without_color_only_dimmer_is_set() {
        let solid = Solid::new(0.8);
        let fixture = dummy_fixture();
        let state = solid.render_params(0.0, &fixture, 0, 0);
        assert!((state.get("dimmer").unwrap().scalar() - 0.8).abs() < 1e-9);
        assert!(state.get("color").is_none());
    }

    #[test]
    fn with_color_emits_both_keys() {
        let solid = Solid::new(1.0).with_color(Color::rgb(1.0, 0.5, 0.0));
        let fixture = dummy_fixture();
        let state = solid.render_params(0.0, &fixture, 0, 0);
        assert!(state.get("color").is_some());
    }
}
