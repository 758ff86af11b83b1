use std::collections::HashMap;

use crate::blend::{BlendOp, FixtureDelta};
use crate::model::attribute::AttrValue;
use crate::model::state::FixtureState;
use crate::model::{Fixture, FixtureId, Rig, Selector};

use super::Clip;

/// How a [`Scene`] layer's state is produced for a selected fixture:
/// either a constant state shared by every fixture, or a function of the
/// fixture itself.
pub enum Params {
    Constant(FixtureState),
    Fn(Box<dyn Fn(&Fixture) -> FixtureState + Send + Sync>),
}

impl Params {
    fn eval(&self, fixture: &Fixture) -> FixtureState {
        match self {
            Params::Constant(state) => state.clone(),
            Params::Fn(f) => f(fixture),
        }
    }
}

impl From<FixtureState> for Params {
    fn from(state: FixtureState) -> Self {
        Params::Constant(state)
    }
}

/// A static lighting look. Built from one or more `(selector, params)`
/// layers; later layers overwrite earlier ones per attribute key on
/// fixtures they share.
pub struct Scene {
    layers: Vec<(Box<dyn Selector + Send + Sync>, Params)>,
    fade_in: f64,
    fade_out: f64,
    duration: Option<f64>,
}

impl Scene {
    /// Single-layer construction: one selector, one params source.
    #[must_use]
    pub fn single(
        selector: impl Selector + Send + Sync + 'static,
        params: impl Into<Params>,
        duration: Option<f64>,
        fade_in: f64,
        fade_out: f64,
    ) -> Self {
        Self { layers: vec![(Box::new(selector), params.into())], fade_in, fade_out, duration }
    }

    /// Multi-layer construction: an ordered list of `(selector, params)`
    /// pairs, composed in order.
    pub fn layered(
        layers: Vec<(Box<dyn Selector + Send + Sync>, Params)>,
        duration: Option<f64>,
        fade_in: f64,
        fade_out: f64,
    ) -> Result<Self, crate::error::EngineError> {
        if layers.is_empty() {
            return Err(crate::error::EngineError::configuration("Scene requires at least one layer"));
        }
        Ok(Self { layers, fade_in, fade_out, duration })
    }
}

impl Clip for Scene {
    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn render(&self, t: f64, rig: &Rig) -> HashMap<FixtureId, FixtureDelta> {
        if t < 0.0 || self.duration.is_some_and(|d| t > d) {
            return HashMap::new();
        }

        let fade_mult = super::fade_factor(t, self.duration, self.fade_in, self.fade_out);
        let mut result: HashMap<FixtureId, FixtureDelta> = HashMap::new();

        for (selector, params) in &self.layers {
            for id in selector.select(rig) {
                let Some(fixture) = rig.get(id) else { continue };
                let state = params.eval(fixture);

                let mut delta = FixtureDelta::new();
                for (key, value) in state.iter() {
                    if key == "dimmer" {
                        delta.set(key, BlendOp::Set, AttrValue::Scalar(value.scalar() * fade_mult));
                    } else {
                        delta.set(key, BlendOp::Set, value.clone());
                    }
                }

                result.entry(id).and_modify(|existing| existing.overlay(&delta)).or_insert(delta);
            }
        }

        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::attribute::DimmerAttr;
    use crate::model::{FixtureType, Vec3};
    use std::collections::HashMap as Map;
    use std::sync::Arc;

    fn rig_with_one_fixture() -> (Rig, FixtureId) {
        let ft = Arc::new(FixtureType::new(vec![Box::new(DimmerAttr::new(false))]));
        let mut rig = Rig::new();
        let f = ft.instantiate(1, 1, Vec3::ZERO, Vec::new(), Map::new());
        let id = rig.add(f).unwrap();
        (rig, id)
    }

    #[test]
    fn dimmer_half_faded_at_midpoint_of_fade_in() {
        let (rig, id) = rig_with_one_fixture();
        let mut state = FixtureState::new();
        state.set("dimmer", AttrValue::Scalar(1.0));
        let scene = Scene::single(id, state, Some(10.0), 2.0, 0.0);

        let deltas = scene.render(1.0, &rig);
        let (_, value) = deltas[&id].get("dimmer").unwrap();
        assert!((value.scalar() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn out_of_bounds_time_yields_empty_map() {
        let (rig, id) = rig_with_one_fixture();
        let mut state = FixtureState::new();
        state.set("dimmer", AttrValue::Scalar(1.0));
        let scene = Scene::single(id, state, Some(10.0), 0.0, 0.0);

        assert!(scene.render(-0.1, &rig).is_empty());
        assert!(scene.render(10.1, &rig).is_empty());
    }

    #[test]
    fn later_layer_overwrites_shared_keys_only() {
        let (rig, id) = rig_with_one_fixture();
        let mut base = FixtureState::new();
        base.set("dimmer", AttrValue::Scalar(0.3));
        base.set("color", AttrValue::Tuple(vec![1.0, 0.0, 0.0]));

        let mut overlay = FixtureState::new();
        overlay.set("dimmer", AttrValue::Scalar(0.9));

        let scene = Scene::layered(
            vec![(Box::new(id), Params::from(base)), (Box::new(id), Params::from(overlay))],
            Some(10.0),
            0.0,
            0.0,
        )
        .unwrap();

        let deltas = scene.render(5.0, &rig);
        let (_, dimmer) = deltas[&id].get("dimmer").unwrap();
        assert!((dimmer.scalar() - 0.9).abs() < 1e-9);
        assert!(deltas[&id].get("color").is_some());
    }
}
