use std::collections::HashMap;

use crate::blend::{BlendOp, FixtureDelta};
use crate::model::attribute::AttrValue;
use crate::model::state::FixtureState;
use crate::model::{Fixture, FixtureId, Rig, Selector};

use super::Clip;

type ParamsFn = Box<dyn Fn(f64, &Fixture, usize, usize) -> FixtureState + Send + Sync>;

/// A math-driven clip: `params(t, fixture, index, segment)` computes the
/// per-fixture (per-segment, for segmented color fixtures) state. Built by
/// an effect template's `create`/`call` (see `crate::effects`).
pub struct Effect {
    selector: Box<dyn Selector + Send + Sync>,
    params: ParamsFn,
    duration: Option<f64>,
    fade_in: f64,
    fade_out: f64,
    name: String,
    dimmer_op: BlendOp,
}

impl Effect {
    #[must_use]
    pub fn new(
        selector: impl Selector + Send + Sync + 'static,
        params: impl Fn(f64, &Fixture, usize, usize) -> FixtureState + Send + Sync + 'static,
        duration: Option<f64>,
        fade_in: f64,
        fade_out: f64,
        name: impl Into<String>,
    ) -> Self {
        Self::with_dimmer_op(selector, params, duration, fade_in, fade_out, name, BlendOp::Set)
    }

    /// Like [`Effect::new`], but the dimmer key composes via `dimmer_op`
    /// instead of always overwriting — e.g. a pulse layered over an
    /// existing scene modulates it with `BlendOp::Mul` rather than
    /// replacing it outright.
    #[must_use]
    pub fn with_dimmer_op(
        selector: impl Selector + Send + Sync + 'static,
        params: impl Fn(f64, &Fixture, usize, usize) -> FixtureState + Send + Sync + 'static,
        duration: Option<f64>,
        fade_in: f64,
        fade_out: f64,
        name: impl Into<String>,
        dimmer_op: BlendOp,
    ) -> Self {
        Self {
            selector: Box::new(selector),
            params: Box::new(params),
            duration,
            fade_in,
            fade_out,
            name: name.into(),
            dimmer_op,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Clip for Effect {
    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn render(&self, t: f64, rig: &Rig) -> HashMap<FixtureId, FixtureDelta> {
        if t < 0.0 || self.duration.is_some_and(|d| t > d) {
            return HashMap::new();
        }

        let fade_mult = super::fade_factor(t, self.duration, self.fade_in, self.fade_out);
        let selected = self.selector.select(rig);
        let mut result = HashMap::new();

        for (index, id) in selected.into_iter().enumerate() {
            let Some(fixture) = rig.get(id) else { continue };
            let segment_count = fixture.segment_count();
            let segments = segment_count.max(1);
            let mut delta = FixtureDelta::new();

            for seg in 0..segments {
                let state = (self.params)(t, fixture, index, seg);
                for (key, value) in state.iter() {
                    if key == "color" && segment_count > 1 {
                        delta.set(format!("color_{seg}"), BlendOp::Set, value.clone());
                    } else if key == "dimmer" {
                        if seg == 0 {
                            delta.set(key, self.dimmer_op, AttrValue::Scalar(value.scalar() * fade_mult));
                        }
                    } else if seg == 0 {
                        delta.set(key, BlendOp::Set, value.clone());
                    }
                }
            }

            result.insert(id, delta);
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
    fn constant_effect_ignores_index_and_segment() {
        let (rig, id) = rig_with_one_fixture();
        let effect = Effect::new(
            id,
            |_t, _f, _i, _seg| {
                let mut s = FixtureState::new();
                s.set("dimmer", AttrValue::Scalar(0.42));
                s
            },
            Some(5.0),
            0.0,
            0.0,
            "test",
        );

        let deltas = effect.render(1.0, &rig);
        let (_, v) = deltas[&id].get("dimmer").unwrap();
        assert!((v.scalar() - 0.42).abs() < 1e-9);
    }
}
