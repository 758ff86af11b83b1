use std::collections::HashMap;

use crate::blend::{merge_deltas, BlendOp, FixtureDelta};
use crate::model::{FixtureId, Rig};

use super::Clip;

/// A clip scheduled to start at a given offset within a [`Timeline`].
struct Event {
    start: f64,
    clip: Box<dyn Clip>,
}

/// Composes child clips at fixed start offsets. Overlapping contributions
/// to the same fixture are merged in schedule order via [`merge_deltas`].
#[derive(Default)]
pub struct Timeline {
    events: Vec<Event>,
}

impl Timeline {
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Schedule `clip` to start at `start` seconds. Chainable.
    #[must_use]
    pub fn add(mut self, start: f64, clip: Box<dyn Clip>) -> Self {
        self.events.push(Event { start, clip });
        self
    }
}

impl Clip for Timeline {
    fn duration(&self) -> Option<f64> {
        if self.events.is_empty() {
            return Some(0.0);
        }
        let mut max_end = 0.0_f64;
        for event in &self.events {
            let clip_dur = event.clip.duration()?;
            max_end = max_end.max(event.start + clip_dur);
        }
        Some(max_end)
    }

    fn render(&self, t: f64, rig: &Rig) -> HashMap<FixtureId, FixtureDelta> {
        let mut per_fixture: HashMap<FixtureId, Vec<FixtureDelta>> = HashMap::new();

        for event in &self.events {
            let local_t = t - event.start;
            if local_t < 0.0 {
                continue;
            }
            if event.clip.duration().is_some_and(|d| local_t > d) {
                continue;
            }

            for (id, delta) in event.clip.render(local_t, rig) {
                per_fixture.entry(id).or_default().push(delta);
            }
        }

        per_fixture
            .into_iter()
            .map(|(id, deltas)| {
                let merged_state = merge_deltas(&deltas, None);
                let mut delta = FixtureDelta::new();
                for (key, value) in merged_state.iter() {
                    delta.set(key.to_string(), BlendOp::Set, value.clone());
                }
                (id, delta)
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::blend::BlendOp;
    use crate::clip::Scene;
    use crate::model::attribute::{AttrValue, DimmerAttr};
    use crate::model::state::FixtureState;
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
    fn duration_is_max_end_across_events() {
        let (rig, id) = rig_with_one_fixture();
        let mut state = FixtureState::new();
        state.set("dimmer", AttrValue::Scalar(1.0));
        let clip_a: Box<dyn Clip> = Box::new(Scene::single(id, state.clone(), Some(3.0), 0.0, 0.0));
        let clip_b: Box<dyn Clip> = Box::new(Scene::single(id, state, Some(2.0), 0.0, 0.0));

        let timeline = Timeline::new().add(0.0, clip_a).add(5.0, clip_b);
        assert!((timeline.duration().unwrap() - 7.0).abs() < 1e-9);
        let _ = &rig;
    }

    #[test]
    fn empty_timeline_has_zero_duration() {
        assert_eq!(Timeline::new().duration(), Some(0.0));
    }

    #[test]
    fn before_a_clips_start_it_contributes_nothing() {
        let (rig, id) = rig_with_one_fixture();
        let mut state = FixtureState::new();
        state.set("dimmer", AttrValue::Scalar(1.0));
        let clip: Box<dyn Clip> = Box::new(Scene::single(id, state, Some(3.0), 0.0, 0.0));
        let timeline = Timeline::new().add(10.0, clip);

        assert!(timeline.render(1.0, &rig).is_empty());
    }

    #[test]
    fn overlapping_events_merge_in_schedule_order() {
        let (rig, id) = rig_with_one_fixture();
        let mut first = FixtureState::new();
        first.set("dimmer", AttrValue::Scalar(0.2));
        let mut second = FixtureState::new();
        second.set("dimmer", AttrValue::Scalar(0.8));

        let clip_a: Box<dyn Clip> = Box::new(Scene::single(id, first, Some(10.0), 0.0, 0.0));
        let clip_b: Box<dyn Clip> = Box::new(Scene::single(id, second, Some(10.0), 0.0, 0.0));
        let timeline = Timeline::new().add(0.0, clip_a).add(0.0, clip_b);

        let deltas = timeline.render(1.0, &rig);
        let (op, value) = deltas[&id].get("dimmer").unwrap();
        assert_eq!(*op, BlendOp::Set);
        assert!((value.scalar() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn pulse_modulates_a_scene_dimmer_via_mul() {
        use crate::effects::{EffectTemplate, Pulse};

        let (rig, id) = rig_with_one_fixture();
        let mut scene_state = FixtureState::new();
        scene_state.set("dimmer", AttrValue::Scalar(0.5));

        let scene: Box<dyn Clip> = Box::new(Scene::single(id, scene_state, Some(10.0), 0.0, 0.0));
        let pulse: Box<dyn Clip> = Box::new(Pulse::new(0.0).create(id, Some(10.0), 0.0, 0.0));
        let timeline = Timeline::new().add(0.0, scene).add(5.0, pulse);

        let deltas = timeline.render(7.0, &rig);
        let (op, value) = deltas[&id].get("dimmer").unwrap();
        assert_eq!(*op, BlendOp::Set);
        assert!((value.scalar() - 0.25).abs() < 1e-9);
    }
}
