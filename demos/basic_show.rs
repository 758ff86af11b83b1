//! Two fixtures, a timeline, and selector groups — exercised by the
//! CLI's `demo` subcommand.

use std::collections::HashMap;
use std::sync::Arc;

use dmxcue::clip::Clip;
use dmxcue::error::EngineError;
use dmxcue::model::attribute::{AttrValue, DimmerAttr, RgbAttr};
use dmxcue::model::state::FixtureState;
use dmxcue::model::{Color, FixtureId, FixtureType, Rig, Vec3};
use dmxcue::{Scene, Timeline};
use dmxcue::effects::{EffectTemplate, Pulse};

/// Builds the demo rig and its timeline: a warm-white fade-in on both
/// fixtures, a slow pulse on the left wash, a cool-blue scene on the
/// right wash, then a fast pulse across both.
pub fn build() -> Result<(Rig, Timeline), EngineError> {
    let fixture_type =
        Arc::new(FixtureType::new(vec![Box::new(DimmerAttr::new(false)), Box::new(RgbAttr::new(1))]));

    let mut rig = Rig::new();
    let wash_left = fixture_type.instantiate(1, 1, Vec3::new(-2.0, 0.0, 3.0), Vec::new(), HashMap::new());
    let wash_right = fixture_type.instantiate(1, 5, Vec3::new(2.0, 0.0, 3.0), Vec::new(), HashMap::new());
    let left: FixtureId = rig.add(wash_left)?;
    let right: FixtureId = rig.add(wash_right)?;
    let both = vec![left, right];

    let mut warm_white = FixtureState::new();
    warm_white.set("dimmer", AttrValue::Scalar(1.0));
    warm_white.set("color", AttrValue::Color(Color::rgb(1.0, 0.8, 0.6)));

    let mut cool_blue = FixtureState::new();
    cool_blue.set("dimmer", AttrValue::Scalar(1.0));
    cool_blue.set("color", AttrValue::Color(Color::rgb(0.3, 0.5, 1.0)));

    let fade_in: Box<dyn Clip> = Box::new(Scene::single(both.clone(), warm_white, Some(10.0), 2.0, 2.0));
    let left_pulse: Box<dyn Clip> = Box::new(Pulse::new(0.5).create(vec![left], Some(8.0), 0.0, 0.0));
    let right_scene: Box<dyn Clip> = Box::new(Scene::single(vec![right], cool_blue, Some(5.0), 1.0, 1.0));
    let final_pulse: Box<dyn Clip> = Box::new(Pulse::new(2.0).create(both, Some(3.0), 0.0, 0.0));

    let timeline = Timeline::new().add(0.0, fade_in).add(2.0, left_pulse).add(5.0, right_scene).add(8.0, final_pulse);

    Ok((rig, timeline))
}

