//! Uniform `render(t, rig) -> {fixture: delta}` contract and the three
//! concrete clip kinds that satisfy it: [`scene::Scene`], [`effect::Effect`],
//! and [`timeline::Timeline`].

pub mod effect;
pub mod scene;
pub mod timeline;

use std::collections::HashMap;

use crate::blend::FixtureDelta;
use crate::model::{FixtureId, Rig};

pub use effect::Effect;
pub use scene::{Params, Scene};
pub use timeline::Timeline;

/// A time-parameterized producer of per-fixture deltas. `render` must be a
/// pure function of `(t, rig, clip-configuration)`: no process-state
/// reads, no mutation of `rig`.
pub trait Clip: Send + Sync {
    /// Duration in seconds, or `None` for unbounded.
    fn duration(&self) -> Option<f64>;

    /// Render this clip's contribution at local time `t`. Must return an
    /// empty map when `t < 0` or `t` exceeds a finite duration.
    fn render(&self, t: f64, rig: &Rig) -> HashMap<FixtureId, FixtureDelta>;
}

/// Standard fade envelope applied to the `"dimmer"` operand by both Scene
/// and Effect: ramps up over `fade_in`, holds at 1.0, ramps down over the
/// last `fade_out` seconds of a finite duration.
pub(crate) fn fade_factor(t: f64, duration: Option<f64>, fade_in: f64, fade_out: f64) -> f64 {
    if fade_in > 0.0 && t < fade_in {
        return t / fade_in;
    }
    if let Some(dur) = duration {
        if fade_out > 0.0 {
            let remaining = dur - t;
            if remaining < fade_out {
                return (remaining / fade_out).max(0.0);
            }
        }
    }
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_in_ramps_linearly() {
        assert!((fade_factor(1.0, Some(10.0), 2.0, 0.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn fade_out_ramps_down_near_end() {
        let f = fade_factor(9.0, Some(10.0), 0.0, 2.0);
        assert!((f - 0.5).abs() < 1e-9);
    }

    #[test]
    fn no_fade_outside_envelopes_is_full() {
        assert!((fade_factor(5.0, Some(10.0), 2.0, 2.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unbounded_duration_has_no_fade_out() {
        assert!((fade_factor(1000.0, None, 0.0, 0.0) - 1.0).abs() < 1e-9);
    }
}
