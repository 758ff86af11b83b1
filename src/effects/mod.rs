//! Built-in effect templates. Each template is a small parameter struct
//! that computes a per-fixture, per-segment [`FixtureState`] from `(t,
//! fixture, index, segment)`; `create`/`call` wrap it into an [`Effect`]
//! clip bound to a selector.

pub mod chase;
pub mod pulse;
pub mod rainbow;
pub mod solid;
pub mod strobe;
pub mod wave;

pub use chase::Chase;
pub use pulse::Pulse;
pub use rainbow::Rainbow;
pub use solid::Solid;
pub use strobe::Strobe;
pub use wave::Wave;

use crate::blend::BlendOp;
use crate::clip::Effect;
use crate::model::{Fixture, FixtureState, Selector};

/// Base contract for an effect template: a pure function of `(t, fixture,
/// index, segment)` plus a debug-friendly name.
pub trait EffectTemplate: Send + Sync + Sized + 'static {
    fn render_params(&self, t: f64, fixture: &Fixture, index: usize, segment: usize) -> FixtureState;

    /// Name derived from the template and its parameter values, for
    /// logging.
    fn template_name(&self) -> String;

    /// How this template's dimmer value composes onto whatever else is
    /// already driving that fixture. Most templates drive the dimmer
    /// outright (`SET`); a modulating effect like `Pulse` overrides this
    /// to `MUL` so it scales a base look instead of replacing it.
    fn dimmer_blend_op(&self) -> BlendOp {
        BlendOp::Set
    }

    /// Bind this template to a selector, producing a playable `Effect`.
    fn create(
        self,
        selector: impl Selector + Send + Sync + 'static,
        duration: Option<f64>,
        fade_in: f64,
        fade_out: f64,
    ) -> Effect {
        let name = self.template_name();
        let dimmer_op = self.dimmer_blend_op();
        Effect::with_dimmer_op(
            selector,
            move |t, fixture, index, segment| self.render_params(t, fixture, index, segment),
            duration,
            fade_in,
            fade_out,
            name,
            dimmer_op,
        )
    }

    /// Shorthand for [`EffectTemplate::create`].
    fn call(
        self,
        selector: impl Selector + Send + Sync + 'static,
        duration: Option<f64>,
        fade_in: f64,
        fade_out: f64,
    ) -> Effect {
        self.create(selector, duration, fade_in, fade_out)
    }
}
