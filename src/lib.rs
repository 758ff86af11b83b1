//! A software DMX512 lighting engine: a clip/blend/fixture/frame-loop
//! pipeline for driving rigs over sACN or Art-Net.

pub mod blend;
pub mod clip;
pub mod config;
pub mod effects;
pub mod engine;
pub mod error;
pub mod model;

pub use blend::{BlendOp, FixtureDelta};
pub use clip::{Clip, Effect, Scene, Timeline};
pub use config::{EngineConfig, Protocol};
pub use engine::Engine;
pub use error::EngineError;
pub use model::{Fixture, FixtureId, FixtureType, Rig};
