pub mod attribute;
pub mod color;
pub mod fixture;
pub mod group;
pub mod state;
pub mod vec3;

pub use attribute::{
    Attribute, AttrValue, DimmerAttr, GoboAttr, PanAttr, RgbAttr, RgbaAttr, RgbawAttr, RgbwAttr, SkipAttr, StrobeAttr,
    TiltAttr,
};
pub use color::{Color, ColorStrategy, Raw};
pub use fixture::{Fixture, FixtureId, FixtureType, Rig};
pub use group::{FixtureGroup, Selector};
pub use state::FixtureState;
pub use vec3::Vec3;
