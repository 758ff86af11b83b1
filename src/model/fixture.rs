use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::EngineError;

use super::attribute::{AttrValue, Attribute};
use super::group::FixtureGroup;
use super::state::FixtureState;
use super::vec3::Vec3;

static FIXTURE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Process-unique fixture identity. Two fixtures are equal iff they are
/// the same instance; `FixtureId` is assigned once, at construction, and
/// is `Copy` so it can be held by groups without extending a fixture's
/// lifetime — the [`Rig`] is the sole owner of fixture data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct FixtureId(u64);

impl FixtureId {
    fn next() -> Self {
        FixtureId(FIXTURE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[cfg(test)]
    #[must_use]
    pub fn for_test(n: u64) -> Self {
        FixtureId(n)
    }
}

/// An ordered sequence of attributes; total `channel_count` is the sum of
/// each attribute's own `channel_count`.
#[derive(Debug)]
pub struct FixtureType {
    attributes: Vec<Box<dyn Attribute>>,
    channel_count: usize,
    default_groups: Vec<Arc<FixtureGroup>>,
}

impl FixtureType {
    #[must_use]
    pub fn new(attributes: Vec<Box<dyn Attribute>>) -> Self {
        let channel_count = attributes.iter().map(|a| a.channel_count()).sum();
        Self { attributes, channel_count, default_groups: Vec::new() }
    }

    #[must_use]
    pub fn with_groups(mut self, groups: Vec<Arc<FixtureGroup>>) -> Self {
        self.default_groups = groups;
        self
    }

    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Max `segments` across all of this type's attributes (>= 1).
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.attributes.iter().map(|a| a.segments()).max().unwrap_or(1)
    }

    /// Construct a fixture of this type, registering it with its groups
    /// (its own defaults plus any passed explicitly).
    #[must_use]
    pub fn instantiate(
        self: &Arc<Self>,
        universe: u32,
        address: u32,
        pos: Vec3,
        mut groups: Vec<Arc<FixtureGroup>>,
        meta: HashMap<String, serde_json::Value>,
    ) -> Fixture {
        let id = FixtureId::next();
        let mut all_groups = self.default_groups.clone();
        all_groups.append(&mut groups);
        for g in &all_groups {
            g.register(id);
        }
        Fixture { id, fixture_type: self.clone(), universe, address, pos, groups: all_groups, meta }
    }

    /// Encode a state into an offset-keyed byte map, per §4.3's
    /// resolution order.
    #[must_use]
    pub fn encode(&self, state: &FixtureState) -> HashMap<usize, u8> {
        let mut result = HashMap::new();
        let mut offset = 0usize;

        for attr in &self.attributes {
            let segments = attr.segments();
            if segments > 1 && attr.name() == "color" {
                let base_channels = attr.channel_count() / segments;
                for seg in 0..segments {
                    let seg_key = format!("color_{seg}");
                    let value = if let Some(v) = state.get(&seg_key) {
                        if v.is_raw() { v.clone() } else { attr.convert(v) }
                    } else if let Some(v) = state.get("color") {
                        if v.is_raw() { v.clone() } else { attr.convert(v) }
                    } else {
                        attr.default_value()
                    };

                    let bytes = attr.encode(&value);
                    for (i, byte) in bytes.into_iter().take(base_channels).enumerate() {
                        result.insert(offset + i, byte);
                    }
                    offset += base_channels;
                }
                continue;
            }

            let value = if let Some(raw_name) = attr.raw_name() {
                if let Some(v) = state.get(raw_name) {
                    v.clone()
                } else if attr.name() == "color" {
                    if let Some(v) = state.get("color") {
                        if v.is_raw() { v.clone() } else { attr.convert(v) }
                    } else {
                        attr.default_value()
                    }
                } else if let Some(v) = state.get(attr.name()) {
                    v.clone()
                } else {
                    attr.default_value()
                }
            } else if attr.name() == "color" {
                if let Some(v) = state.get("color") {
                    if v.is_raw() { v.clone() } else { attr.convert(v) }
                } else {
                    attr.default_value()
                }
            } else if let Some(v) = state.get(attr.name()) {
                v.clone()
            } else {
                attr.default_value()
            };

            let bytes = attr.encode(&value);
            for (i, byte) in bytes.into_iter().enumerate() {
                result.insert(offset + i, byte);
            }
            offset += attr.channel_count();
        }

        result
    }
}

/// A single fixture in the rig: its type, wire address, position, group
/// membership, and free-form metadata.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub id: FixtureId,
    pub fixture_type: Arc<FixtureType>,
    pub universe: u32,
    pub address: u32,
    pub pos: Vec3,
    pub groups: Vec<Arc<FixtureGroup>>,
    pub meta: HashMap<String, serde_json::Value>,
}

impl Fixture {
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.fixture_type.segment_count()
    }
}

impl PartialEq for Fixture {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Fixture {}

/// Collection of fixtures with overlap-checked insertion and batch
/// encoding. Insertion order is preserved and is load-bearing: effects
/// rely on it for their `index` parameter.
#[derive(Debug, Default)]
pub struct Rig {
    fixtures: Vec<Fixture>,
}

impl Rig {
    #[must_use]
    pub fn new() -> Self {
        Self { fixtures: Vec::new() }
    }

    fn check_overlap(&self, candidate: &Fixture) -> Result<(), EngineError> {
        let new_start = candidate.address;
        let new_end = candidate.address + candidate.fixture_type.channel_count() as u32 - 1;

        for existing in &self.fixtures {
            if existing.universe != candidate.universe {
                continue;
            }
            let existing_start = existing.address;
            let existing_end = existing.address + existing.fixture_type.channel_count() as u32 - 1;

            if new_start <= existing_end && existing_start <= new_end {
                return Err(EngineError::configuration(format!(
                    "fixture at universe {} address {} (channels {}-{}) overlaps existing fixture at address {} (channels {}-{})",
                    candidate.universe, candidate.address, new_start, new_end, existing.address, existing_start, existing_end
                )));
            }
        }
        Ok(())
    }

    /// Insert a fixture, rejecting it (rig unchanged) if it overlaps an
    /// existing fixture's channel range in the same universe.
    pub fn add(&mut self, fixture: Fixture) -> Result<FixtureId, EngineError> {
        self.check_overlap(&fixture)?;
        let id = fixture.id;
        self.fixtures.push(fixture);
        Ok(id)
    }

    #[must_use]
    pub fn all(&self) -> Vec<FixtureId> {
        self.fixtures.iter().map(|f| f.id).collect()
    }

    #[must_use]
    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    #[must_use]
    pub fn contains(&self, id: FixtureId) -> bool {
        self.fixtures.iter().any(|f| f.id == id)
    }

    #[must_use]
    pub fn get(&self, id: FixtureId) -> Option<&Fixture> {
        self.fixtures.iter().find(|f| f.id == id)
    }

    /// Index of a fixture in insertion order; effects use this for their
    /// `index` parameter.
    #[must_use]
    pub fn index_of(&self, id: FixtureId) -> Option<usize> {
        self.fixtures.iter().position(|f| f.id == id)
    }

    /// Sorted, deduplicated universe numbers present in the rig.
    #[must_use]
    pub fn universes(&self) -> Vec<u32> {
        let mut us: Vec<u32> = self.fixtures.iter().map(|f| f.universe).collect();
        us.sort_unstable();
        us.dedup();
        us
    }

    /// Returns `{universe: {channel: byte}}`, discarding channels outside
    /// `[1, 512]`.
    #[must_use]
    pub fn encode_to_dmx(&self, states: &HashMap<FixtureId, FixtureState>) -> HashMap<u32, HashMap<u16, u8>> {
        let mut universes: HashMap<u32, HashMap<u16, u8>> = HashMap::new();
        for fixture in &self.fixtures {
            let Some(state) = states.get(&fixture.id) else { continue };
            let universe_data = universes.entry(fixture.universe).or_default();
            let channel_values = fixture.fixture_type.encode(state);
            for (offset, value) in channel_values {
                let channel = fixture.address as usize + offset;
                if (1..=512).contains(&channel) {
                    #[allow(clippy::cast_possible_truncation)]
                    universe_data.insert(channel as u16, value);
                }
            }
        }
        universes
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::attribute::{DimmerAttr, RgbAttr};

    fn simple_type() -> Arc<FixtureType> {
        Arc::new(FixtureType::new(vec![Box::new(DimmerAttr::new(false)), Box::new(RgbAttr::default())]))
    }

    #[test]
    fn channel_count_is_sum_of_attributes() {
        let ft = simple_type();
        assert_eq!(ft.channel_count(), 4);
    }

    #[test]
    fn rig_rejects_overlap_at_adjacency_boundary() {
        let ft = simple_type();
        let mut rig = Rig::new();
        let f1 = ft.instantiate(1, 1, Vec3::ZERO, Vec::new(), HashMap::new());
        rig.add(f1).unwrap();

        // ft occupies 4 channels; placing a second fixture starting at
        // address 4 overlaps the first fixture's last channel (4).
        let f2 = ft.instantiate(1, 4, Vec3::ZERO, Vec::new(), HashMap::new());
        assert!(rig.add(f2).is_err());
    }

    #[test]
    fn rig_accepts_adjacent_non_overlapping_fixtures() {
        let ft = simple_type();
        let mut rig = Rig::new();
        let f1 = ft.instantiate(1, 1, Vec3::ZERO, Vec::new(), HashMap::new());
        rig.add(f1).unwrap();

        let f2 = ft.instantiate(1, 5, Vec3::ZERO, Vec::new(), HashMap::new());
        assert!(rig.add(f2).is_ok());
    }

    #[test]
    fn encode_resolves_dimmer_and_color_with_fade() {
        let ft = simple_type();
        let mut state = FixtureState::new();
        state.set("dimmer", AttrValue::Scalar(0.5));
        state.set("color", AttrValue::Tuple(vec![1.0, 1.0, 1.0]));

        let bytes = ft.encode(&state);
        assert_eq!(bytes[&0], 127);
        assert_eq!(bytes[&1], 255);
        assert_eq!(bytes[&2], 255);
        assert_eq!(bytes[&3], 255);
    }

    #[test]
    fn segmented_rgbw_repeats_broadcast_color_per_segment() {
        use crate::model::attribute::RgbwAttr;
        let ft = Arc::new(FixtureType::new(vec![Box::new(DimmerAttr::new(false)), Box::new(RgbwAttr::new(4))]));
        let mut state = FixtureState::new();
        state.set("dimmer", AttrValue::Scalar(1.0));
        state.set("color", AttrValue::Tuple(vec![1.0, 0.0, 0.0]));

        let bytes = ft.encode(&state);
        assert_eq!(bytes[&0], 255);
        for seg in 0..4 {
            let base = 1 + seg * 4;
            assert_eq!(bytes[&base], 255);
            assert_eq!(bytes[&(base + 1)], 0);
            assert_eq!(bytes[&(base + 2)], 0);
            assert_eq!(bytes[&(base + 3)], 0);
        }
    }

    #[test]
    fn encode_to_dmx_discards_out_of_range_channels() {
        let ft = simple_type();
        let mut rig = Rig::new();
        let f = ft.instantiate(1, 510, Vec3::ZERO, Vec::new(), HashMap::new());
        let id = rig.add(f).unwrap();

        let mut states = HashMap::new();
        states.insert(id, FixtureState::new());
        let universes = rig.encode_to_dmx(&states);
        let data = &universes[&1];
        assert!(data.keys().all(|&ch| (1..=512).contains(&ch)));
    }
}
