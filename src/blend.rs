use indexmap::IndexMap;

use crate::model::attribute::AttrValue;
use crate::model::state::FixtureState;

/// How a delta's operand composes with a fixture's current attribute
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BlendOp {
    /// Overwrite the current value entirely.
    Set,
    /// `clamp(current + value, 0, 1)`, component-wise for tuples.
    AddClamp,
    /// `clamp(current * value, 0, 1)`, component-wise for tuples.
    Mul,
}

fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

fn apply_scalar_op(current: f64, op: BlendOp, value: f64) -> f64 {
    match op {
        BlendOp::Set => value,
        BlendOp::AddClamp => clamp01(current + value),
        BlendOp::Mul => clamp01(current * value),
    }
}

/// Apply a blend op to a single attribute value, reading the current
/// value from state (default-zero per the operand's arity when absent).
fn apply_op(current: Option<&AttrValue>, op: BlendOp, value: &AttrValue) -> AttrValue {
    match value {
        AttrValue::Scalar(v) => {
            let c = current.map_or(0.0, AttrValue::scalar);
            AttrValue::Scalar(apply_scalar_op(c, op, *v))
        }
        AttrValue::Tuple(v) => {
            let current_tuple = match current {
                Some(AttrValue::Tuple(t)) => t.clone(),
                Some(AttrValue::Color(c)) => c.channels().to_vec(),
                Some(AttrValue::Raw(r)) => r.channels().to_vec(),
                _ => vec![0.0; v.len()],
            };
            let result = v
                .iter()
                .enumerate()
                .map(|(i, val)| {
                    let c = current_tuple.get(i).copied().unwrap_or(0.0);
                    apply_scalar_op(c, op, *val)
                })
                .collect();
            AttrValue::Tuple(result)
        }
        AttrValue::Color(c) => {
            let current_tuple = match current {
                Some(AttrValue::Tuple(t)) => t.clone(),
                Some(AttrValue::Color(cc)) => cc.channels().to_vec(),
                Some(AttrValue::Raw(r)) => r.channels().to_vec(),
                _ => vec![0.0; c.channels().len()],
            };
            let result: Vec<f64> = c
                .channels()
                .iter()
                .enumerate()
                .map(|(i, val)| {
                    let cur = current_tuple.get(i).copied().unwrap_or(0.0);
                    apply_scalar_op(cur, op, *val)
                })
                .collect();
            AttrValue::Color(crate::model::color::Color::from_channels(result))
        }
        // Non-numeric (Raw): only SET is meaningful, otherwise keep current.
        AttrValue::Raw(_) => {
            if op == BlendOp::Set {
                value.clone()
            } else {
                current.cloned().unwrap_or_else(|| value.clone())
            }
        }
    }
}

/// A per-fixture delta: attribute key to `(op, operand)`. Additive
/// instructions, not a state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureDelta(IndexMap<String, (BlendOp, AttrValue)>);

impl FixtureDelta {
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn set(&mut self, key: impl Into<String>, op: BlendOp, value: AttrValue) {
        self.0.insert(key.into(), (op, value));
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&(BlendOp, AttrValue)> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &(BlendOp, AttrValue))> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert or overwrite this key in-place, matching Scene layer
    /// overlay semantics ("later layers overwrite earlier ones per
    /// attribute key").
    pub fn overlay(&mut self, other: &FixtureDelta) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Scale every numeric operand by `factor`, preserving each entry's
    /// `BlendOp`. Used for tempo/master attenuation.
    #[must_use]
    pub fn scale(&self, factor: f64) -> FixtureDelta {
        let scaled = self
            .0
            .iter()
            .map(|(k, (op, v))| {
                let scaled_value = match v {
                    AttrValue::Scalar(s) => AttrValue::Scalar(s * factor),
                    AttrValue::Tuple(t) => AttrValue::Tuple(t.iter().map(|c| c * factor).collect()),
                    AttrValue::Color(c) => {
                        AttrValue::Color(crate::model::color::Color::from_channels(
                            c.channels().iter().map(|c| c * factor).collect::<Vec<_>>(),
                        ))
                    }
                    AttrValue::Raw(_) => v.clone(),
                };
                (k.clone(), (*op, scaled_value))
            })
            .collect();
        FixtureDelta(scaled)
    }
}

impl FromIterator<(String, (BlendOp, AttrValue))> for FixtureDelta {
    fn from_iter<T: IntoIterator<Item = (String, (BlendOp, AttrValue))>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Apply a single delta to a state, returning a new state. Reads the
/// current attribute value from `state` (default-zero per arity), applies
/// the op, writes back.
#[must_use]
pub fn apply_delta(state: &FixtureState, delta: &FixtureDelta) -> FixtureState {
    let mut new_state = state.clone();
    for (name, (op, value)) in delta.iter() {
        let current = new_state.get(name);
        let new_value = apply_op(current, *op, value);
        new_state.set(name.to_string(), new_value);
    }
    new_state
}

/// Apply a sequence of deltas, in order, against `initial` (or an empty
/// state). Ordering is the sole contract that makes composition
/// deterministic; callers MUST NOT reorder the input.
#[must_use]
pub fn merge_deltas(deltas: &[FixtureDelta], initial: Option<&FixtureState>) -> FixtureState {
    let mut state = initial.cloned().unwrap_or_default();
    for delta in deltas {
        state = apply_delta(&state, delta);
    }
    state
}
