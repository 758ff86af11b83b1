use std::sync::Arc;

use indexmap::IndexSet;
use parking_lot::Mutex;

use super::fixture::{FixtureId, Rig};

/// A named membership set of fixtures, usable directly as a selector.
/// Groups are declared before the fixtures that join them; fixtures
/// register into their declared groups at construction via
/// [`FixtureGroup::register`]. Groups hold only [`FixtureId`] handles —
/// non-owning — so membership never extends a fixture's lifetime; the
/// [`Rig`] is the sole owner.
#[derive(Debug, Default)]
pub struct FixtureGroup {
    members: Mutex<IndexSet<FixtureId>>,
}

impl FixtureGroup {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a fixture as belonging to this group. Called by
    /// [`super::fixture::FixtureType::instantiate`] for every group the
    /// fixture declares.
    pub fn register(&self, id: FixtureId) {
        self.members.lock().insert(id);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.lock().is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: FixtureId) -> bool {
        self.members.lock().contains(&id)
    }

    /// Union of two groups: a new, independent group containing members
    /// of both.
    #[must_use]
    pub fn union(&self, other: &FixtureGroup) -> Arc<FixtureGroup> {
        let result = FixtureGroup::new();
        {
            let mut members = result.members.lock();
            members.extend(self.members.lock().iter().copied());
            members.extend(other.members.lock().iter().copied());
        }
        result
    }

    /// Intersection of two groups.
    #[must_use]
    pub fn intersection(&self, other: &FixtureGroup) -> Arc<FixtureGroup> {
        let result = FixtureGroup::new();
        let other_members = other.members.lock();
        let mut members = result.members.lock();
        for id in self.members.lock().iter() {
            if other_members.contains(id) {
                members.insert(*id);
            }
        }
        drop(members);
        drop(other_members);
        result
    }

    /// Members of `self` that are not in `other`.
    #[must_use]
    pub fn difference(&self, other: &FixtureGroup) -> Arc<FixtureGroup> {
        let result = FixtureGroup::new();
        let other_members = other.members.lock();
        let mut members = result.members.lock();
        for id in self.members.lock().iter() {
            if !other_members.contains(id) {
                members.insert(*id);
            }
        }
        drop(members);
        drop(other_members);
        result
    }

    /// Members in exactly one of the two groups.
    #[must_use]
    pub fn symmetric_difference(&self, other: &FixtureGroup) -> Arc<FixtureGroup> {
        let result = FixtureGroup::new();
        let self_members = self.members.lock();
        let other_members = other.members.lock();
        let mut members = result.members.lock();
        for id in self_members.iter() {
            if !other_members.contains(id) {
                members.insert(*id);
            }
        }
        for id in other_members.iter() {
            if !self_members.contains(id) {
                members.insert(*id);
            }
        }
        drop(members);
        result
    }
}

/// A selector resolves to the set of fixtures (in a rig) it designates.
/// Groups, single fixtures, concrete collections, and arbitrary functions
/// over the rig all satisfy this uniformly.
pub trait Selector {
    fn select(&self, rig: &Rig) -> Vec<FixtureId>;
}

impl Selector for Arc<FixtureGroup> {
    fn select(&self, rig: &Rig) -> Vec<FixtureId> {
        rig.all().into_iter().filter(|id| self.contains(*id)).collect()
    }
}

impl Selector for FixtureId {
    fn select(&self, rig: &Rig) -> Vec<FixtureId> {
        if rig.contains(*self) {
            vec![*self]
        } else {
            Vec::new()
        }
    }
}

impl Selector for Vec<FixtureId> {
    fn select(&self, rig: &Rig) -> Vec<FixtureId> {
        self.iter().copied().filter(|id| rig.contains(*id)).collect()
    }
}

impl<F> Selector for F
where
    F: Fn(&Rig) -> Vec<FixtureId>,
{
    fn select(&self, rig: &Rig) -> Vec<FixtureId> {
        self(rig)
    }
}
