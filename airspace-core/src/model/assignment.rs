//! Binary assignments to model variables.

use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{ModelError, VariableId, VariableKey, VariableRegistry};

/// The set of variables assigned one; every other variable is zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Assignment {
    active: BTreeSet<VariableId>,
}

impl Assignment {
    /// Assignment with exactly `ids` set.
    #[must_use]
    pub fn from_active<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = VariableId>,
    {
        Self {
            active: ids.into_iter().collect(),
        }
    }

    /// Assignment with the variables behind `keys` set.
    ///
    /// Fails on the first key the registry does not know.
    pub fn from_keys<I>(registry: &VariableRegistry, keys: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = VariableKey>,
    {
        keys.into_iter()
            .map(|key| registry.require(&key))
            .collect::<Result<BTreeSet<_>, _>>()
            .map(|active| Self { active })
    }

    /// Set `id` to one.
    pub fn activate(&mut self, id: VariableId) {
        self.active.insert(id);
    }

    /// Whether `id` is set.
    #[must_use]
    pub fn is_active(&self, id: VariableId) -> bool {
        self.active.contains(&id)
    }

    /// Value of `id` as `0` or `1`.
    #[must_use]
    pub fn value(&self, id: VariableId) -> u8 {
        u8::from(self.is_active(id))
    }

    /// Set variables in id order.
    pub fn active(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.active.iter().copied()
    }

    /// Number of set variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether every variable is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl FromIterator<VariableId> for Assignment {
    fn from_iter<T: IntoIterator<Item = VariableId>>(iter: T) -> Self {
        Self::from_active(iter)
    }
}
