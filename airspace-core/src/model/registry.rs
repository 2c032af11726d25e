//! Variable namespace owned by one build.

use std::collections::HashMap;

use super::{ModelError, VariableId, VariableKey};

/// Interns [`VariableKey`]s into dense [`VariableId`]s.
///
/// Ids are assigned in first-declaration order and never reused, so a model
/// built twice from the same inputs has identical ids.
///
/// # Examples
/// ```
/// use airspace_core::model::{EdgeKey, VariableKey, VariableRegistry};
/// use airspace_core::{FlightNumber, VoxelIndex};
///
/// let mut registry = VariableRegistry::default();
/// let key = VariableKey::Edge(EdgeKey {
///     flight: FlightNumber(1),
///     from: VoxelIndex(1),
///     to: VoxelIndex(2),
/// });
/// let first = registry.intern(key);
/// assert_eq!(registry.intern(key), first);
/// assert!(registry.declare(key).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableRegistry {
    keys: Vec<VariableKey>,
    ids: HashMap<VariableKey, VariableId>,
}

impl VariableRegistry {
    /// Id for `key`, creating the variable on first use.
    pub fn intern(&mut self, key: VariableKey) -> VariableId {
        if let Some(&id) = self.ids.get(&key) {
            return id;
        }
        self.insert(key)
    }

    /// Create a variable for `key`, failing if it already exists.
    pub fn declare(&mut self, key: VariableKey) -> Result<VariableId, ModelError> {
        if self.ids.contains_key(&key) {
            return Err(ModelError::VariableKeyCollision { key });
        }
        Ok(self.insert(key))
    }

    fn insert(&mut self, key: VariableKey) -> VariableId {
        let id = VariableId(self.keys.len());
        self.keys.push(key);
        self.ids.insert(key, id);
        id
    }

    /// Id of an existing variable.
    #[must_use]
    pub fn id(&self, key: &VariableKey) -> Option<VariableId> {
        self.ids.get(key).copied()
    }

    /// Id of an existing variable, or [`ModelError::UnknownKey`].
    pub fn require(&self, key: &VariableKey) -> Result<VariableId, ModelError> {
        self.id(key).ok_or(ModelError::UnknownKey { key: *key })
    }

    /// Key behind `id`.
    #[must_use]
    pub fn key(&self, id: VariableId) -> Option<&VariableKey> {
        self.keys.get(id.0)
    }

    /// Variables in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (VariableId, &VariableKey)> + '_ {
        self.keys
            .iter()
            .enumerate()
            .map(|(position, key)| (VariableId(position), key))
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no variables exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Cell, Maneuver};
    use crate::model::OccupancyKey;
    use rstest::rstest;

    fn key(time: usize) -> VariableKey {
        VariableKey::Occupancy(OccupancyKey {
            time,
            aircraft: 0,
            cell: Cell::new(0, 0, 0),
            maneuver: Maneuver::Level,
        })
    }

    #[rstest]
    fn intern_is_idempotent() {
        let mut registry = VariableRegistry::default();
        let a = registry.intern(key(0));
        let b = registry.intern(key(1));
        assert_eq!(registry.intern(key(0)), a);
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[rstest]
    fn strict_declaration_reports_collision() {
        let mut registry = VariableRegistry::default();
        registry.declare(key(0)).expect("fresh key");
        let err = registry.declare(key(0)).expect_err("collision");
        assert_eq!(err, ModelError::VariableKeyCollision { key: key(0) });
    }

    #[rstest]
    fn lookups_round_trip_through_handles() {
        let mut registry = VariableRegistry::default();
        let id = registry.intern(key(4));
        assert_eq!(registry.key(id), Some(&key(4)));
        assert_eq!(registry.require(&key(4)), Ok(id));
        assert_eq!(
            registry.require(&key(5)),
            Err(ModelError::UnknownKey { key: key(5) })
        );
    }
}
