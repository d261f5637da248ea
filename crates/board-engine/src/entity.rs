//! Entity Identity
//!
//! Shared identity contract for board entities and the temporary-id
//! allocator used while a create request is in flight.

/// Server-issued ids are positive; locally created entities carry a
/// negative id until the server answers.
pub type EntityId = i64;

pub type CardId = EntityId;
pub type TaskId = EntityId;
pub type ChecklistId = EntityId;
pub type ChecklistItemId = EntityId;
pub type CommentId = EntityId;
pub type LabelId = EntityId;

/// Core trait for all board entities
pub trait Entity: Clone {
    /// Returns the entity's identifier
    fn id(&self) -> EntityId;

    /// Overwrite the identifier (temp id -> server id)
    fn set_id(&mut self, id: EntityId);

    /// True while the entity has not been persisted yet
    fn is_temporary(&self) -> bool {
        is_temporary_id(self.id())
    }
}

pub fn is_temporary_id(id: EntityId) -> bool {
    id < 0
}

/// Find an entity by id in a slice
pub fn find<T: Entity>(items: &[T], id: EntityId) -> Option<&T> {
    items.iter().find(|e| e.id() == id)
}

/// Find an entity by id in a slice, mutably
pub fn find_mut<T: Entity>(items: &mut [T], id: EntityId) -> Option<&mut T> {
    items.iter_mut().find(|e| e.id() == id)
}

/// Swap a temporary id for the one the server assigned.
/// Returns false when the temp entity is gone (deleted or reconciled away).
pub fn promote<T: Entity>(items: &mut [T], temp_id: EntityId, server_id: EntityId) -> bool {
    match find_mut(items, temp_id) {
        Some(entity) => {
            entity.set_id(server_id);
            true
        }
        None => false,
    }
}

/// Allocator for temporary ids: -1, -2, -3, ...
///
/// Counter based rather than timestamp based so two creates in the same
/// millisecond never collide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TempIds {
    issued: i64,
}

impl TempIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> EntityId {
        self.issued += 1;
        -self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Dummy(EntityId);

    impl Entity for Dummy {
        fn id(&self) -> EntityId {
            self.0
        }
        fn set_id(&mut self, id: EntityId) {
            self.0 = id;
        }
    }

    #[test]
    fn test_temp_ids_are_negative_and_unique() {
        let mut ids = TempIds::new();
        let a = ids.next();
        let b = ids.next();
        assert!(a < 0 && b < 0);
        assert_ne!(a, b);
        assert!(is_temporary_id(a));
        assert!(!is_temporary_id(42));
    }

    #[test]
    fn test_promote() {
        let mut items = vec![Dummy(1), Dummy(-1)];
        assert!(promote(&mut items, -1, 7));
        assert_eq!(items, vec![Dummy(1), Dummy(7)]);
        assert!(!promote(&mut items, -1, 8));
        assert!(!items[1].is_temporary());
    }
}
