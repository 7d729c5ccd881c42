//! Schema registrar
//!
//! Builds the ordered entity registry and ensures every entity has its
//! relation. The pass is sequential and fail-fast: the first creation error
//! is returned as-is and later entities are not attempted. Relations created
//! earlier in the same pass are left in place.

use crate::Result;
use crate::entity::{EntityDescriptor, EntityKind};

/// Options passed to each relation creation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateTableOptions {
    pub if_not_exists: bool,
}

impl Default for CreateTableOptions {
    fn default() -> Self {
        Self { if_not_exists: true }
    }
}

/// A database handle able to create relations.
///
/// Implementations must treat an already-existing relation as success when
/// `options.if_not_exists` is set.
pub trait RelationCatalog {
    fn ensure_relation_exists(
        &self,
        descriptor: &EntityDescriptor,
        options: &CreateTableOptions,
    ) -> Result<()>;
}

/// Entity kinds in registration order
pub fn register_kinds() -> Vec<EntityKind> {
    EntityKind::all().to_vec()
}

/// Fresh list of entity descriptors, in registration order
pub fn register() -> Vec<EntityDescriptor> {
    register_kinds().iter().map(EntityKind::descriptor).collect()
}

/// Ensure every registered entity has a relation in `catalog`
pub fn initialize_schema<C: RelationCatalog + ?Sized>(catalog: &C) -> Result<()> {
    let options = CreateTableOptions::default();
    for descriptor in register() {
        catalog.ensure_relation_exists(&descriptor, &options)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::cell::RefCell;

    /// Records requests and fails on the n-th one (1-based)
    struct RecordingCatalog {
        calls: RefCell<Vec<&'static str>>,
        fail_on: Option<usize>,
    }

    impl RecordingCatalog {
        fn new(fail_on: Option<usize>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_on,
            }
        }
    }

    impl RelationCatalog for RecordingCatalog {
        fn ensure_relation_exists(
            &self,
            descriptor: &EntityDescriptor,
            options: &CreateTableOptions,
        ) -> Result<()> {
            assert!(options.if_not_exists);
            let mut calls = self.calls.borrow_mut();
            calls.push(descriptor.relation);
            if Some(calls.len()) == self.fail_on {
                return Err(Error::InvalidDescriptor(format!("boom on {}", descriptor.relation)));
            }
            Ok(())
        }
    }

    #[test]
    fn test_register_order() {
        let relations: Vec<_> = register().iter().map(|d| d.relation).collect();
        assert_eq!(
            relations,
            vec![
                "block_refs",
                "transaction_refs",
                "transactions",
                "continues_indexed_rounds",
                "blocks",
                "logs",
            ]
        );
    }

    #[test]
    fn test_register_is_fresh() {
        let mut first = register();
        first.pop();
        assert_eq!(register().len(), 6);
        assert_eq!(register_kinds().len(), 6);
    }

    #[test]
    fn test_initialize_visits_all_in_order() {
        let catalog = RecordingCatalog::new(None);
        initialize_schema(&catalog).unwrap();
        assert_eq!(
            *catalog.calls.borrow(),
            register().iter().map(|d| d.relation).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_initialize_stops_on_first_failure() {
        let catalog = RecordingCatalog::new(Some(3));
        let err = initialize_schema(&catalog).unwrap_err();
        match err {
            Error::InvalidDescriptor(msg) => assert_eq!(msg, "boom on transactions"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            *catalog.calls.borrow(),
            vec!["block_refs", "transaction_refs", "transactions"]
        );
    }

    #[test]
    fn test_initialize_through_trait_object() {
        let catalog = RecordingCatalog::new(None);
        let dyn_catalog: &dyn RelationCatalog = &catalog;
        initialize_schema(dyn_catalog).unwrap();
        assert_eq!(catalog.calls.borrow().len(), 6);
    }
}
