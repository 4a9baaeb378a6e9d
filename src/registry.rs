//! Process-wide repository registry.
//!
//! Registrations are expected at program initialization, are write-once per
//! name, and are never cleared for the lifetime of the process. The maps sit
//! behind a lock so a late registration is still safe, but there is no
//! eviction and no way to re-bind a name.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use sea_orm::EntityTrait;

use crate::error::{RepoResult, RepositoryError};
use crate::query::entity_table;

#[derive(Default)]
struct Registry {
    by_name: HashMap<&'static str, TypeId>,
    by_entity: HashMap<TypeId, &'static str>,
}

static REGISTRY: Lazy<RwLock<Registry>> = Lazy::new(|| RwLock::new(Registry::default()));

/// Register a repository name for the entity `E`.
///
/// Fails with [`RepositoryError::DuplicateRegistration`] if the name is taken
/// or the entity already has a registered repository; the earlier
/// registration stays intact either way.
pub fn register<E>(name: &'static str) -> RepoResult<()>
where
    E: EntityTrait + 'static,
{
    let entity = TypeId::of::<E>();
    let mut registry = REGISTRY.write().expect("repository registry lock poisoned");

    if registry.by_name.contains_key(name) || registry.by_entity.contains_key(&entity) {
        return Err(RepositoryError::DuplicateRegistration {
            name: name.to_owned(),
        });
    }

    registry.by_name.insert(name, entity);
    registry.by_entity.insert(entity, name);
    tracing::debug!(repository = name, table = %entity_table::<E>(), "Repository registered");
    Ok(())
}

/// The name registered for entity `E`, if any.
pub fn registered_name<E>() -> Option<&'static str>
where
    E: EntityTrait + 'static,
{
    let registry = REGISTRY.read().expect("repository registry lock poisoned");
    registry.by_entity.get(&TypeId::of::<E>()).copied()
}

/// The repository name bound to entity `E`: the registered name when one
/// exists, otherwise the generic fallback derived from the table name.
pub fn repository_name<E>() -> String
where
    E: EntityTrait + 'static,
{
    match registered_name::<E>() {
        Some(name) => name.to_owned(),
        None => format!("Repository<{}>", entity_table::<E>()),
    }
}

/// Whether any repository is registered under `name`.
pub fn is_registered(name: &str) -> bool {
    let registry = REGISTRY.read().expect("repository registry lock poisoned");
    registry.by_name.contains_key(name)
}
