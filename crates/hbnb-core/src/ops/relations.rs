//! Relationship traversal over the registry
//!
//! Foreign keys are plain attributes (`state_id`, `city_id`, `user_id`,
//! `place_id`) and `Place.amenity_ids` holds the many-to-many link to
//! amenities. Both backends share these rules so deletion cascades the same
//! way whichever one is active.

use std::collections::BTreeSet;

use serde_json::Value;

use super::registry::Registry;
use crate::model::{Entity, EntityKind};

fn referencing<'a>(
    registry: &'a Registry,
    kind: EntityKind,
    field: &str,
    id: &str,
) -> Vec<&'a Entity> {
    registry
        .all(Some(kind))
        .into_iter()
        .filter(|e| e.str_attr(field) == Some(id))
        .collect()
}

/// Cities belonging to a state
pub fn cities_of<'a>(registry: &'a Registry, state_id: &str) -> Vec<&'a Entity> {
    referencing(registry, EntityKind::City, "state_id", state_id)
}

/// Places located in a city
pub fn places_of<'a>(registry: &'a Registry, city_id: &str) -> Vec<&'a Entity> {
    referencing(registry, EntityKind::Place, "city_id", city_id)
}

/// Reviews written about a place
pub fn reviews_of<'a>(registry: &'a Registry, place_id: &str) -> Vec<&'a Entity> {
    referencing(registry, EntityKind::Review, "place_id", place_id)
}

/// Identifiers listed in a place's `amenity_ids`
pub fn amenity_ids(place: &Entity) -> Vec<String> {
    match place.attributes.get("amenity_ids") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn store_amenity_ids(place: &mut Entity, ids: Vec<String>) -> bool {
    place.set(
        "amenity_ids",
        Value::Array(ids.into_iter().map(Value::String).collect()),
    )
}

/// Link an amenity to a place; returns `false` if already linked
pub fn link_amenity(place: &mut Entity, amenity_id: &str) -> bool {
    let mut ids = amenity_ids(place);
    if ids.iter().any(|id| id == amenity_id) {
        return false;
    }
    ids.push(amenity_id.to_string());
    store_amenity_ids(place, ids)
}

/// Drop an amenity from a place; returns `false` if it was not linked
pub fn unlink_amenity(place: &mut Entity, amenity_id: &str) -> bool {
    let mut ids = amenity_ids(place);
    let before = ids.len();
    ids.retain(|id| id != amenity_id);
    if ids.len() == before {
        return false;
    }
    store_amenity_ids(place, ids)
}

/// Remove `amenity_id` from every place that links it
///
/// Returns the keys of the places that changed.
pub fn detach_amenity(registry: &mut Registry, amenity_id: &str) -> Vec<String> {
    let linking: Vec<String> = registry
        .all(Some(EntityKind::Place))
        .into_iter()
        .filter(|place| amenity_ids(place).iter().any(|id| id == amenity_id))
        .map(Entity::key)
        .collect();

    linking
        .into_iter()
        .filter(|key| {
            registry
                .get_mut(key)
                .map_or(false, |place| unlink_amenity(place, amenity_id))
        })
        .collect()
}

/// Keys of every entity deleted together with `key`, excluding `key` itself
///
/// State → cities → places → reviews; User → places and reviews;
/// Place → reviews. Deleting an amenity removes no other entity; the
/// places linking it are handled by [`detach_amenity`].
pub fn cascade_keys(registry: &Registry, key: &str) -> Vec<String> {
    let mut out = BTreeSet::new();
    let mut pending = vec![key.to_string()];

    while let Some(current) = pending.pop() {
        let Some(entity) = registry.get(&current) else {
            continue;
        };
        let children: Vec<&Entity> = match entity.kind {
            EntityKind::State => cities_of(registry, &entity.id),
            EntityKind::City => places_of(registry, &entity.id),
            EntityKind::Place => reviews_of(registry, &entity.id),
            EntityKind::User => {
                let mut owned = referencing(registry, EntityKind::Place, "user_id", &entity.id);
                owned.extend(referencing(
                    registry,
                    EntityKind::Review,
                    "user_id",
                    &entity.id,
                ));
                owned
            }
            _ => Vec::new(),
        };
        for child in children {
            let child_key = child.key();
            if child_key != key && out.insert(child_key.clone()) {
                pending.push(child_key);
            }
        }
    }

    out.into_iter().collect()
}
