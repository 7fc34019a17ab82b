//! SQLite backend
//!
//! One table per persisted kind, columns taken from the kind's field schema,
//! plus `place_amenity` for the place/amenity link. The registry is the
//! working set; `save` flushes the keys touched since the last save in one
//! transaction. Attributes outside a kind's schema live in memory only.

use std::collections::BTreeSet;
use std::path::Path;

use hbnb_core::model::{split_key, FieldSpec, FieldType};
use hbnb_core::ops::relations::{amenity_ids, cascade_keys, detach_amenity, link_amenity};
use hbnb_core::storage::{Backend, Storage, StorageResult};
use hbnb_core::{log_op_end, log_op_error, log_op_start};
use hbnb_core::{Entity, EntityKind, ExError, Registry};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, Transaction};
use serde_json::{Map, Number, Value};

use crate::db;
use crate::errors::{from_rusqlite, Result};
use crate::migrations::{apply_migrations, reset_schema};

/// Persisted kinds, parents before children so inserts satisfy foreign keys
const DB_CATALOG: [EntityKind; 6] = [
    EntityKind::State,
    EntityKind::User,
    EntityKind::Amenity,
    EntityKind::City,
    EntityKind::Place,
    EntityKind::Review,
];

/// Registry backed by a SQLite database
pub struct SqliteStorage {
    conn: Connection,
    registry: Registry,
    dirty: BTreeSet<String>,
    removed: BTreeSet<String>,
}

impl SqliteStorage {
    /// Open (or create) the database file and bring its schema up to date
    ///
    /// With `reset`, every managed table is dropped and recreated first.
    pub fn open(path: impl AsRef<Path>, reset: bool) -> Result<Self> {
        let mut conn = db::open(path)?;
        db::configure(&conn)?;
        if reset {
            reset_schema(&mut conn)?;
        } else {
            apply_migrations(&mut conn)?;
        }
        Ok(Self::with_connection(conn))
    }

    /// Private in-memory database, mainly for tests
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = db::open_in_memory()?;
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self::with_connection(conn))
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn,
            registry: Registry::new(),
            dirty: BTreeSet::new(),
            removed: BTreeSet::new(),
        }
    }

    /// Number of keys waiting for the next save
    pub fn pending(&self) -> usize {
        self.dirty.len() + self.removed.len()
    }

    fn flush(&mut self) -> Result<usize> {
        let tx = self.conn.transaction().map_err(from_rusqlite)?;

        for key in &self.removed {
            delete_row(&tx, key)?;
        }

        let mut written = 0;
        for kind in DB_CATALOG {
            for entity in self.registry.all(Some(kind)) {
                if self.dirty.contains(&entity.key()) {
                    upsert_row(&tx, entity)?;
                    written += 1;
                }
            }
        }

        tx.commit().map_err(from_rusqlite)?;

        for key in &self.dirty {
            if self.registry.get(key).map_or(false, |e| e.kind.table().is_none()) {
                tracing::warn!(entity_key = %key, "kind has no table; not persisted");
            }
        }
        self.dirty.clear();
        self.removed.clear();
        Ok(written)
    }

    fn hydrate(&self) -> Result<Registry> {
        let mut registry = Registry::new();
        let links = load_links(&self.conn)?;

        for kind in DB_CATALOG {
            for map in load_rows(&self.conn, kind)? {
                let mut entity =
                    Entity::from_map(kind, map).map_err(|e| ExError::from(e).with_op("db_reload"))?;
                if kind == EntityKind::Place {
                    let place_id = entity.id.clone();
                    for (_, amenity_id) in links.iter().filter(|(p, _)| *p == place_id) {
                        link_amenity(&mut entity, amenity_id);
                    }
                }
                registry.insert(entity);
            }
        }

        Ok(registry)
    }
}

/// Schema columns stored in the kind's own table
fn columns(kind: EntityKind) -> impl Iterator<Item = &'static FieldSpec> {
    kind.fields()
        .iter()
        .filter(|f| !matches!(f.ty, FieldType::ReferenceList(_)))
}

fn delete_row(tx: &Transaction, key: &str) -> Result<()> {
    let Some(table) = split_key(key)
        .and_then(|(class, _)| class.parse::<EntityKind>().ok())
        .and_then(|kind| kind.table())
    else {
        return Ok(());
    };
    let id = split_key(key).map(|(_, id)| id).unwrap_or_default();

    tx.execute(&format!("DELETE FROM {} WHERE id = ?1", table), [id])
        .map_err(from_rusqlite)?;
    Ok(())
}

fn upsert_row(tx: &Transaction, entity: &Entity) -> Result<()> {
    let Some(table) = entity.kind.table() else {
        return Ok(());
    };

    let mut names = vec!["id", "created_at", "updated_at"];
    let map = entity.to_map();
    let mut values: Vec<SqlValue> = ["id", "created_at", "updated_at"]
        .iter()
        .map(|k| map.get(*k).map_or(SqlValue::Null, to_sql))
        .collect();

    for field in columns(entity.kind) {
        names.push(field.name);
        values.push(match entity.attributes.get(field.name) {
            Some(value) => to_sql(value),
            None if field.ty == FieldType::Integer => SqlValue::Integer(0),
            None => SqlValue::Null,
        });
    }

    for (name, _) in entity.attributes.iter() {
        if entity.kind.field(name).is_none() {
            tracing::debug!(entity_key = %entity.key(), attribute = %name, "attribute not persisted");
        }
    }

    let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();
    let updates: Vec<String> = names
        .iter()
        .filter(|n| **n != "id" && **n != "created_at")
        .map(|n| format!("{} = excluded.{}", n, n))
        .collect();

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT(id) DO UPDATE SET {}",
        table,
        names.join(", "),
        placeholders.join(", "),
        updates.join(", ")
    );
    tx.execute(&sql, params_from_iter(values))
        .map_err(from_rusqlite)?;

    if entity.kind == EntityKind::Place {
        tx.execute("DELETE FROM place_amenity WHERE place_id = ?1", [&entity.id])
            .map_err(from_rusqlite)?;
        for amenity_id in amenity_ids(entity) {
            tx.execute(
                "INSERT OR IGNORE INTO place_amenity (place_id, amenity_id) VALUES (?1, ?2)",
                [&entity.id, &amenity_id],
            )
            .map_err(from_rusqlite)?;
        }
    }

    Ok(())
}

fn load_rows(conn: &Connection, kind: EntityKind) -> Result<Vec<Map<String, Value>>> {
    let Some(table) = kind.table() else {
        return Ok(Vec::new());
    };

    let mut names = vec!["id", "created_at", "updated_at"];
    names.extend(columns(kind).map(|f| f.name));

    let sql = format!("SELECT {} FROM {} ORDER BY id", names.join(", "), table);
    let mut stmt = conn.prepare(&sql).map_err(from_rusqlite)?;

    let rows = stmt
        .query_map([], |row| {
            let mut map = Map::new();
            for (i, name) in names.iter().enumerate() {
                let value: SqlValue = row.get(i)?;
                if let Some(json) = from_sql(value) {
                    map.insert(name.to_string(), json);
                }
            }
            Ok(map)
        })
        .map_err(from_rusqlite)?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)
}

fn load_links(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn
        .prepare("SELECT place_id, amenity_id FROM place_amenity ORDER BY place_id, amenity_id")
        .map_err(from_rusqlite)?;

    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(from_rusqlite)?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn from_sql(value: SqlValue) -> Option<Value> {
    match value {
        SqlValue::Null | SqlValue::Blob(_) => None,
        SqlValue::Integer(i) => Some(Value::from(i)),
        SqlValue::Real(f) => Number::from_f64(f).map(Value::Number),
        SqlValue::Text(s) => Some(Value::String(s)),
    }
}

impl Storage for SqliteStorage {
    fn backend(&self) -> Backend {
        Backend::Db
    }

    fn catalog(&self) -> &[EntityKind] {
        &DB_CATALOG
    }

    fn all(&self, kind: Option<EntityKind>) -> Vec<&Entity> {
        self.registry.all(kind)
    }

    fn get(&self, key: &str) -> Option<&Entity> {
        self.registry.get(key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Entity> {
        let entity = self.registry.get_mut(key)?;
        self.dirty.insert(key.to_string());
        Some(entity)
    }

    fn register(&mut self, entity: Entity) {
        let key = entity.key();
        self.removed.remove(&key);
        self.dirty.insert(key);
        self.registry.insert(entity);
    }

    fn delete(&mut self, key: &str) -> Vec<Entity> {
        if !self.registry.contains(key) {
            return Vec::new();
        }
        let dependents = cascade_keys(&self.registry, key);

        let removed: Vec<Entity> = std::iter::once(key.to_string())
            .chain(dependents)
            .filter_map(|k| self.registry.remove(&k))
            .collect();
        for entity in &removed {
            let key = entity.key();
            self.dirty.remove(&key);
            self.removed.insert(key);
        }
        for entity in removed.iter().filter(|e| e.kind == EntityKind::Amenity) {
            self.dirty.extend(detach_amenity(&mut self.registry, &entity.id));
        }
        removed
    }

    fn save(&mut self) -> StorageResult<()> {
        log_op_start!("db_save", pending = self.pending());
        let start = std::time::Instant::now();

        let written = self.flush().map_err(|e| {
            log_op_error!(
                "db_save",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "db_save",
            duration_ms = start.elapsed().as_millis() as u64,
            entity_count = written
        );
        Ok(())
    }

    fn reload(&mut self) -> StorageResult<()> {
        log_op_start!("db_reload");
        let start = std::time::Instant::now();

        let registry = self.hydrate().map_err(|e| {
            log_op_error!(
                "db_reload",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;
        self.registry = registry;
        self.dirty.clear();
        self.removed.clear();

        log_op_end!(
            "db_reload",
            duration_ms = start.elapsed().as_millis() as u64,
            entity_count = self.registry.len()
        );
        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        if self.pending() > 0 {
            self.save()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbnb_core::errors::ExErrorKind;
    use serde_json::json;

    fn state(name: &str) -> Entity {
        let mut entity = Entity::new(EntityKind::State);
        entity.set("name", json!(name));
        entity
    }

    #[test]
    fn test_catalog_excludes_base_model() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        assert!(storage.kind_named("BaseModel").is_none());
        assert_eq!(storage.kind_named("Place"), Some(EntityKind::Place));
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let california = state("California");
        let key = california.key();
        storage.register(california.clone());
        storage.save().unwrap();
        assert_eq!(storage.pending(), 0);

        storage.reload().unwrap();

        let restored = storage.get(&key).unwrap();
        assert_eq!(restored.str_attr("name"), Some("California"));
        assert_eq!(restored.to_string(), california.to_string());
    }

    #[test]
    fn test_missing_required_field_is_constraint_violation() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage.register(Entity::new(EntityKind::State));

        let err = storage.save().unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
    }

    #[test]
    fn test_dangling_reference_is_constraint_violation() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let mut city = Entity::new(EntityKind::City);
        city.set("name", json!("Nowhere"));
        city.set("state_id", json!("no-such-state"));
        storage.register(city);

        let err = storage.save().unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
    }

    #[test]
    fn test_update_through_get_mut_is_persisted() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let entity = state("Nevada");
        let key = entity.key();
        storage.register(entity);
        storage.save().unwrap();

        storage
            .get_mut(&key)
            .unwrap()
            .set("name", json!("Arizona"));
        storage.save().unwrap();
        storage.reload().unwrap();

        assert_eq!(storage.get(&key).unwrap().str_attr("name"), Some("Arizona"));
    }

    #[test]
    fn test_unknown_attribute_not_persisted() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let mut entity = state("Oregon");
        entity.set("nickname", json!("Beaver State"));
        let key = entity.key();
        storage.register(entity);
        storage.save().unwrap();

        storage.reload().unwrap();

        assert!(storage.get(&key).unwrap().attributes.get("nickname").is_none());
    }

    #[test]
    fn test_place_amenities_round_trip() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();

        let texas = state("Texas");
        let mut austin = Entity::new(EntityKind::City);
        austin.set("name", json!("Austin"));
        austin.set("state_id", json!(texas.id));
        let mut owner = Entity::new(EntityKind::User);
        owner.set("email", json!("a@b.c"));
        owner.set("password", json!("pwd"));
        let mut wifi = Entity::new(EntityKind::Amenity);
        wifi.set("name", json!("Wifi"));
        let mut loft = Entity::new(EntityKind::Place);
        loft.set("name", json!("Loft"));
        loft.set("city_id", json!(austin.id));
        loft.set("user_id", json!(owner.id));
        loft.set("amenity_ids", json!([wifi.id]));
        let loft_key = loft.key();

        for entity in [loft, wifi, owner, austin, texas] {
            storage.register(entity);
        }
        storage.save().unwrap();
        storage.reload().unwrap();

        let place = storage.get(&loft_key).unwrap();
        assert_eq!(amenity_ids(place).len(), 1);
        assert_eq!(place.field("number_rooms"), Some(json!(0)));
    }

    #[test]
    fn test_delete_cascades_in_registry_and_table() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let parent = state("Utah");
        let mut city = Entity::new(EntityKind::City);
        city.set("name", json!("Provo"));
        city.set("state_id", json!(parent.id));
        let parent_key = parent.key();
        let city_key = city.key();
        storage.register(parent);
        storage.register(city);
        storage.save().unwrap();

        let removed = storage.delete(&parent_key);
        assert_eq!(removed.len(), 2);
        storage.save().unwrap();
        storage.reload().unwrap();

        assert!(storage.get(&parent_key).is_none());
        assert!(storage.get(&city_key).is_none());
    }

    #[test]
    fn test_delete_amenity_keeps_linking_place_writable() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("hbnb.db");

        let texas = state("Texas");
        let mut austin = Entity::new(EntityKind::City);
        austin.set("name", json!("Austin"));
        austin.set("state_id", json!(texas.id));
        let mut owner = Entity::new(EntityKind::User);
        owner.set("email", json!("a@b.c"));
        owner.set("password", json!("pwd"));
        let mut wifi = Entity::new(EntityKind::Amenity);
        wifi.set("name", json!("Wifi"));
        let mut loft = Entity::new(EntityKind::Place);
        loft.set("name", json!("Loft"));
        loft.set("city_id", json!(austin.id));
        loft.set("user_id", json!(owner.id));
        loft.set("amenity_ids", json!([wifi.id]));
        let wifi_key = wifi.key();
        let loft_key = loft.key();

        {
            let mut storage = SqliteStorage::open(&path, false).unwrap();
            for entity in [texas, austin, owner, wifi, loft] {
                storage.register(entity);
            }
            storage.save().unwrap();
        }

        let mut storage = SqliteStorage::open(&path, false).unwrap();
        storage.reload().unwrap();
        storage.delete(&wifi_key);
        storage.save().unwrap();

        storage
            .get_mut(&loft_key)
            .unwrap()
            .set("name", json!("Attic"));
        storage.save().unwrap();
        storage.reload().unwrap();

        let place = storage.get(&loft_key).unwrap();
        assert_eq!(place.field("name"), Some(json!("Attic")));
        assert!(amenity_ids(place).is_empty());
    }
}
