//! JSON request bodies.
//!
//! Create bodies decode straight into entities. Update bodies are decoded
//! into patches: every known field is checked before the patch is returned,
//! `id` and `null` values are rejected, unknown fields are skipped.

use crate::core::{
    Entity, EntityKind, Location, LocationPatch, Patch, Result, StoreError, User, UserPatch,
    Visit, VisitPatch,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub fn decode_entity(kind: EntityKind, body: &[u8]) -> Result<Entity> {
    let entity = match kind {
        EntityKind::User => Entity::User(decode::<User>(body)?),
        EntityKind::Location => Entity::Location(decode::<Location>(body)?),
        EntityKind::Visit => Entity::Visit(decode::<Visit>(body)?),
    };
    Ok(entity)
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|err| StoreError::payload(err.to_string()))
}

pub fn decode_patch(kind: EntityKind, body: &[u8]) -> Result<Patch> {
    let fields = patch_fields(body)?;
    let patch = match kind {
        EntityKind::User => {
            let mut patch = UserPatch::default();
            for (key, value) in &fields {
                match key.as_str() {
                    "email" => patch.email = Some(text(key, value)?),
                    "first_name" => patch.first_name = Some(text(key, value)?),
                    "last_name" => patch.last_name = Some(text(key, value)?),
                    "gender" => patch.gender = Some(text(key, value)?),
                    "birth_date" => patch.birth_date = Some(signed(key, value)?),
                    _ => {}
                }
            }
            Patch::User(patch)
        }
        EntityKind::Location => {
            let mut patch = LocationPatch::default();
            for (key, value) in &fields {
                match key.as_str() {
                    "place" => patch.place = Some(text(key, value)?),
                    "country" => patch.country = Some(text(key, value)?),
                    "city" => patch.city = Some(text(key, value)?),
                    "distance" => patch.distance = Some(unsigned(key, value)?),
                    _ => {}
                }
            }
            Patch::Location(patch)
        }
        EntityKind::Visit => {
            let mut patch = VisitPatch::default();
            for (key, value) in &fields {
                match key.as_str() {
                    "location" => patch.location_id = Some(unsigned(key, value)?),
                    "user" => patch.user_id = Some(unsigned(key, value)?),
                    "visited_at" => patch.visited_at = Some(signed(key, value)?),
                    "mark" => patch.mark = Some(unsigned(key, value)?),
                    _ => {}
                }
            }
            Patch::Visit(patch)
        }
    };
    Ok(patch)
}

fn patch_fields(body: &[u8]) -> Result<Map<String, Value>> {
    let Value::Object(fields) = decode::<Value>(body)? else {
        return Err(StoreError::payload("update body must be a JSON object"));
    };
    if fields.contains_key("id") {
        return Err(StoreError::payload("'id' cannot be updated"));
    }
    if let Some((key, _)) = fields.iter().find(|(_, value)| value.is_null()) {
        return Err(StoreError::payload(format!("'{key}' must not be null")));
    }
    Ok(fields)
}

fn text(key: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| StoreError::payload(format!("'{key}' must be a string")))
}

fn signed(key: &str, value: &Value) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| StoreError::payload(format!("'{key}' must be an integer")))
}

fn unsigned<T: TryFrom<u64>>(key: &str, value: &Value) -> Result<T> {
    value
        .as_u64()
        .and_then(|raw| T::try_from(raw).ok())
        .ok_or_else(|| StoreError::payload(format!("'{key}' is out of range")))
}
