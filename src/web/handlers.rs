use super::payload::{decode_entity, decode_patch};
use super::{AppState, Result, WebError};
use crate::core::{Entity, EntityKind, StoreError};
use crate::query::{AverageFilter, VisitFilter, VisitSummary};
use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;

/// Path segment that turns a POST into a create.
const NEW_SEGMENT: &str = "new";

#[derive(Debug, Serialize)]
pub struct VisitsBody {
    pub visits: Vec<VisitSummary>,
}

#[derive(Debug, Serialize)]
pub struct AverageBody {
    pub avg: f64,
}

/// Path segment as sent. A segment axum cannot decode names no entity.
type Segment = std::result::Result<Path<String>, PathRejection>;

/// Query string as sent. A string that cannot be decoded is a bad filter.
type Params = std::result::Result<Query<HashMap<String, String>>, QueryRejection>;

fn parse_id(raw: &str) -> Result<u32> {
    raw.parse::<u32>().map_err(|_| WebError::NotFound)
}

fn path_segment(path: Segment) -> Result<String> {
    path.map(|Path(raw)| raw).map_err(|_| WebError::NotFound)
}

fn query_params(query: Params) -> Result<HashMap<String, String>> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| StoreError::filter(rejection.body_text()).into())
}

fn get_entity(state: &AppState, kind: EntityKind, raw_id: &str) -> Result<Json<Entity>> {
    let id = parse_id(raw_id)?;
    Ok(Json(state.queries.entity_by_id(kind, id)?))
}

/// Create when the path segment is `new`, otherwise update the entity it
/// names.
fn create_or_update(
    state: &AppState,
    kind: EntityKind,
    segment: &str,
    body: &[u8],
) -> Result<Json<Value>> {
    if segment == NEW_SEGMENT {
        let entity = decode_entity(kind, body)?;
        state.mutations.create(entity)?;
    } else {
        let id = parse_id(segment)?;
        state.queries.ensure_exists(kind, id)?;
        let patch = decode_patch(kind, body)?;
        state.mutations.update(kind, id, patch)?;
    }
    Ok(Json(json!({})))
}

pub async fn get_user(State(state): State<AppState>, path: Segment) -> Result<Json<Entity>> {
    get_entity(&state, EntityKind::User, &path_segment(path)?)
}

pub async fn get_location(
    State(state): State<AppState>,
    path: Segment,
) -> Result<Json<Entity>> {
    get_entity(&state, EntityKind::Location, &path_segment(path)?)
}

pub async fn get_visit(State(state): State<AppState>, path: Segment) -> Result<Json<Entity>> {
    get_entity(&state, EntityKind::Visit, &path_segment(path)?)
}

pub async fn post_user(
    State(state): State<AppState>,
    path: Segment,
    body: Bytes,
) -> Result<Json<Value>> {
    create_or_update(&state, EntityKind::User, &path_segment(path)?, &body)
}

pub async fn post_location(
    State(state): State<AppState>,
    path: Segment,
    body: Bytes,
) -> Result<Json<Value>> {
    create_or_update(&state, EntityKind::Location, &path_segment(path)?, &body)
}

pub async fn post_visit(
    State(state): State<AppState>,
    path: Segment,
    body: Bytes,
) -> Result<Json<Value>> {
    create_or_update(&state, EntityKind::Visit, &path_segment(path)?, &body)
}

pub async fn list_user_visits(
    State(state): State<AppState>,
    path: Segment,
    query: Params,
) -> Result<Json<VisitsBody>> {
    let id = parse_id(&path_segment(path)?)?;
    state.queries.ensure_exists(EntityKind::User, id)?;
    let filter = VisitFilter::from_params(&query_params(query)?)?;
    let visits = state.queries.list_visits(id, &filter)?;
    Ok(Json(VisitsBody { visits }))
}

pub async fn location_average(
    State(state): State<AppState>,
    path: Segment,
    query: Params,
) -> Result<Json<AverageBody>> {
    let id = parse_id(&path_segment(path)?)?;
    state.queries.ensure_exists(EntityKind::Location, id)?;
    let filter = AverageFilter::from_params(&query_params(query)?)?;
    let avg = state.queries.average_mark(id, &filter)?;
    Ok(Json(AverageBody { avg }))
}
