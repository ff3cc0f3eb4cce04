pub mod filter;

pub use filter::{AverageFilter, DateWindow, VisitFilter};

use crate::core::{Entity, EntityKind, Result, StoreError};
use crate::storage::EntityStore;
use serde::Serialize;
use std::sync::Arc;

/// One entry of a user's visit listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitSummary {
    pub mark: u8,
    pub visited_at: i64,
    pub place: String,
}

/// Read-only operations over the store.
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<EntityStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    pub fn entity_by_id(&self, kind: EntityKind, id: u32) -> Result<Entity> {
        self.store
            .get(kind, id)?
            .ok_or_else(|| StoreError::not_found(kind, id))
    }

    pub fn ensure_exists(&self, kind: EntityKind, id: u32) -> Result<()> {
        let exists = match kind {
            EntityKind::User => self.store.users().contains(id)?,
            EntityKind::Location => self.store.locations().contains(id)?,
            EntityKind::Visit => self.store.visits().contains(id)?,
        };
        if exists {
            Ok(())
        } else {
            Err(StoreError::not_found(kind, id))
        }
    }

    /// Visits of a user that pass every filter, oldest first.
    pub fn list_visits(&self, user_id: u32, filter: &VisitFilter) -> Result<Vec<VisitSummary>> {
        let locations = self.store.locations();
        let mut summaries = Vec::new();

        self.store.scan_user_visits(user_id, |visit| {
            if !filter.matches_visit(visit) {
                return Ok(());
            }
            let place = locations.read(visit.location_id, |location| {
                filter
                    .matches_location(location)
                    .then(|| location.place.clone())
            })?;
            if let Some(Some(place)) = place {
                summaries.push(VisitSummary {
                    mark: visit.mark,
                    visited_at: visit.visited_at,
                    place,
                });
            }
            Ok(())
        })?;

        summaries.sort_by_key(|summary| summary.visited_at);
        Ok(summaries)
    }

    /// Mean mark of a location's visits that pass every filter, rounded to
    /// five decimals. Zero when nothing matches.
    pub fn average_mark(&self, location_id: u32, filter: &AverageFilter) -> Result<f64> {
        let users = self.store.users();
        let needs_user = filter.needs_user();
        let mut count: u64 = 0;
        let mut sum: u64 = 0;

        self.store.scan_location_visits(location_id, |visit| {
            if !filter.matches_visit(visit) {
                return Ok(());
            }
            if needs_user {
                let matched = users.read(visit.user_id, |user| filter.matches_user(user))?;
                if matched != Some(true) {
                    return Ok(());
                }
            }
            count += 1;
            sum += u64::from(visit.mark);
            Ok(())
        })?;

        if count == 0 {
            return Ok(0.0);
        }
        Ok(round_to_places(sum as f64 / count as f64, 5))
    }
}

/// Rounds half away from zero to `places` decimal digits.
pub fn round_to_places(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
