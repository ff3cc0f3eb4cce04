//! Partial updates.
//!
//! A patch holds one slot per updatable field; only the slots that are set
//! are applied. Patches are built (and validated) in full before the target
//! entity is touched, and they have no `id` slot at all.

use super::entity::{Location, User, Visit};
use super::error::{Result, StoreError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<i64>,
}

impl UserPatch {
    pub fn validate(&self) -> Result<()> {
        non_empty("email", self.email.as_deref())?;
        non_empty("first_name", self.first_name.as_deref())?;
        non_empty("last_name", self.last_name.as_deref())?;
        non_empty("gender", self.gender.as_deref())
    }

    /// Applies the present fields and recomputes the age when the birth date
    /// changed.
    pub fn apply(self, user: &mut User, current_date: i64) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(gender) = self.gender {
            user.gender = gender;
        }
        if let Some(birth_date) = self.birth_date {
            user.birth_date = birth_date;
            user.refresh_age(current_date);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationPatch {
    pub place: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub distance: Option<u32>,
}

impl LocationPatch {
    pub fn validate(&self) -> Result<()> {
        non_empty("place", self.place.as_deref())?;
        non_empty("country", self.country.as_deref())?;
        non_empty("city", self.city.as_deref())
    }

    pub fn apply(self, location: &mut Location) {
        if let Some(place) = self.place {
            location.place = place;
        }
        if let Some(country) = self.country {
            location.country = country;
        }
        if let Some(city) = self.city {
            location.city = city;
        }
        if let Some(distance) = self.distance {
            location.distance = distance;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitPatch {
    pub location_id: Option<u32>,
    pub user_id: Option<u32>,
    pub visited_at: Option<i64>,
    pub mark: Option<u8>,
}

impl VisitPatch {
    /// Applies the scalar fields. Owner ids are handled by the store, which
    /// has to move the visit between back-reference collections.
    pub fn apply_fields(&self, visit: &mut Visit) {
        if let Some(visited_at) = self.visited_at {
            visit.visited_at = visited_at;
        }
        if let Some(mark) = self.mark {
            visit.mark = mark;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    User(UserPatch),
    Location(LocationPatch),
    Visit(VisitPatch),
}

fn non_empty(field: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some("") => Err(StoreError::payload(format!("'{field}' must not be empty"))),
        _ => Ok(()),
    }
}
