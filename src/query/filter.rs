//! Query-string filters for visit listings and mark averages.
//!
//! Filters are parsed in full before a scan starts; a malformed value for a
//! recognised parameter fails the whole query. Parameters with other names
//! are ignored.

use crate::core::{Gender, Location, Result, StoreError, User, Visit};
use std::collections::HashMap;

pub const FROM_DATE: &str = "fromDate";
pub const TO_DATE: &str = "toDate";
pub const COUNTRY: &str = "country";
pub const TO_DISTANCE: &str = "toDistance";
pub const GENDER: &str = "gender";
pub const FROM_AGE: &str = "fromAge";
pub const TO_AGE: &str = "toAge";

/// Open interval on `visited_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl DateWindow {
    fn from_params(params: &HashMap<String, String>) -> Result<Self> {
        Ok(Self {
            from: unsigned_param(params, FROM_DATE)?,
            to: unsigned_param(params, TO_DATE)?,
        })
    }

    pub fn contains(&self, visited_at: i64) -> bool {
        self.from.is_none_or(|from| visited_at > from) && self.to.is_none_or(|to| visited_at < to)
    }
}

/// Filters accepted by a user's visit listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitFilter {
    pub dates: DateWindow,
    pub country: Option<String>,
    pub to_distance: Option<i64>,
}

impl VisitFilter {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self> {
        Ok(Self {
            dates: DateWindow::from_params(params)?,
            country: params
                .get(COUNTRY)
                .filter(|country| !country.is_empty())
                .cloned(),
            to_distance: unsigned_param(params, TO_DISTANCE)?,
        })
    }

    pub fn matches_visit(&self, visit: &Visit) -> bool {
        self.dates.contains(visit.visited_at)
    }

    pub fn matches_location(&self, location: &Location) -> bool {
        self.country
            .as_deref()
            .is_none_or(|country| location.country == country)
            && self
                .to_distance
                .is_none_or(|bound| i64::from(location.distance) < bound)
    }
}

/// Filters accepted by a location's mark average.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AverageFilter {
    pub dates: DateWindow,
    pub gender: Option<Gender>,
    pub from_age: Option<i64>,
    pub to_age: Option<i64>,
}

impl AverageFilter {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self> {
        let gender = params
            .get(GENDER)
            .map(|raw| raw.parse::<Gender>().map_err(StoreError::filter))
            .transpose()?;
        Ok(Self {
            dates: DateWindow::from_params(params)?,
            gender,
            from_age: unsigned_param(params, FROM_AGE)?,
            to_age: unsigned_param(params, TO_AGE)?,
        })
    }

    pub fn matches_visit(&self, visit: &Visit) -> bool {
        self.dates.contains(visit.visited_at)
    }

    /// Whether any filter looks at the visiting user.
    pub fn needs_user(&self) -> bool {
        self.gender.is_some() || self.from_age.is_some() || self.to_age.is_some()
    }

    pub fn matches_user(&self, user: &User) -> bool {
        self.gender.is_none_or(|gender| gender.matches(&user.gender))
            && self.from_age.is_none_or(|bound| user.age >= bound)
            && self.to_age.is_none_or(|bound| user.age < bound)
    }
}

/// Reads an optional unsigned integer parameter.
fn unsigned_param(params: &HashMap<String, String>, key: &str) -> Result<Option<i64>> {
    let Some(raw) = params.get(key) else {
        return Ok(None);
    };
    let value = raw
        .parse::<u64>()
        .ok()
        .and_then(|value| i64::try_from(value).ok())
        .ok_or_else(|| StoreError::filter(format!("'{key}' must be an unsigned integer, got '{raw}'")))?;
    Ok(Some(value))
}
