use super::types::{EntityKind, SECONDS_PER_YEAR};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub birth_date: i64,
    /// Derived from `birth_date` and the store's current date.
    #[serde(skip)]
    pub age: i64,
}

impl User {
    pub fn is_valid(&self) -> bool {
        self.id > 0
            && !self.email.is_empty()
            && !self.first_name.is_empty()
            && !self.last_name.is_empty()
            && !self.gender.is_empty()
    }

    pub fn refresh_age(&mut self, current_date: i64) {
        self.age = age_at(self.birth_date, current_date);
    }
}

/// Whole Julian years between `birth_date` and `current_date`, rounded down.
pub fn age_at(birth_date: i64, current_date: i64) -> i64 {
    (current_date - birth_date).div_euclid(SECONDS_PER_YEAR)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: u32,
    pub place: String,
    pub country: String,
    pub city: String,
    pub distance: u32,
}

impl Location {
    pub fn is_valid(&self) -> bool {
        self.id > 0 && !self.place.is_empty() && !self.country.is_empty() && !self.city.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub id: u32,
    #[serde(rename = "location")]
    pub location_id: u32,
    #[serde(rename = "user")]
    pub user_id: u32,
    pub visited_at: i64,
    pub mark: u8,
}

impl Visit {
    pub fn is_valid(&self) -> bool {
        self.id > 0
    }
}

/// Any stored entity, serialized as the bare record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Entity {
    User(User),
    Location(Location),
    Visit(Visit),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::User(_) => EntityKind::User,
            Entity::Location(_) => EntityKind::Location,
            Entity::Visit(_) => EntityKind::Visit,
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            Entity::User(user) => user.id,
            Entity::Location(location) => location.id,
            Entity::Visit(visit) => visit.id,
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Entity::User(user) => user.is_valid(),
            Entity::Location(location) => location.is_valid(),
            Entity::Visit(visit) => visit.is_valid(),
        }
    }
}

impl From<User> for Entity {
    fn from(user: User) -> Self {
        Entity::User(user)
    }
}

impl From<Location> for Entity {
    fn from(location: Location) -> Self {
        Entity::Location(location)
    }
}

impl From<Visit> for Entity {
    fn from(visit: Visit) -> Self {
        Entity::Visit(visit)
    }
}
