use std::fmt;
use std::str::FromStr;

/// One Julian year in seconds, the divisor used to derive a user's age.
pub const SECONDS_PER_YEAR: i64 = 31_557_600;

/// The three entity kinds served by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Location,
    Visit,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::User, EntityKind::Location, EntityKind::Visit];

    /// Plural name used for routes, batch files and batch keys.
    pub fn plural(self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Location => "locations",
            EntityKind::Visit => "visits",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::Location => "location",
            EntityKind::Visit => "visit",
        };
        f.write_str(name)
    }
}

/// Gender codes recognised by the aggregate filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "m",
            Gender::Female => "f",
        }
    }

    pub fn matches(self, raw: &str) -> bool {
        self.code() == raw
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(Gender::Male),
            "f" => Ok(Gender::Female),
            other => Err(format!("gender must be 'm' or 'f', got '{other}'")),
        }
    }
}

/// Store capacities: the highest id each table can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub max_user_id: u32,
    pub max_location_id: u32,
    pub max_visit_id: u32,
}

impl Capacity {
    pub fn new(max_user_id: u32, max_location_id: u32, max_visit_id: u32) -> Self {
        Self {
            max_user_id,
            max_location_id,
            max_visit_id,
        }
    }
}

/// Sized for the full travels dataset. Every slot is allocated up front with
/// its record inline, so an empty store at these capacities already holds
/// roughly 0.8 GB; lower the limits for small datasets.
impl Default for Capacity {
    fn default() -> Self {
        Self::new(1_500_200, 1_000_000, 10_500_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(EntityKind::Location.plural(), "locations");
        assert_eq!(EntityKind::Visit.to_string(), "visit");
    }

    #[test]
    fn test_gender_accepts_only_two_codes() {
        assert_eq!("m".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("f".parse::<Gender>().unwrap(), Gender::Female);
        assert!("x".parse::<Gender>().is_err());
        assert!("".parse::<Gender>().is_err());
        assert!("M".parse::<Gender>().is_err());
    }
}
