#![allow(dead_code)]

use std::sync::Arc;
use travelsdb::core::SECONDS_PER_YEAR;
use travelsdb::{Batch, Capacity, EntityKind, EntityStore, Loader, Location, User, Visit};

pub const CURRENT_DATE: i64 = 1_500_000_000;

pub fn capacity() -> Capacity {
    Capacity::new(100, 100, 200)
}

/// A user who turns `age` a little before the current date.
pub fn user(id: u32, gender: &str, age: i64) -> User {
    User {
        id,
        email: format!("user{id}@mail.test"),
        first_name: format!("First{id}"),
        last_name: format!("Last{id}"),
        gender: gender.to_string(),
        birth_date: CURRENT_DATE - age * SECONDS_PER_YEAR - 1_000,
        age: 0,
    }
}

pub fn location(id: u32, place: &str, country: &str, distance: u32) -> Location {
    Location {
        id,
        place: place.to_string(),
        country: country.to_string(),
        city: format!("City{id}"),
        distance,
    }
}

pub fn visit(id: u32, location_id: u32, user_id: u32, visited_at: i64, mark: u8) -> Visit {
    Visit {
        id,
        location_id,
        user_id,
        visited_at,
        mark,
    }
}

/// Users 1 (m, 30), 2 (f, 20), 3 (f, 45); locations 10 (Norway, 5),
/// 11 (Spain, 50), 12 (Norway, 20); location 10 has visits at 100/200/300
/// with marks 2/4/5.
pub fn batches() -> Vec<Batch> {
    vec![
        // deliberately out of kind order
        Batch::Visits {
            visits: vec![
                visit(100, 10, 1, 300, 5),
                visit(101, 10, 2, 100, 2),
                visit(102, 10, 3, 200, 4),
                visit(103, 11, 1, 150, 3),
                visit(104, 12, 1, 50, 1),
            ],
        },
        Batch::Locations {
            locations: vec![
                location(10, "Pier", "Norway", 5),
                location(11, "Beach", "Spain", 50),
                location(12, "Fjord", "Norway", 20),
            ],
        },
        Batch::Users {
            users: vec![user(1, "m", 30), user(2, "f", 20), user(3, "f", 45)],
        },
    ]
}

pub fn fixture() -> Arc<EntityStore> {
    let store = Loader::new(capacity())
        .load_batches(CURRENT_DATE, batches())
        .expect("fixture should load");
    Arc::new(store)
}

/// Every stored visit sits in exactly one user's and exactly one location's
/// collection, and those are the owners its fields name.
pub fn assert_back_refs_consistent(store: &EntityStore) {
    let capacity = store.capacity();
    for visit_id in 1..=capacity.max_visit_id {
        let Some(visit) = store.visits().get(visit_id).unwrap() else {
            continue;
        };
        for (kind, owner_id, max) in [
            (EntityKind::User, visit.user_id, capacity.max_user_id),
            (EntityKind::Location, visit.location_id, capacity.max_location_id),
        ] {
            let owners: Vec<u32> = (1..=max)
                .filter(|id| {
                    store
                        .owned_visit_ids(kind, *id)
                        .unwrap()
                        .contains(&visit_id)
                })
                .collect();
            assert_eq!(
                owners,
                vec![owner_id],
                "visit {visit_id} should belong only to {kind} {owner_id}"
            );
        }
        assert!(store.users().contains(visit.user_id).unwrap());
        assert!(store.locations().contains(visit.location_id).unwrap());
    }
}
