//! The entity store.
//!
//! Lock order, followed by every operation here:
//!
//! 1. user back-reference collections (ascending id)
//! 2. location back-reference collections (ascending id)
//! 3. visit records
//! 4. user and location records
//!
//! Readers only take read locks, so scans never block each other. A scan
//! holds its owner's collection for the whole enumeration; a relocation needs
//! that collection for writing, so a scan sees a visit either before or after
//! the move, never in both owners or in neither.

use super::owner::OwnerTable;
use super::table::Table;
use crate::core::{
    Capacity, Entity, EntityKind, Location, LocationPatch, Patch, Result, StoreError, User,
    UserPatch, Visit, VisitPatch,
};
use tracing::debug;

pub struct EntityStore {
    users: OwnerTable<User>,
    locations: OwnerTable<Location>,
    visits: Table<Visit>,
    capacity: Capacity,
    current_date: i64,
}

impl EntityStore {
    pub fn new(capacity: Capacity, current_date: i64) -> Self {
        Self {
            users: OwnerTable::new(EntityKind::User, capacity.max_user_id),
            locations: OwnerTable::new(EntityKind::Location, capacity.max_location_id),
            visits: Table::new(EntityKind::Visit, capacity.max_visit_id),
            capacity,
            current_date,
        }
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// The fixed date ages are computed against.
    pub fn current_date(&self) -> i64 {
        self.current_date
    }

    pub fn users(&self) -> &Table<User> {
        self.users.records()
    }

    pub fn locations(&self) -> &Table<Location> {
        self.locations.records()
    }

    pub fn visits(&self) -> &Table<Visit> {
        &self.visits
    }

    pub fn get(&self, kind: EntityKind, id: u32) -> Result<Option<Entity>> {
        let entity = match kind {
            EntityKind::User => self.users().get(id)?.map(Entity::User),
            EntityKind::Location => self.locations().get(id)?.map(Entity::Location),
            EntityKind::Visit => self.visits.get(id)?.map(Entity::Visit),
        };
        Ok(entity)
    }

    pub fn len(&self, kind: EntityKind) -> Result<usize> {
        match kind {
            EntityKind::User => self.users().len(),
            EntityKind::Location => self.locations().len(),
            EntityKind::Visit => self.visits.len(),
        }
    }

    // ------------------------------------------------------------------
    // Insertion (shared by the loader and online creates)
    // ------------------------------------------------------------------

    pub fn insert(&self, entity: Entity) -> Result<()> {
        match entity {
            Entity::User(user) => self.insert_user(user),
            Entity::Location(location) => self.insert_location(location),
            Entity::Visit(visit) => self.insert_visit(visit),
        }
    }

    pub fn insert_user(&self, mut user: User) -> Result<()> {
        user.refresh_age(self.current_date);
        let id = user.id;
        let mut slot = self.users().lock_slot(id)?;
        if slot.is_some() {
            return Err(StoreError::AlreadyExists {
                kind: EntityKind::User,
                id,
            });
        }
        *slot = Some(user);
        Ok(())
    }

    pub fn insert_location(&self, location: Location) -> Result<()> {
        let id = location.id;
        let mut slot = self.locations().lock_slot(id)?;
        if slot.is_some() {
            return Err(StoreError::AlreadyExists {
                kind: EntityKind::Location,
                id,
            });
        }
        *slot = Some(location);
        Ok(())
    }

    /// Stores the visit and links it into both owners' collections. Both
    /// owners must already exist.
    pub fn insert_visit(&self, visit: Visit) -> Result<()> {
        let mut user_refs = self.users.lock_refs(visit.user_id)?;
        let mut location_refs = self.locations.lock_refs(visit.location_id)?;
        let mut slot = self.visits.lock_slot(visit.id)?;

        if slot.is_some() {
            return Err(StoreError::AlreadyExists {
                kind: EntityKind::Visit,
                id: visit.id,
            });
        }
        self.ensure_owner(&self.users, visit.user_id)?;
        self.ensure_owner(&self.locations, visit.location_id)?;

        user_refs.link(visit.id);
        location_refs.link(visit.id);
        *slot = Some(visit);
        Ok(())
    }

    fn ensure_owner<T>(&self, owners: &OwnerTable<T>, id: u32) -> Result<()> {
        if owners.records().contains(id)? {
            Ok(())
        } else {
            Err(StoreError::MissingReference {
                kind: owners.kind(),
                id,
            })
        }
    }

    // ------------------------------------------------------------------
    // Updates
    // ------------------------------------------------------------------

    pub fn update(&self, kind: EntityKind, id: u32, patch: Patch) -> Result<()> {
        match (kind, patch) {
            (EntityKind::User, Patch::User(patch)) => self.update_user(id, patch),
            (EntityKind::Location, Patch::Location(patch)) => self.update_location(id, patch),
            (EntityKind::Visit, Patch::Visit(patch)) => self.update_visit(id, patch),
            (kind, _) => Err(StoreError::payload(format!("patch does not apply to a {kind}"))),
        }
    }

    pub fn update_user(&self, id: u32, patch: UserPatch) -> Result<()> {
        let current_date = self.current_date;
        self.users()
            .write(id, |user| -> Result<()> {
                patch.validate()?;
                patch.apply(user, current_date);
                Ok(())
            })?
            .ok_or_else(|| StoreError::not_found(EntityKind::User, id))?
    }

    pub fn update_location(&self, id: u32, patch: LocationPatch) -> Result<()> {
        self.locations()
            .write(id, |location| -> Result<()> {
                patch.validate()?;
                patch.apply(location);
                Ok(())
            })?
            .ok_or_else(|| StoreError::not_found(EntityKind::Location, id))?
    }

    /// Applies a visit patch, moving the visit between owners if the patch
    /// names a different user or location.
    ///
    /// The current owners are read first, then both old and new collections
    /// and the visit are locked in order. If a concurrent relocation changed
    /// the owners in between, the locks are released and the attempt repeats.
    pub fn update_visit(&self, id: u32, patch: VisitPatch) -> Result<()> {
        loop {
            let (user_id, location_id) = self
                .visits
                .read(id, |visit| (visit.user_id, visit.location_id))?
                .ok_or_else(|| StoreError::not_found(EntityKind::Visit, id))?;
            let next_user = patch.user_id.unwrap_or(user_id);
            let next_location = patch.location_id.unwrap_or(location_id);

            let mut user_refs = self.users.lock_refs_pair(user_id, next_user)?;
            let mut location_refs = self.locations.lock_refs_pair(location_id, next_location)?;
            let mut slot = self.visits.lock_slot(id)?;
            let visit = slot
                .as_mut()
                .ok_or_else(|| StoreError::not_found(EntityKind::Visit, id))?;

            if visit.user_id != user_id || visit.location_id != location_id {
                debug!(visit = id, "owners changed concurrently, retrying update");
                continue;
            }
            if next_user != user_id {
                self.ensure_owner(&self.users, next_user)?;
            }
            if next_location != location_id {
                self.ensure_owner(&self.locations, next_location)?;
            }

            user_refs.relocate(id, user_id, next_user);
            location_refs.relocate(id, location_id, next_location);
            visit.user_id = next_user;
            visit.location_id = next_location;
            patch.apply_fields(visit);

            if next_user != user_id || next_location != location_id {
                debug!(
                    visit = id,
                    from_user = user_id,
                    to_user = next_user,
                    from_location = location_id,
                    to_location = next_location,
                    "visit relocated"
                );
            }
            return Ok(());
        }
    }

    // ------------------------------------------------------------------
    // Scans
    // ------------------------------------------------------------------

    /// Calls `f` for every visit owned by the user, holding the user's
    /// collection for the whole scan. `f` may read location records.
    pub fn scan_user_visits<F>(&self, user_id: u32, f: F) -> Result<()>
    where
        F: FnMut(&Visit) -> Result<()>,
    {
        self.scan_owned(&self.users, user_id, f)
    }

    /// Calls `f` for every visit owned by the location. `f` may read user
    /// records.
    pub fn scan_location_visits<F>(&self, location_id: u32, f: F) -> Result<()>
    where
        F: FnMut(&Visit) -> Result<()>,
    {
        self.scan_owned(&self.locations, location_id, f)
    }

    fn scan_owned<T, F>(&self, owners: &OwnerTable<T>, owner_id: u32, mut f: F) -> Result<()>
    where
        F: FnMut(&Visit) -> Result<()>,
    {
        if !owners.records().contains(owner_id)? {
            return Err(StoreError::not_found(owners.kind(), owner_id));
        }
        let refs = owners.read_refs(owner_id)?;
        for visit_id in refs.iter() {
            let Some(slot) = self.visits.read_slot(visit_id)? else {
                continue;
            };
            if let Some(visit) = slot.as_ref() {
                f(visit)?;
            }
        }
        Ok(())
    }

    /// Snapshot of the visit ids owned by a user or location.
    pub fn owned_visit_ids(&self, kind: EntityKind, owner_id: u32) -> Result<Vec<u32>> {
        let refs = match kind {
            EntityKind::User => self.users.read_refs(owner_id),
            EntityKind::Location => self.locations.read_refs(owner_id),
            EntityKind::Visit => {
                return Err(StoreError::payload("visits do not own other visits"));
            }
        };
        let mut ids: Vec<u32> = match refs {
            Ok(refs) => refs.iter().collect(),
            Err(StoreError::MissingReference { .. }) => Vec::new(),
            Err(err) => return Err(err),
        };
        ids.sort_unstable();
        Ok(ids)
    }
}
