use super::refs::VisitRefs;
use super::table::Table;
use crate::core::{EntityKind, Result, StoreError};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Table of visit owners (users or locations).
///
/// Each id has two independent locks: one for the record itself and one for
/// its back-reference collection, so field updates and relocations on the
/// same owner do not contend.
pub struct OwnerTable<T> {
    records: Table<T>,
    refs: Vec<RwLock<VisitRefs>>,
}

impl<T> OwnerTable<T> {
    pub fn new(kind: EntityKind, capacity: u32) -> Self {
        let refs = (0..=capacity as usize)
            .map(|_| RwLock::new(VisitRefs::new()))
            .collect();
        Self {
            records: Table::new(kind, capacity),
            refs,
        }
    }

    pub fn records(&self) -> &Table<T> {
        &self.records
    }

    pub fn kind(&self) -> EntityKind {
        self.records.kind()
    }

    fn refs_slot(&self, id: u32) -> Result<&RwLock<VisitRefs>> {
        if id == 0 {
            return Err(self.missing(id));
        }
        self.refs.get(id as usize).ok_or_else(|| self.missing(id))
    }

    fn missing(&self, id: u32) -> StoreError {
        StoreError::MissingReference {
            kind: self.kind(),
            id,
        }
    }

    pub fn read_refs(&self, id: u32) -> Result<RwLockReadGuard<'_, VisitRefs>> {
        Ok(self.refs_slot(id)?.read()?)
    }

    pub fn lock_refs(&self, id: u32) -> Result<RwLockWriteGuard<'_, VisitRefs>> {
        Ok(self.refs_slot(id)?.write()?)
    }

    /// Write-locks the collections of `from` and `to` in ascending id order.
    /// When both ids are equal only one lock is taken.
    pub fn lock_refs_pair(&self, from: u32, to: u32) -> Result<RefsPair<'_>> {
        if from == to {
            return Ok(RefsPair {
                low: (from, self.lock_refs(from)?),
                high: None,
            });
        }
        let (low, high) = if from < to { (from, to) } else { (to, from) };
        let low_guard = self.lock_refs(low)?;
        let high_guard = self.lock_refs(high)?;
        Ok(RefsPair {
            low: (low, low_guard),
            high: Some((high, high_guard)),
        })
    }
}

/// Two back-reference collections held for writing at once.
pub struct RefsPair<'a> {
    low: (u32, RwLockWriteGuard<'a, VisitRefs>),
    high: Option<(u32, RwLockWriteGuard<'a, VisitRefs>)>,
}

impl RefsPair<'_> {
    fn get_mut(&mut self, owner_id: u32) -> Option<&mut VisitRefs> {
        if self.low.0 == owner_id {
            return Some(&mut *self.low.1);
        }
        match &mut self.high {
            Some((id, guard)) if *id == owner_id => Some(&mut **guard),
            _ => None,
        }
    }

    /// Moves `visit_id` from the `from` collection to the `to` collection.
    pub fn relocate(&mut self, visit_id: u32, from: u32, to: u32) {
        if from == to {
            return;
        }
        if let Some(refs) = self.get_mut(from) {
            refs.unlink(visit_id);
        }
        if let Some(refs) = self.get_mut(to) {
            refs.link(visit_id);
        }
    }
}
