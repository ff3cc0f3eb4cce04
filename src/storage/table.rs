use crate::core::{EntityKind, Result, StoreError};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Direct-indexed table: slot `id` holds the entity with that id.
///
/// The slot vector is allocated once for ids `0..=capacity`; every slot has
/// its own lock, so writers on different ids never contend.
pub struct Table<T> {
    kind: EntityKind,
    slots: Vec<RwLock<Option<T>>>,
}

impl<T> Table<T> {
    pub fn new(kind: EntityKind, capacity: u32) -> Self {
        let slots = (0..=capacity as usize).map(|_| RwLock::new(None)).collect();
        Self { kind, slots }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Highest id the table can hold.
    pub fn capacity(&self) -> u32 {
        (self.slots.len() - 1) as u32
    }

    fn slot(&self, id: u32) -> Option<&RwLock<Option<T>>> {
        if id == 0 {
            return None;
        }
        self.slots.get(id as usize)
    }

    /// Runs `f` against the entity under a read lock. Out-of-range ids and
    /// empty slots yield `None`.
    pub fn read<R>(&self, id: u32, f: impl FnOnce(&T) -> R) -> Result<Option<R>> {
        let Some(slot) = self.slot(id) else {
            return Ok(None);
        };
        let guard = slot.read()?;
        Ok(guard.as_ref().map(f))
    }

    pub fn contains(&self, id: u32) -> Result<bool> {
        Ok(self.read(id, |_| ())?.is_some())
    }

    /// Runs `f` against the entity under a write lock.
    pub fn write<R>(&self, id: u32, f: impl FnOnce(&mut T) -> R) -> Result<Option<R>> {
        let Some(slot) = self.slot(id) else {
            return Ok(None);
        };
        let mut guard = slot.write()?;
        Ok(guard.as_mut().map(f))
    }

    /// Write guard over the whole slot, for protocols that hold several locks.
    pub fn lock_slot(&self, id: u32) -> Result<RwLockWriteGuard<'_, Option<T>>> {
        let slot = self.slot(id).ok_or(StoreError::CapacityExceeded {
            kind: self.kind,
            id,
            capacity: self.capacity(),
        })?;
        Ok(slot.write()?)
    }

    pub fn read_slot(&self, id: u32) -> Result<Option<RwLockReadGuard<'_, Option<T>>>> {
        match self.slot(id) {
            Some(slot) => Ok(Some(slot.read()?)),
            None => Ok(None),
        }
    }

    /// Inserts or overwrites the slot, returning the previous occupant.
    pub fn put(&self, id: u32, value: T) -> Result<Option<T>> {
        let mut guard = self.lock_slot(id)?;
        Ok(guard.replace(value))
    }

    /// Number of occupied slots. Walks the whole table.
    pub fn len(&self) -> Result<usize> {
        let mut count = 0;
        for slot in &self.slots {
            if slot.read()?.is_some() {
                count += 1;
            }
        }
        Ok(count)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl<T: Clone> Table<T> {
    pub fn get(&self, id: u32) -> Result<Option<T>> {
        self.read(id, T::clone)
    }
}
