use std::collections::HashSet;

/// Visit ids currently owned by one user or location.
///
/// Keyed by visit id: removal is O(1) and leaves nothing behind for readers
/// to skip. Order is irrelevant; list output is sorted separately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitRefs {
    ids: HashSet<u32>,
}

impl VisitRefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the visit was already linked.
    pub fn link(&mut self, visit_id: u32) -> bool {
        self.ids.insert(visit_id)
    }

    /// Returns false if the visit was not linked.
    pub fn unlink(&mut self, visit_id: u32) -> bool {
        self.ids.remove(&visit_id)
    }

    pub fn contains(&self, visit_id: u32) -> bool {
        self.ids.contains(&visit_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.ids.iter().copied()
    }
}
