use std::any::Any;

/// Object-safe view of a [`SparseSet`] so the scene can keep one per
/// component type in a single map.
pub(crate) trait ComponentStorage: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn remove(&mut self, index: u32) -> bool;
}

const EMPTY: u32 = u32::MAX;

/// Component values packed into `entries`, addressed through `lookup`
/// by entity index. Removal swaps the last entry into the hole.
pub(crate) struct SparseSet<T> {
    lookup: Vec<u32>,
    entries: Vec<T>,
    /// Entity index for each entry
    owners: Vec<u32>,
}

impl<T> SparseSet<T> {
    pub fn new() -> Self {
        Self {
            lookup: Vec::new(),
            entries: Vec::new(),
            owners: Vec::new(),
        }
    }

    fn position(&self, index: u32) -> Option<usize> {
        match self.lookup.get(index as usize) {
            Some(&at) if at != EMPTY => Some(at as usize),
            _ => None,
        }
    }

    /// Store `value` for `index`, replacing any previous value.
    pub fn insert(&mut self, index: u32, value: T) {
        if let Some(at) = self.position(index) {
            self.entries[at] = value;
            return;
        }
        let needed = index as usize + 1;
        if self.lookup.len() < needed {
            self.lookup.resize(needed, EMPTY);
        }
        self.lookup[index as usize] = self.entries.len() as u32;
        self.entries.push(value);
        self.owners.push(index);
    }

    pub fn get(&self, index: u32) -> Option<&T> {
        let at = self.position(index)?;
        Some(&self.entries[at])
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        let at = self.position(index)?;
        Some(&mut self.entries[at])
    }

    pub fn contains(&self, index: u32) -> bool {
        self.position(index).is_some()
    }

    pub fn take(&mut self, index: u32) -> Option<T> {
        let at = self.position(index)?;
        self.lookup[index as usize] = EMPTY;
        let value = self.entries.swap_remove(at);
        self.owners.swap_remove(at);
        if let Some(&moved) = self.owners.get(at) {
            self.lookup[moved as usize] = at as u32;
        }
        Some(value)
    }

    /// Entity indices that hold a value, in storage order.
    pub fn indices(&self) -> &[u32] {
        &self.owners
    }
}

impl<T: Send + Sync + 'static> ComponentStorage for SparseSet<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn remove(&mut self, index: u32) -> bool {
        self.take(index).is_some()
    }
}
