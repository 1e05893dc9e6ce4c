use std::fmt;

/// Handle to a scene object. The generation changes every time a slot is
/// recycled, so a handle kept past `despawn` never aliases a newer object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Entity {
    /// Build a handle without allocating it. Handy in tests and for
    /// decoding ids that came off the event bus.
    pub fn from_raw(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({self})")
    }
}

/// Vacant slots form an intrusive stack through `next_vacant`.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Occupied { generation: u32 },
    Vacant { generation: u32, next_vacant: Option<u32> },
}

#[derive(Debug, Default)]
pub(crate) struct EntityAllocator {
    slots: Vec<Slot>,
    first_vacant: Option<u32>,
    live: usize,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> Entity {
        self.live += 1;
        let reusable = self.first_vacant.and_then(|index| {
            match self.slots.get(index as usize) {
                Some(&Slot::Vacant {
                    generation,
                    next_vacant,
                }) => Some((index, generation, next_vacant)),
                _ => None,
            }
        });

        match reusable {
            Some((index, generation, next_vacant)) => {
                self.slots[index as usize] = Slot::Occupied { generation };
                self.first_vacant = next_vacant;
                Entity::from_raw(index, generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot::Occupied { generation: 0 });
                Entity::from_raw(index, 0)
            }
        }
    }

    /// Release `entity`'s slot; stale or already released handles return `false`.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.slots[entity.index as usize] = Slot::Vacant {
            generation: entity.generation.wrapping_add(1),
            next_vacant: self.first_vacant,
        };
        self.first_vacant = Some(entity.index);
        self.live -= 1;
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entity_at(entity.index) == Some(entity)
    }

    /// The handle that currently owns slot `index`, if it is occupied.
    pub fn entity_at(&self, index: u32) -> Option<Entity> {
        match self.slots.get(index as usize)? {
            Slot::Occupied { generation } => Some(Entity::from_raw(index, *generation)),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn len(&self) -> usize {
        self.live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_slots_start_at_generation_zero() {
        let mut entities = EntityAllocator::new();
        let first = entities.allocate();
        let second = entities.allocate();
        assert_eq!((first.index(), first.generation()), (0, 0));
        assert_eq!((second.index(), second.generation()), (1, 0));
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn recycled_slot_gets_new_generation() {
        let mut entities = EntityAllocator::new();
        let old = entities.allocate();
        assert!(entities.deallocate(old));
        assert!(!entities.deallocate(old));

        let new = entities.allocate();
        assert_eq!(new.index(), old.index());
        assert_eq!(new.generation(), 1);
        assert!(!entities.is_alive(old));
        assert!(entities.is_alive(new));
    }

    #[test]
    fn vacant_slots_reused_most_recent_first() {
        let mut entities = EntityAllocator::new();
        let a = entities.allocate();
        let b = entities.allocate();
        let _c = entities.allocate();
        entities.deallocate(a);
        entities.deallocate(b);
        assert_eq!(entities.allocate().index(), b.index());
        assert_eq!(entities.allocate().index(), a.index());
        assert_eq!(entities.allocate().index(), 3);
        assert_eq!(entities.len(), 4);
    }

    #[test]
    fn entity_at_reports_only_occupied_slots() {
        let mut entities = EntityAllocator::new();
        let e = entities.allocate();
        assert_eq!(entities.entity_at(0), Some(e));
        entities.deallocate(e);
        assert_eq!(entities.entity_at(0), None);
        assert_eq!(entities.entity_at(7), None);
    }

    #[test]
    fn display_shows_index_and_generation() {
        assert_eq!(Entity::from_raw(3, 1).to_string(), "3v1");
        assert_eq!(format!("{:?}", Entity::from_raw(3, 1)), "Entity(3v1)");
    }
}
