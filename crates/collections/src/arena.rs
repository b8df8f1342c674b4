//! Generational arena.
//!
//! Slots are reused after removal, but every reuse bumps the slot's
//! generation, so an [`Index`] taken before the removal never resolves to the
//! new occupant.

use std::fmt;

/// Generation-checked handle into an [`Arena`].
///
/// Generations start at 1, so the packed form returned by [`Index::to_bits`]
/// is never zero and can travel through pointer-sized opaque slots.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Index {
    slot: u32,
    generation: u32,
}

impl Index {
    pub fn slot(self) -> u32 {
        self.slot
    }

    pub fn generation(self) -> u32 {
        self.generation
    }

    /// Pack into a single non-zero integer.
    pub fn to_bits(self) -> u64 {
        (u64::from(self.generation) << 32) | u64::from(self.slot)
    }

    /// Inverse of [`Index::to_bits`]. Returns `None` for zero generation,
    /// which no live index ever carries.
    pub fn from_bits(bits: u64) -> Option<Self> {
        let generation = (bits >> 32) as u32;
        if generation == 0 {
            return None;
        }
        Some(Self {
            slot: bits as u32,
            generation,
        })
    }
}

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.slot, self.generation)
    }
}

#[derive(Debug, Clone)]
enum Entry<T> {
    Occupied { generation: u32, value: T },
    Free { generation: u32, next_free: Option<u32> },
}

#[derive(Debug, Clone)]
pub struct Arena<T> {
    entries: Vec<Entry<T>>,
    free_head: Option<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, value: T) -> Index {
        self.len += 1;

        if let Some(slot) = self.free_head {
            let entry = &mut self.entries[slot as usize];
            let (generation, next_free) = match *entry {
                Entry::Free {
                    generation,
                    next_free,
                } => (generation, next_free),
                Entry::Occupied { .. } => unreachable!("free list points at an occupied slot"),
            };
            self.free_head = next_free;
            *entry = Entry::Occupied { generation, value };
            return Index { slot, generation };
        }

        let slot = self.entries.len() as u32;
        self.entries.push(Entry::Occupied {
            generation: 1,
            value,
        });
        Index {
            slot,
            generation: 1,
        }
    }

    pub fn remove(&mut self, index: Index) -> Option<T> {
        let entry = self.entries.get_mut(index.slot as usize)?;
        match entry {
            Entry::Occupied { generation, .. } if *generation == index.generation => {}
            _ => return None,
        }

        // Generation wraps back to 1, never 0.
        let next_generation = index.generation.checked_add(1).unwrap_or(1);
        let old = std::mem::replace(
            entry,
            Entry::Free {
                generation: next_generation,
                next_free: self.free_head,
            },
        );
        self.free_head = Some(index.slot);
        self.len -= 1;

        match old {
            Entry::Occupied { value, .. } => Some(value),
            Entry::Free { .. } => None,
        }
    }

    pub fn contains(&self, index: Index) -> bool {
        self.get(index).is_some()
    }

    pub fn get(&self, index: Index) -> Option<&T> {
        match self.entries.get(index.slot as usize)? {
            Entry::Occupied { generation, value } if *generation == index.generation => {
                Some(value)
            }
            _ => None,
        }
    }

    pub fn get_mut(&mut self, index: Index) -> Option<&mut T> {
        match self.entries.get_mut(index.slot as usize)? {
            Entry::Occupied { generation, value } if *generation == index.generation => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Iterate live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Index, &T)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| match entry {
                Entry::Occupied { generation, value } => Some((
                    Index {
                        slot: slot as u32,
                        generation: *generation,
                    },
                    value,
                )),
                Entry::Free { .. } => None,
            })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Index, &mut T)> {
        self.entries
            .iter_mut()
            .enumerate()
            .filter_map(|(slot, entry)| match entry {
                Entry::Occupied { generation, value } => Some((
                    Index {
                        slot: slot as u32,
                        generation: *generation,
                    },
                    value,
                )),
                Entry::Free { .. } => None,
            })
    }

    pub fn indices(&self) -> Vec<Index> {
        self.iter().map(|(index, _)| index).collect()
    }
}
