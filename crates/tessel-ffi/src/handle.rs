//! Generation-checked handle table for values held across the C ABI.
//!
//! A handle packs a slot index (high 32 bits) and the slot's generation
//! (low 32 bits). Removing a value bumps the generation, so a destroyed
//! handle resolves to nothing instead of to whatever reuses its slot.
//! Generations start at 1: the all-zero handle a C caller gets from a
//! zero-initialized variable is never issued.
//!
//! Vacant slots form an intrusive free list. There is no mutable
//! accessor: callers clone the value out.

const FIRST_GENERATION: u32 = 1;

fn pack(slot: u32, generation: u32) -> u64 {
    (u64::from(slot) << 32) | u64::from(generation)
}

fn unpack(handle: u64) -> (usize, u32) {
    ((handle >> 32) as usize, handle as u32)
}

enum Entry<T> {
    Occupied { generation: u32, value: T },
    /// `next` links to the next vacant slot.
    Vacant { generation: u32, next: Option<u32> },
    /// Generation space exhausted; never reused.
    Retired,
}

/// Maps `u64` handles to owned values.
pub(crate) struct HandleTable<T> {
    entries: Vec<Entry<T>>,
    free_head: Option<u32>,
    live: usize,
}

impl<T> HandleTable<T> {
    pub(crate) const fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_head: None,
            live: 0,
        }
    }

    pub(crate) fn insert(&mut self, value: T) -> u64 {
        self.live += 1;
        if let Some(slot) = self.free_head {
            if let Some(&Entry::Vacant { generation, next }) = self.entries.get(slot as usize) {
                self.free_head = next;
                self.entries[slot as usize] = Entry::Occupied { generation, value };
                return pack(slot, generation);
            }
        }
        let slot = self.entries.len() as u32;
        self.entries.push(Entry::Occupied {
            generation: FIRST_GENERATION,
            value,
        });
        pack(slot, FIRST_GENERATION)
    }

    /// `None` for handles that are stale, retired or never issued.
    pub(crate) fn get(&self, handle: u64) -> Option<&T> {
        let (slot, want) = unpack(handle);
        match self.entries.get(slot)? {
            Entry::Occupied { generation, value } if *generation == want => Some(value),
            _ => None,
        }
    }

    /// Take the value out and invalidate `handle`.
    pub(crate) fn remove(&mut self, handle: u64) -> Option<T> {
        let (slot, want) = unpack(handle);
        let entry = self.entries.get_mut(slot)?;
        match entry {
            Entry::Occupied { generation, .. } if *generation == want => {}
            _ => return None,
        }
        let next_generation = want.wrapping_add(1);
        let vacated = if next_generation == 0 {
            Entry::Retired
        } else {
            Entry::Vacant {
                generation: next_generation,
                next: self.free_head,
            }
        };
        let Entry::Occupied { value, .. } = std::mem::replace(entry, vacated) else {
            return None;
        };
        if next_generation != 0 {
            self.free_head = Some(slot as u32);
        }
        self.live -= 1;
        Some(value)
    }

    /// Number of live entries.
    pub(crate) fn len(&self) -> usize {
        self.live
    }
}
