// Top-N slot sequence: the first N rows of an already-sorted result, zero-padded to N.

use serde::{Serialize, Serializer};

/// Slot count for every Top-N dimension.
pub const TOP_N: usize = 5;

/// An entry with a count; count 0 marks an unoccupied slot.
pub trait Ranked {
    fn count(&self) -> u64;
}

/// Exactly [`TOP_N`] slots in query order. Selection never re-sorts: the query layer
/// orders by count descending, and ties keep whatever order the store returned.
#[derive(Debug, Clone, PartialEq)]
pub struct TopN<T> {
    slots: Vec<T>,
}

impl<T: Ranked + Default> TopN<T> {
    /// Copies up to [`TOP_N`] rows into slots; remaining slots get `T::default()`.
    pub fn select<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut top = Self {
            slots: Vec::with_capacity(TOP_N),
        };
        for row in rows {
            if !top.push(row) {
                break;
            }
        }
        while top.slots.len() < TOP_N {
            top.slots.push(T::default());
        }
        top
    }

    fn push(&mut self, row: T) -> bool {
        if self.slots.len() >= TOP_N {
            return false;
        }
        self.slots.push(row);
        true
    }
}

impl<T: Ranked> TopN<T> {
    pub fn slots(&self) -> &[T] {
        &self.slots
    }

    /// Occupied slots (count > 0) with their 1-based rank.
    pub fn occupied(&self) -> impl Iterator<Item = (u8, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.count() > 0)
            .map(|(i, slot)| ((i + 1) as u8, slot))
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied().count()
    }
}

impl<T: Ranked + Default> Default for TopN<T> {
    fn default() -> Self {
        Self::select(std::iter::empty())
    }
}

/// Serializes only occupied slots (used by the verbose snapshot dump).
impl<T: Ranked + Serialize> Serialize for TopN<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.slots.iter().filter(|slot| slot.count() > 0))
    }
}
