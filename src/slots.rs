use crate::error::UsageError;

/// Fixed-size slot array plus the permutation produced by swaps.
///
/// `order[i]` is the original position of whatever now sits at `i`, so the
/// layout can be persisted without the contents.
#[derive(Debug, Clone)]
pub struct SlotStore<T> {
    slots: Vec<Option<T>>,
    order: Vec<usize>,
}

impl<T: Clone> SlotStore<T> {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
            order: (0..slot_count).collect(),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn all_vacant(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    fn check(&self, index: usize) -> Result<(), UsageError> {
        if index < self.slots.len() {
            Ok(())
        } else {
            Err(UsageError::IndexOutOfRange {
                index,
                slot_count: self.slots.len(),
            })
        }
    }

    pub fn get(&self, index: usize) -> Option<T> {
        match self.slots.get(index) {
            Some(slot) => slot.clone(),
            None => {
                log::warn!("Invalid slot index: {}", index);
                None
            }
        }
    }

    pub fn is_filled(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(Option::is_some)
    }

    pub fn set(&mut self, index: usize, item: Option<T>) -> Result<(), UsageError> {
        self.check(index)?;
        self.slots[index] = item;
        Ok(())
    }

    /// Swapping a slot with itself is accepted and changes nothing; the
    /// return value says whether anything moved.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<bool, UsageError> {
        self.check(a)?;
        self.check(b)?;
        if a == b {
            return Ok(false);
        }
        self.slots.swap(a, b);
        self.order.swap(a, b);
        Ok(true)
    }

    /// All-or-nothing replacement of every slot.
    pub fn set_all(&mut self, items: Vec<Option<T>>) -> Result<(), UsageError> {
        if items.len() != self.slots.len() {
            return Err(UsageError::LengthMismatch {
                expected: self.slots.len(),
                actual: items.len(),
            });
        }
        self.slots = items;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    pub fn snapshot(&self) -> Vec<Option<T>> {
        self.slots.clone()
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Moves the current contents into the arrangement described by
    /// `order`. Accepts only a permutation of `0..len`.
    pub fn restore_order(&mut self, order: &[usize]) -> bool {
        if !is_permutation(order, self.slots.len()) {
            return false;
        }
        let mut original = vec![None; self.slots.len()];
        for (slot, &src) in self.slots.iter_mut().zip(&self.order) {
            original[src] = slot.take();
        }
        self.slots = order.iter().map(|&src| original[src].take()).collect();
        self.order = order.to_vec();
        true
    }
}

pub(crate) fn is_permutation(order: &[usize], len: usize) -> bool {
    let mut seen = vec![false; len];
    order.len() == len
        && order
            .iter()
            .all(|&i| i < len && !std::mem::replace(&mut seen[i], true))
}
