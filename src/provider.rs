use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Changes reported by a [`DataProvider`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent<T> {
    Added(T),
    Removed(T),
    Changed { old: T, new: T },
}

/// Optional source of the items a wheel could hold. The wheel drains its
/// changes on `update()` and logs them; it does not auto-populate slots.
pub trait DataProvider<T> {
    fn available_items(&self) -> Vec<T>;
    fn is_valid(&self, item: &T) -> bool;
    fn poll_change(&mut self) -> Option<ProviderEvent<T>>;
}

/// In-memory provider backed by a `Vec`, recording every mutation.
#[derive(Debug, Clone, Default)]
pub struct VecProvider<T> {
    items: Vec<T>,
    changes: VecDeque<ProviderEvent<T>>,
}

impl<T: Clone + PartialEq> VecProvider<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            changes: VecDeque::new(),
        }
    }

    pub fn add(&mut self, item: T) {
        self.items.push(item.clone());
        self.changes.push_back(ProviderEvent::Added(item));
    }

    pub fn remove(&mut self, item: &T) -> bool {
        match self.items.iter().position(|i| i == item) {
            Some(pos) => {
                let removed = self.items.remove(pos);
                self.changes.push_back(ProviderEvent::Removed(removed));
                true
            }
            None => false,
        }
    }

    pub fn replace(&mut self, old: &T, new: T) -> bool {
        match self.items.iter_mut().find(|i| *i == old) {
            Some(slot) => {
                let old = std::mem::replace(slot, new.clone());
                self.changes.push_back(ProviderEvent::Changed { old, new });
                true
            }
            None => false,
        }
    }
}

impl<T: Clone + PartialEq> DataProvider<T> for VecProvider<T> {
    fn available_items(&self) -> Vec<T> {
        self.items.clone()
    }

    fn is_valid(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    fn poll_change(&mut self) -> Option<ProviderEvent<T>> {
        self.changes.pop_front()
    }
}

impl<T, P: DataProvider<T>> DataProvider<T> for Rc<RefCell<P>> {
    fn available_items(&self) -> Vec<T> {
        self.borrow().available_items()
    }

    fn is_valid(&self, item: &T) -> bool {
        self.borrow().is_valid(item)
    }

    fn poll_change(&mut self) -> Option<ProviderEvent<T>> {
        self.try_borrow_mut().ok()?.poll_change()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_provider_reports_changes() {
        let mut provider = VecProvider::new(vec!["rope", "torch"]);
        provider.add("flare");
        assert!(provider.remove(&"rope"));
        assert!(!provider.remove(&"rope"));
        assert!(provider.replace(&"torch", "lantern"));

        assert_eq!(provider.available_items(), ["flare", "lantern"]);
        assert!(provider.is_valid(&"flare"));
        assert!(!provider.is_valid(&"torch"));

        let changes: Vec<_> = std::iter::from_fn(|| provider.poll_change()).collect();
        assert_eq!(
            changes,
            [
                ProviderEvent::Added("flare"),
                ProviderEvent::Removed("rope"),
                ProviderEvent::Changed {
                    old: "torch",
                    new: "lantern"
                },
            ]
        );
    }
}
