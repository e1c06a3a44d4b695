//! Item store: unbounded FIFO shared by producers and the worker
//!
//! Producers append from any thread; exactly one worker removes items. Items
//! stay owned by the store until the worker dequeues them, so a drain pass
//! that stops early leaves the rest queued in order.

use crate::core::sync::handle_mutex_poison;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// An item the store could not accept, handed back to the producer
#[derive(Debug)]
pub struct Rejected<T> {
    pub item: T,
    pub message: String,
}

#[derive(Debug)]
pub struct ItemStore<T> {
    items: Mutex<VecDeque<T>>,
}

impl<T> Default for ItemStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ItemStore<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, VecDeque<T>>, String> {
        handle_mutex_poison(self.items.lock(), |message| message)
    }

    /// Append one item to the tail
    pub fn push(&self, item: T) -> Result<(), Rejected<T>> {
        match self.lock() {
            Ok(mut items) => {
                items.push_back(item);
                Ok(())
            }
            Err(message) => Err(Rejected { item, message }),
        }
    }

    /// Append a batch contiguously, in iteration order
    ///
    /// Items appended before a failure stay queued. The store takes its lock
    /// once per batch, so a failure always names the first item.
    pub fn push_many<I>(&self, items: I) -> Result<usize, Rejected<T>>
    where
        I: IntoIterator<Item = T>,
    {
        let mut iter = items.into_iter();
        let mut queue = match self.lock() {
            Ok(queue) => queue,
            Err(message) => {
                return match iter.next() {
                    Some(item) => Err(Rejected { item, message }),
                    None => Ok(0),
                }
            }
        };

        let before = queue.len();
        queue.extend(iter);
        Ok(queue.len() - before)
    }

    /// Snapshot of the number of queued items
    pub fn len(&self) -> Result<usize, String> {
        Ok(self.lock()?.len())
    }

    /// True when empty; a faulted store reports as empty
    pub fn is_empty(&self) -> bool {
        self.len().map(|len| len == 0).unwrap_or(true)
    }

    /// Remove the head item
    pub fn pop(&self) -> Result<Option<T>, String> {
        Ok(self.lock()?.pop_front())
    }

    /// Start a pass over the items visible right now
    ///
    /// Items pushed after this call are left for the next pass.
    pub fn drain_all(&self) -> DrainPass<'_, T> {
        let visible = self.len().unwrap_or(0);
        DrainPass {
            store: self,
            remaining: visible,
        }
    }

    /// Drop every queued item without processing it
    pub fn discard_all(&self) -> Result<usize, String> {
        let mut items = self.lock()?;
        let discarded = items.len();
        items.clear();
        Ok(discarded)
    }
}

/// One drain pass: yields at most the items visible when the pass began
///
/// Yields `Err` for a slot that was counted but could not be dequeued.
/// Dropping the pass early leaves the undrained items in the store.
pub struct DrainPass<'a, T> {
    store: &'a ItemStore<T>,
    remaining: usize,
}

impl<T> Iterator for DrainPass<'_, T> {
    type Item = Result<T, String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        match self.store.pop() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                let slots = self.remaining + 1;
                self.remaining = 0;
                Some(Err(format!(
                    "{} counted item(s) were no longer in the store",
                    slots
                )))
            }
            Err(message) => {
                self.remaining = 0;
                Some(Err(message))
            }
        }
    }
}
