//! StackCache implementation
//!
//! HashMap of per-type stacks behind a RwLock for concurrency.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::record::Record;

use super::Stack;

/// In-memory cache of decoded type partitions
pub struct StackCache {
    stacks: RwLock<HashMap<String, Stack>>,
}

impl StackCache {
    pub fn new() -> Self {
        Self {
            stacks: RwLock::new(HashMap::new()),
        }
    }

    /// Whether a stack has been built for this type
    pub fn is_loaded(&self, type_tag: &str) -> bool {
        self.stacks.read().contains_key(type_tag)
    }

    /// Install a freshly built stack for a type
    pub fn store(&self, type_tag: &str, stack: Stack) {
        self.stacks.write().insert(type_tag.to_string(), stack);
    }

    /// Clone out the stack for a type, if built
    pub fn snapshot(&self, type_tag: &str) -> Option<Stack> {
        self.stacks.read().get(type_tag).cloned()
    }

    /// Membership test; `None` means the stack is not built yet
    pub fn contains(&self, type_tag: &str, id: &str) -> Option<bool> {
        self.stacks
            .read()
            .get(type_tag)
            .map(|stack| stack.contains_key(id))
    }

    /// Fetch one record by id from a built stack
    pub fn get(&self, type_tag: &str, id: &str) -> Option<Record> {
        self.stacks.read().get(type_tag)?.get(id).cloned()
    }

    /// Upsert one entry in a built stack; no-op when the stack is absent
    /// (the next full scan will pick the record up from disk anyway)
    pub fn update(&self, type_tag: &str, id: &str, record: Record) {
        if let Some(stack) = self.stacks.write().get_mut(type_tag) {
            stack.insert(id.to_string(), record);
        }
    }

    /// Remove one entry from a built stack
    pub fn remove(&self, type_tag: &str, id: &str) {
        if let Some(stack) = self.stacks.write().get_mut(type_tag) {
            stack.remove(id);
        }
    }

    /// Drop the stack for a type so the next access rebuilds it
    pub fn invalidate(&self, type_tag: &str) {
        self.stacks.write().remove(type_tag);
    }

    /// Number of records in a built stack
    pub fn stack_len(&self, type_tag: &str) -> Option<usize> {
        self.stacks.read().get(type_tag).map(Stack::len)
    }
}

impl Default for StackCache {
    fn default() -> Self {
        Self::new()
    }
}
