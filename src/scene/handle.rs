//! Actor handles with generational indices
//!
//! Handles are lightweight identifiers for live actors. The generational
//! index pattern prevents dangling references:
//! - Each actor slot has a generation counter
//! - When an actor is destroyed, its slot can be reused
//! - The generation increments on reuse, invalidating old handles
//!
//! A selection or teleport link pointing at a deleted door won't
//! accidentally match the next actor that reused the slot.

use std::fmt;

/// A unique identifier for a live actor.
///
/// Consists of an index (which slot) and a generation (which version of that
/// slot). Two handles with the same index but different generations refer to
/// different actors.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorHandle {
    index: u32,
    generation: u32,
}

impl ActorHandle {
    /// Should only be called by `HandleAllocator` and tests.
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// A handle that never refers to a live actor
    pub const NULL: ActorHandle = ActorHandle { index: u32::MAX, generation: 0 };

    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for ActorHandle {
    fn default() -> Self {
        ActorHandle::NULL
    }
}

impl fmt::Debug for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "#null")
        } else {
            write!(f, "#{}v{}", self.index, self.generation)
        }
    }
}

impl fmt::Display for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Allocates and tracks actor lifetimes.
///
/// Freed slots are reused (LIFO) with an incremented generation.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    /// Generation counter for each slot
    generations: Vec<u32>,
    /// Free slots available for reuse
    free_indices: Vec<u32>,
    /// Number of currently alive actors
    alive_count: u32,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new handle.
    pub fn allocate(&mut self) -> ActorHandle {
        self.alive_count += 1;

        if let Some(index) = self.free_indices.pop() {
            // Generation was already incremented on free
            ActorHandle::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            ActorHandle::new(index, 0)
        }
    }

    /// Free a handle, making its slot available for reuse.
    /// Returns true if the handle was alive and is now freed.
    pub fn free(&mut self, handle: ActorHandle) -> bool {
        if !self.is_alive(handle) {
            return false;
        }

        self.generations[handle.index as usize] += 1;
        self.free_indices.push(handle.index);
        self.alive_count -= 1;
        true
    }

    pub fn is_alive(&self, handle: ActorHandle) -> bool {
        if handle.is_null() {
            return false;
        }
        let idx = handle.index as usize;
        idx < self.generations.len()
            && self.generations[idx] == handle.generation
            && !self.free_indices.contains(&handle.index)
    }

    pub fn alive_count(&self) -> u32 {
        self.alive_count
    }
}
