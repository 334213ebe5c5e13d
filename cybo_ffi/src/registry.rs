//! Process-wide table of live engines.
//!
//! Arena of slots with generation tags. Removing a value bumps the slot's
//! generation, so every outstanding copy of the old handle stops resolving.
//! Freed slots are reused; a slot whose generation would wrap is retired.
//!
//! Concurrency: one Mutex around the whole table. A poisoned lock is
//! recovered; the table itself is never left half-updated by a panic
//! because every mutation is a single assignment.

use std::sync::{Mutex, MutexGuard, PoisonError};

use cybo_engine::{Engine, EngineError, Result};

use crate::handle::EngineHandle;

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

pub struct HandleArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> HandleArena<T> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Store `value` and return a fresh handle for it.
    pub fn insert(&mut self, value: T) -> Result<EngineHandle> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            self.live += 1;
            return Ok(EngineHandle::pack(index, slot.generation));
        }

        let index = u32::try_from(self.slots.len())
            .map_err(|_| EngineError::AllocationFailure("handle table is full".to_string()))?;
        self.slots
            .try_reserve(1)
            .map_err(|e| EngineError::AllocationFailure(e.to_string()))?;
        self.slots.push(Slot {
            generation: 1,
            value: Some(value),
        });
        self.live += 1;
        Ok(EngineHandle::pack(index, 1))
    }

    pub fn get(&self, handle: EngineHandle) -> Result<&T> {
        let slot = self.slot(handle)?;
        slot.value.as_ref().ok_or(EngineError::InvalidHandle)
    }

    pub fn get_mut(&mut self, handle: EngineHandle) -> Result<&mut T> {
        if handle.is_null() {
            return Err(EngineError::InvalidHandle);
        }
        let (index, generation) = handle.unpack();
        self.slots
            .get_mut(index as usize)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.value.as_mut())
            .ok_or(EngineError::InvalidHandle)
    }

    /// Take the value out and invalidate every copy of `handle`.
    pub fn remove(&mut self, handle: EngineHandle) -> Result<T> {
        if handle.is_null() {
            return Err(EngineError::InvalidHandle);
        }
        let (index, generation) = handle.unpack();
        let slot = self
            .slots
            .get_mut(index as usize)
            .filter(|slot| slot.generation == generation)
            .ok_or(EngineError::InvalidHandle)?;
        let value = slot.value.take().ok_or(EngineError::InvalidHandle)?;
        self.live -= 1;

        // On wrap the slot is retired rather than reused.
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            self.free.push(index);
        }
        Ok(value)
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn slot(&self, handle: EngineHandle) -> Result<&Slot<T>> {
        if handle.is_null() {
            return Err(EngineError::InvalidHandle);
        }
        let (index, generation) = handle.unpack();
        self.slots
            .get(index as usize)
            .filter(|slot| slot.generation == generation)
            .ok_or(EngineError::InvalidHandle)
    }
}

impl<T> Default for HandleArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

static ENGINES: Mutex<HandleArena<Engine>> = Mutex::new(HandleArena::new());

fn lock() -> MutexGuard<'static, HandleArena<Engine>> {
    ENGINES.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run `f` with exclusive access to the engine table.
pub fn with_engines<R>(f: impl FnOnce(&mut HandleArena<Engine>) -> R) -> R {
    let mut engines = lock();
    f(&mut engines)
}
