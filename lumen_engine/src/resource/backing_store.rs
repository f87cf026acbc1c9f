/// Slot-partitioned GPU memory with per-slot fences.
///
/// One backend allocation of `slot_count * slot_size` bytes is split into
/// contiguous slots; slot `i` covers `[i * slot_size, (i + 1) * slot_size)`.
/// Each slot carries at most one fence. A fence is present exactly while a
/// GPU command reading the slot has been submitted and not yet confirmed
/// complete:
///
/// ```text
///            lock_slot                 wait_slot (signaled)
///   Idle ─────────────────► InFlight ─────────────────────► Idle
///                             │  ▲
///                             └──┘ lock_slot (old fence dropped)
/// ```
///
/// Every CPU write waits for the target slot first, so a write can never
/// race a GPU read of the same slot.

use std::rc::Rc;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::renderer::{BufferMemory, FenceHandle, FenceProvider, FenceStatus, SyncConfig};
use crate::{engine_debug, engine_error, engine_warn};

/// GPU usage state of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// No pending GPU command reads the slot
    Idle,
    /// A fence guards the slot
    InFlight,
}

pub struct BackingStore {
    memory: Box<dyn BufferMemory>,
    fences: Vec<Option<FenceHandle>>,
    provider: Rc<dyn FenceProvider>,
    sync: SyncConfig,
    slot_size: u64,
}

impl BackingStore {
    /// Wrap backend memory covering `slot_count` slots of `slot_size` bytes
    pub fn new(
        memory: Box<dyn BufferMemory>,
        slot_count: usize,
        slot_size: u64,
        provider: Rc<dyn FenceProvider>,
        sync: SyncConfig,
    ) -> Result<Self> {
        if slot_count == 0 {
            return Err(Error::InvalidResource("backing store needs at least one slot".to_string()));
        }
        let required = slot_size * slot_count as u64;
        if memory.size() < required {
            return Err(Error::InvalidResource(format!(
                "buffer memory {} holds {} bytes, {} slots of {} bytes need {}",
                memory.id(), memory.size(), slot_count, slot_size, required
            )));
        }

        Ok(Self {
            memory,
            fences: vec![None; slot_count],
            provider,
            sync,
            slot_size,
        })
    }

    // ===== ACCESSORS =====

    /// Native identity of the backend memory
    pub fn id(&self) -> u64 { self.memory.id() }

    pub fn slot_count(&self) -> usize { self.fences.len() }

    /// Size of one slot in bytes
    pub fn slot_size(&self) -> u64 { self.slot_size }

    /// Absolute byte offset of a slot inside the allocation
    pub fn slot_offset(&self, slot: usize) -> u64 {
        slot as u64 * self.slot_size
    }

    pub fn sync_config(&self) -> SyncConfig { self.sync }

    pub fn memory(&self) -> &dyn BufferMemory { self.memory.as_ref() }

    /// Fence currently guarding a slot
    pub fn fence(&self, slot: usize) -> Option<FenceHandle> {
        self.fences.get(slot).copied().flatten()
    }

    pub fn slot_state(&self, slot: usize) -> SlotState {
        match self.fence(slot) {
            Some(_) => SlotState::InFlight,
            None => SlotState::Idle,
        }
    }

    // ===== SYNCHRONIZATION =====

    /// Block until the GPU no longer reads `slot`
    ///
    /// Returns immediately when the slot has no fence. Otherwise polls the
    /// fence with `SyncConfig::poll_timeout` until it signals, then releases
    /// it. A failed wait releases the fence and reports `SyncFailed`; an
    /// expired deadline reports `SyncTimeout` and leaves the slot in flight.
    pub fn wait_slot(&mut self, slot: usize) -> Result<()> {
        self.check_slot(slot)?;
        let Some(fence) = self.fences[slot] else {
            return Ok(());
        };

        let start = Instant::now();
        let mut timeouts: u32 = 0;
        loop {
            match self.provider.poll(fence, self.sync.poll_timeout) {
                FenceStatus::AlreadySignaled | FenceStatus::Signaled => break,
                FenceStatus::TimeoutExpired => {
                    timeouts += 1;
                    if timeouts == 1 {
                        engine_warn!("lumen::BackingStore",
                            "Slot {} of buffer {} still in use by the GPU, waiting",
                            slot, self.memory.id());
                    }
                    if let Some(deadline) = self.sync.deadline {
                        let waited = start.elapsed();
                        if waited >= deadline {
                            engine_error!("lumen::BackingStore",
                                "Slot {} of buffer {} not released after {:?}",
                                slot, self.memory.id(), waited);
                            return Err(Error::SyncTimeout { slot, waited });
                        }
                    }
                }
                FenceStatus::WaitFailed => {
                    self.release_fence(slot);
                    engine_error!("lumen::BackingStore",
                        "Fence wait failed on slot {} of buffer {}", slot, self.memory.id());
                    return Err(Error::SyncFailed {
                        slot,
                        reason: "fence wait failed".to_string(),
                    });
                }
            }
        }

        if timeouts > 0 {
            engine_debug!("lumen::BackingStore",
                "Slot {} released after {} timed out polls ({:?})",
                slot, timeouts, start.elapsed());
        }
        self.release_fence(slot);
        Ok(())
    }

    /// Guard `slot` with a fence covering every GPU command submitted so far
    ///
    /// Any fence already on the slot is discarded first.
    pub fn lock_slot(&mut self, slot: usize) -> Result<()> {
        self.check_slot(slot)?;
        self.release_fence(slot);
        let fence = self.provider.submit()?;
        self.fences[slot] = Some(fence);
        Ok(())
    }

    /// Wait on every slot in order
    pub fn wait_all(&mut self) -> Result<()> {
        for slot in 0..self.fences.len() {
            self.wait_slot(slot)?;
        }
        Ok(())
    }

    // ===== MEMORY ACCESS =====

    /// Copy `data` into `slot` at byte `offset` (relative to the slot)
    pub fn write(&mut self, slot: usize, offset: u64, data: &[u8]) -> Result<()> {
        self.check_range(slot, offset, data.len() as u64)?;
        self.wait_slot(slot)?;
        let base = self.slot_offset(slot);
        self.memory.write(base + offset, data)
    }

    /// Copy `slot` bytes at `offset` (relative to the slot) into `out`
    ///
    /// Does not wait; call `wait_slot` first when the GPU may still write.
    pub fn read(&self, slot: usize, offset: u64, out: &mut [u8]) -> Result<()> {
        self.check_range(slot, offset, out.len() as u64)?;
        self.memory.read(self.slot_offset(slot) + offset, out)
    }

    /// Repeat `pattern` `count` times into `slot` starting at `offset`
    pub fn fill(&mut self, slot: usize, offset: u64, pattern: &[u8], count: usize) -> Result<()> {
        if pattern.is_empty() || count == 0 {
            return Ok(());
        }
        let len = (pattern.len() as u64).checked_mul(count as u64).unwrap_or(u64::MAX);
        self.check_range(slot, offset, len)?;
        let data = pattern.repeat(count);
        self.write(slot, offset, &data)
    }

    // ===== INTERNALS =====

    fn release_fence(&mut self, slot: usize) {
        if let Some(fence) = self.fences[slot].take() {
            self.provider.release(fence);
        }
    }

    fn check_slot(&self, slot: usize) -> Result<()> {
        if slot >= self.fences.len() {
            return Err(Error::InvalidResource(format!(
                "slot {} out of range (buffer {} has {} slots)",
                slot, self.memory.id(), self.fences.len()
            )));
        }
        Ok(())
    }

    fn check_range(&self, slot: usize, offset: u64, len: u64) -> Result<()> {
        self.check_slot(slot)?;
        match offset.checked_add(len) {
            Some(end) if end <= self.slot_size => Ok(()),
            _ => Err(Error::InvalidResource(format!(
                "range of {} bytes at offset {} outside slot of {} bytes", len, offset, self.slot_size
            ))),
        }
    }
}

impl Drop for BackingStore {
    fn drop(&mut self) {
        for slot in 0..self.fences.len() {
            self.release_fence(slot);
        }
    }
}

#[cfg(test)]
#[path = "backing_store_tests.rs"]
mod tests;
