/// Mock Renderer for unit tests (no GPU required)
///
/// Buffers are plain byte vectors and fences are scripted: each fence stays
/// pending for a configurable number of polls. Every fence and memory
/// operation is appended to a shared event log so tests can assert on
/// ordering (e.g., "the slot was waited on before the copy").

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use glam::Vec4;
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::renderer::{
    Api, BufferDesc, BufferMemory, FenceHandle, FenceProvider, FenceStatus, Framebuffer,
    FramebufferDesc, Renderer, RendererStats, Texture, TextureDesc, TextureInfo,
};

// ============================================================================
// Event log
// ============================================================================

/// One recorded mock operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockEvent {
    Submit(FenceHandle),
    Poll(FenceHandle, FenceStatus),
    Release(FenceHandle),
    Write { buffer: u64, offset: u64, len: usize },
    Upload { texture: u64, source: u64, offset: u64 },
}

/// Shared, ordered log of mock operations
pub type EventLog = Rc<RefCell<Vec<MockEvent>>>;

/// Fence polls that never complete
pub const NEVER_SIGNAL: u32 = u32::MAX;

// ============================================================================
// Mock Fence Provider
// ============================================================================

#[derive(Debug)]
struct MockFence {
    pending_polls: u32,
    signaled: bool,
    failed: bool,
}

pub struct MockFenceProvider {
    fences: RefCell<SlotMap<FenceHandle, MockFence>>,
    polls_before_signal: Cell<u32>,
    events: EventLog,
}

impl MockFenceProvider {
    pub fn new(events: EventLog) -> Self {
        Self {
            fences: RefCell::new(SlotMap::with_key()),
            polls_before_signal: Cell::new(0),
            events,
        }
    }

    /// Number of `TimeoutExpired` polls each newly submitted fence reports
    pub fn set_polls_before_signal(&self, polls: u32) {
        self.polls_before_signal.set(polls);
    }

    /// Mark a fence as signaled
    pub fn signal(&self, fence: FenceHandle) {
        if let Some(f) = self.fences.borrow_mut().get_mut(fence) {
            f.signaled = true;
        }
    }

    /// Make every further wait on the fence fail
    pub fn fail(&self, fence: FenceHandle) {
        if let Some(f) = self.fences.borrow_mut().get_mut(fence) {
            f.failed = true;
        }
    }

    pub fn is_live(&self, fence: FenceHandle) -> bool {
        self.fences.borrow().contains_key(fence)
    }

    pub fn poll_count(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, MockEvent::Poll(..)))
            .count()
    }
}

impl FenceProvider for MockFenceProvider {
    fn submit(&self) -> Result<FenceHandle> {
        let fence = self.fences.borrow_mut().insert(MockFence {
            pending_polls: self.polls_before_signal.get(),
            signaled: false,
            failed: false,
        });
        self.events.borrow_mut().push(MockEvent::Submit(fence));
        Ok(fence)
    }

    fn poll(&self, fence: FenceHandle, timeout: Duration) -> FenceStatus {
        let status = match self.fences.borrow_mut().get_mut(fence) {
            None => FenceStatus::WaitFailed,
            Some(f) if f.failed => FenceStatus::WaitFailed,
            Some(f) if f.signaled => FenceStatus::AlreadySignaled,
            Some(f) if f.pending_polls > 0 => {
                if f.pending_polls != NEVER_SIGNAL {
                    f.pending_polls -= 1;
                }
                FenceStatus::TimeoutExpired
            }
            Some(f) => {
                f.signaled = true;
                FenceStatus::Signaled
            }
        };
        if status == FenceStatus::TimeoutExpired {
            std::thread::sleep(timeout);
        }
        self.events.borrow_mut().push(MockEvent::Poll(fence, status));
        status
    }

    fn release(&self, fence: FenceHandle) {
        self.fences.borrow_mut().remove(fence);
        self.events.borrow_mut().push(MockEvent::Release(fence));
    }

    fn in_flight(&self) -> usize {
        self.fences.borrow().len()
    }
}

// ============================================================================
// Mock Buffer Memory
// ============================================================================

pub struct MockBufferMemory {
    pub id: u64,
    pub data: Vec<u8>,
    pub mapped: bool,
    events: EventLog,
}

impl MockBufferMemory {
    pub fn new(id: u64, size: u64, mapped: bool, events: EventLog) -> Self {
        Self { id, data: vec![0; size as usize], mapped, events }
    }

    fn check_range(&self, offset: u64, len: usize) -> Result<()> {
        if offset + len as u64 > self.data.len() as u64 {
            return Err(Error::BackendError(format!(
                "mock buffer {} access [{}, {}) out of range", self.id, offset, offset + len as u64
            )));
        }
        Ok(())
    }
}

impl BufferMemory for MockBufferMemory {
    fn id(&self) -> u64 {
        self.id
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        if !self.mapped {
            return Err(Error::BackendError("mock buffer is not mapped".to_string()));
        }
        self.check_range(offset, data.len())?;
        let start = offset as usize;
        self.data[start..start + data.len()].copy_from_slice(data);
        self.events.borrow_mut().push(MockEvent::Write { buffer: self.id, offset, len: data.len() });
        Ok(())
    }

    fn read(&self, offset: u64, out: &mut [u8]) -> Result<()> {
        if !self.mapped {
            return Err(Error::BackendError("mock buffer is not mapped".to_string()));
        }
        self.check_range(offset, out.len())?;
        let start = offset as usize;
        out.copy_from_slice(&self.data[start..start + out.len()]);
        Ok(())
    }
}

// ============================================================================
// Mock Texture / Framebuffer
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub id: u64,
    pub info: TextureInfo,
}

impl Texture for MockTexture {
    fn id(&self) -> u64 {
        self.id
    }

    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

#[derive(Debug)]
pub struct MockFramebuffer {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    pub clear_color: Vec4,
}

impl Framebuffer for MockFramebuffer {
    fn id(&self) -> u64 {
        self.id
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear_color(&self) -> Vec4 {
        self.clear_color
    }
}

// ============================================================================
// Mock Renderer
// ============================================================================

pub struct MockRenderer {
    next_id: u64,
    fences: Rc<MockFenceProvider>,
    events: EventLog,
    stats: RendererStats,
}

impl MockRenderer {
    pub fn new() -> Self {
        let events: EventLog = Rc::new(RefCell::new(Vec::new()));
        Self {
            next_id: 1,
            fences: Rc::new(MockFenceProvider::new(events.clone())),
            events,
            stats: RendererStats::default(),
        }
    }

    /// Concrete fence provider, for scripting fences in tests
    pub fn fences(&self) -> Rc<MockFenceProvider> {
        self.fences.clone()
    }

    pub fn events(&self) -> EventLog {
        self.events.clone()
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for MockRenderer {
    fn api(&self) -> Api {
        Api::Headless
    }

    fn create_buffer(&mut self, desc: &BufferDesc<'_>) -> Result<Box<dyn BufferMemory>> {
        let id = self.alloc_id();
        let total = desc.total_size();
        let mut memory = MockBufferMemory::new(id, total, desc.kind.is_mapped(), self.events.clone());
        if let Some(initial) = desc.initial_data {
            for slot in 0..desc.kind.slot_count() {
                let start = slot * desc.size as usize;
                memory.data[start..start + initial.len()].copy_from_slice(initial);
            }
        }
        self.stats.buffers += 1;
        self.stats.gpu_memory_used += total;
        Ok(Box::new(memory))
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Box<dyn Texture>> {
        let id = self.alloc_id();
        self.stats.textures += 1;
        self.stats.gpu_memory_used += desc.byte_size();
        Ok(Box::new(MockTexture { id, info: TextureInfo::from(desc) }))
    }

    fn upload_texture(&mut self, texture: &dyn Texture, source: u64, offset: u64) -> Result<()> {
        self.events.borrow_mut().push(MockEvent::Upload { texture: texture.id(), source, offset });
        Ok(())
    }

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Box<dyn Framebuffer>> {
        let id = self.alloc_id();
        self.stats.framebuffers += 1;
        Ok(Box::new(MockFramebuffer {
            id,
            width: desc.width,
            height: desc.height,
            clear_color: desc.clear_color,
        }))
    }

    fn fence_provider(&self) -> Rc<dyn FenceProvider> {
        self.fences.clone()
    }

    fn wait_idle(&self) -> Result<()> {
        Ok(())
    }

    fn stats(&self) -> RendererStats {
        RendererStats {
            fences_in_flight: self.fences.in_flight() as u32,
            ..self.stats
        }
    }
}

#[cfg(test)]
#[path = "mock_renderer_tests.rs"]
mod tests;
