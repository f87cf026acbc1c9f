/// Fence handles and the backend fence provider trait

use std::time::Duration;
use slotmap::new_key_type;
use crate::error::Result;

new_key_type! {
    /// Opaque identity of a GPU fence
    ///
    /// Only meaningful to the provider that created it.
    pub struct FenceHandle;
}

/// Outcome of one bounded wait on a fence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceStatus {
    /// The fence had signaled before the wait started
    AlreadySignaled,
    /// The fence signaled during the wait
    Signaled,
    /// The timeout elapsed with the fence still pending
    TimeoutExpired,
    /// The wait itself failed (invalid or lost fence)
    WaitFailed,
}

impl FenceStatus {
    /// True when the GPU work guarded by the fence has completed
    pub fn is_signaled(&self) -> bool {
        matches!(self, FenceStatus::AlreadySignaled | FenceStatus::Signaled)
    }
}

/// Backend fence provider
///
/// Creates fences in the GPU command stream and answers bounded waits on
/// them. All calls come from the single rendering thread.
pub trait FenceProvider {
    /// Insert a fence after every command submitted so far
    fn submit(&self) -> Result<FenceHandle>;

    /// Wait at most `timeout` for `fence` to signal
    fn poll(&self, fence: FenceHandle, timeout: Duration) -> FenceStatus;

    /// Destroy the fence; the handle is invalid afterwards
    fn release(&self, fence: FenceHandle);

    /// Number of fences created and not yet released
    fn in_flight(&self) -> usize;
}
