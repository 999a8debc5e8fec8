//! Shared provisioning context.
//!
//! Single source of truth for "is the provider installed / usable / entitled".
//! A setup run brackets its mutations with [`ProvisioningContext::suspend`] and
//! [`ProvisioningContext::resume`] so observers see one aggregated change
//! instead of intermediate snapshots.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::debug;

use cs_core::provisioning::{ProvisioningChange, ProvisioningPatch, ProvisioningState};

struct ContextInner {
    state: ProvisioningState,
    /// Nesting depth of `suspend` calls.
    suspended: u32,
    /// State observed when the outermost suspension began.
    suspended_from: Option<ProvisioningState>,
}

pub struct ProvisioningContext {
    inner: Mutex<ContextInner>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<ProvisioningChange>>>,
}

impl ProvisioningContext {
    pub fn new(initial: ProvisioningState) -> Self {
        Self {
            inner: Mutex::new(ContextInner {
                state: initial,
                suspended: 0,
                suspended_from: None,
            }),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Returns the context wrapped in Arc for shared ownership.
    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn snapshot(&self) -> ProvisioningState {
        self.lock_inner().state
    }

    pub fn is_suspended(&self) -> bool {
        self.lock_inner().suspended > 0
    }

    /// Merges `patch`; notifies subscribers unless suspended.
    pub fn update(&self, patch: ProvisioningPatch) {
        let change = {
            let mut inner = self.lock_inner();
            let previous = inner.state;
            if !inner.state.apply(&patch) || inner.suspended > 0 {
                None
            } else {
                Some(ProvisioningChange {
                    previous,
                    current: inner.state,
                })
            }
        };

        if let Some(change) = change {
            self.notify(change);
        }
    }

    pub fn suspend(&self) {
        let mut inner = self.lock_inner();
        if inner.suspended == 0 {
            inner.suspended_from = Some(inner.state);
        }
        inner.suspended += 1;
    }

    /// Ends a suspension. The outermost `resume` emits one change covering
    /// everything since `suspend`, or nothing when there is no net change.
    pub fn resume(&self) {
        let change = {
            let mut inner = self.lock_inner();
            if inner.suspended == 0 {
                debug!("provisioning context resumed without matching suspend");
                return;
            }
            inner.suspended -= 1;
            if inner.suspended > 0 {
                return;
            }
            inner
                .suspended_from
                .take()
                .filter(|previous| *previous != inner.state)
                .map(|previous| ProvisioningChange {
                    previous,
                    current: inner.state,
                })
        };

        if let Some(change) = change {
            self.notify(change);
        }
    }

    /// Suspends until the returned guard is dropped.
    pub fn suspend_guard(self: &Arc<Self>) -> SuspendGuard {
        self.suspend();
        SuspendGuard {
            context: Arc::clone(self),
        }
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ProvisioningChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock_subscribers().push(tx);
        rx
    }

    fn notify(&self, change: ProvisioningChange) {
        debug!(previous = ?change.previous, current = ?change.current, "provisioning context changed");
        self.lock_subscribers()
            .retain(|subscriber| subscriber.send(change).is_ok());
    }

    fn lock_inner(&self) -> MutexGuard<'_, ContextInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<ProvisioningChange>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ProvisioningContext {
    fn default() -> Self {
        Self::new(ProvisioningState::default())
    }
}

/// Resumes the context on drop.
pub struct SuspendGuard {
    context: Arc<ProvisioningContext>,
}

impl Drop for SuspendGuard {
    fn drop(&mut self) {
        self.context.resume();
    }
}
