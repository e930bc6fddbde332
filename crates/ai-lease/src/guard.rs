use core::fmt;

use crate::LeaseManager;

/// One reference on a granted lease.
///
/// Released exactly once: either through [`LeaseGuard::release`] or when dropped. A guard whose
/// lease was preempted or reclaimed by TTL releases nothing.
#[must_use = "dropping the guard releases the lease immediately"]
pub struct LeaseGuard {
    manager: LeaseManager,
    holder: String,
    epoch: u64,
    released: bool,
}

impl LeaseGuard {
    pub(crate) fn new(manager: LeaseManager, holder: String, epoch: u64) -> Self {
        Self {
            manager,
            holder,
            epoch,
            released: false,
        }
    }

    pub fn holder(&self) -> &str {
        &self.holder
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Release this reference. Returns `false` (and logs) if it was already released.
    pub fn release(&mut self) -> bool {
        if self.released {
            tracing::warn!(
                resource = self.manager.resource(),
                holder = %self.holder,
                "Lease guard released twice, ignoring"
            );
            return false;
        }
        self.released = true;
        self.manager.release_epoch(&self.holder, self.epoch);
        true
    }
}

impl Drop for LeaseGuard {
    fn drop(&mut self) {
        if !self.released {
            self.released = true;
            self.manager.release_epoch(&self.holder, self.epoch);
        }
    }
}

impl fmt::Debug for LeaseGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeaseGuard")
            .field("holder", &self.holder)
            .field("epoch", &self.epoch)
            .field("released", &self.released)
            .finish()
    }
}
