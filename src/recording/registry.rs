//! Exclusive ownership of the capture hardware
//!
//! The microphone/camera is a single slot. Acquiring it hands out a
//! [`DeviceLease`]; the slot frees itself when the lease is dropped.

use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::recording::MediaKind;
use crate::{JournalError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Holder {
    id: Uuid,
    kind: MediaKind,
}

/// Single-slot registry shared by every session of a recorder
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    slot: Arc<Mutex<Option<Holder>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the devices, failing if another lease is live
    pub fn try_acquire(&self, kind: MediaKind) -> Result<DeviceLease> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(holder) = *slot {
            return Err(JournalError::DeviceBusy(format!(
                "a {} recording is already active",
                holder.kind
            )));
        }

        let id = Uuid::new_v4();
        *slot = Some(Holder { id, kind });
        tracing::debug!("Capture devices acquired for {} ({})", kind, id);

        Ok(DeviceLease {
            registry: self.clone(),
            id,
        })
    }

    pub fn is_busy(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    fn release(&self, id: Uuid) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if slot.map(|h| h.id) == Some(id) {
            *slot = None;
            tracing::debug!("Capture devices released ({})", id);
        }
    }
}

/// Proof of exclusive device ownership
#[derive(Debug)]
pub struct DeviceLease {
    registry: DeviceRegistry,
    id: Uuid,
}

impl Drop for DeviceLease {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}
