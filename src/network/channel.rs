use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelStatus {
    Free,
    Occupied,
}

/// The shared medium of one access point. Only one station may hold it per
/// attempt, and it is released again before the next attempt is evaluated.
#[derive(Debug, Clone)]
pub struct ChannelState {
    status: ChannelStatus,
    id: String,
}

impl ChannelState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            status: ChannelStatus::Free,
            id: id.into(),
        }
    }

    pub fn is_free(&self) -> bool {
        self.status == ChannelStatus::Free
    }

    /// Returns false if someone already holds the medium.
    pub fn occupy(&mut self) -> bool {
        if self.is_free() {
            self.status = ChannelStatus::Occupied;
            true
        } else {
            false
        }
    }

    pub fn release(&mut self) {
        self.status = ChannelStatus::Free;
    }

    pub fn status(&self) -> ChannelStatus {
        self.status
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Default for ChannelState {
    fn default() -> Self {
        Self::new("default")
    }
}
