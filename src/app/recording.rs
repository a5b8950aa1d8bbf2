//! Recording state machine.
//!
//! ```text
//!   Disarmed ──toggle──▶ Armed { since }
//!      ▲                     │
//!      └──────toggle─────────┘
//! ```
//!
//! Only an explicit toggle (or a reset) changes state.  The arm time is
//! kept for reporting and does not gate or timestamp rows.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordingState {
    #[default]
    Disarmed,
    Armed {
        /// Device uptime at the moment recording was armed.
        since_uptime_ms: u64,
    },
}

impl RecordingState {
    /// Flip the state.  Returns `true` if now armed.
    pub fn toggle(&mut self, now_ms: u64) -> bool {
        *self = match *self {
            Self::Disarmed => Self::Armed {
                since_uptime_ms: now_ms,
            },
            Self::Armed { .. } => Self::Disarmed,
        };
        self.is_armed()
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, Self::Armed { .. })
    }

    pub fn armed_since_ms(&self) -> Option<u64> {
        match self {
            Self::Armed { since_uptime_ms } => Some(*since_uptime_ms),
            Self::Disarmed => None,
        }
    }
}
