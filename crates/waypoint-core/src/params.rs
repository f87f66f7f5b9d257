//! Parameter structures for Waypoint operations.
//!
//! These structures are shared by every interface (the admin CLI and the
//! Telegram bot) and carry no framework-specific derives. Interface layers
//! define their own wrapper types (clap `Args`, parsed bot commands) and
//! convert into these with `From`:
//!
//! ```ignore
//! // In waypoint-cli/src/cli.rs
//! #[derive(Args)]
//! pub struct SetHourArgs {
//!     pub id: u64,
//!     pub hour: u8,
//! }
//!
//! impl From<SetHourArgs> for SetReminderHour {
//!     fn from(args: SetHourArgs) -> Self {
//!         SetReminderHour { id: args.id, hour: args.hour }
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Parameters for operations requiring just a user ID.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserId {
    /// Telegram user ID
    pub id: u64,
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self { id }
    }
}

/// Parameters for granting or revoking bot access.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SetAccess {
    pub id: u64,
    pub access: bool,
}

/// Parameters for promoting or demoting an admin.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SetAdmin {
    pub id: u64,
    pub is_admin: bool,
}

/// Parameters for changing the daily reminder hour.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SetReminderHour {
    pub id: u64,
    /// Local hour, 0-23
    pub hour: u8,
}

/// Parameters for removing stale accounts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PurgeInactive {
    /// Users idle for longer than this many days are removed
    pub days: u32,
}

impl Default for PurgeInactive {
    fn default() -> Self {
        Self { days: 30 }
    }
}
