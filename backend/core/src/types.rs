use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::traits::{AppLauncher, InputSynthesizer, WindowSource};

/// Opaque identifier of a top-level desktop window. `0` is the null handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(pub u64);

impl WindowHandle {
    pub const NULL: WindowHandle = WindowHandle(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Fixed settle delays around focus changes and synthesized input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettleTimings {
    /// After nudging the newly focused window to the front.
    pub retarget_settle_ms: u64,
    /// After sending an action key combination.
    pub action_settle_ms: u64,
    /// After a successful focus restoration.
    pub restore_settle_ms: u64,
    /// After launching a specific application that was not running.
    pub app_launch_wait_ms: u64,
    /// Before and after acting inside a specific application.
    pub app_ready_wait_ms: u64,
}

impl Default for SettleTimings {
    fn default() -> Self {
        Self {
            retarget_settle_ms: 100,
            action_settle_ms: 200,
            restore_settle_ms: 100,
            app_launch_wait_ms: 2000,
            app_ready_wait_ms: 500,
        }
    }
}

impl SettleTimings {
    /// Zero delays everywhere. Used by the simulated desktop and tests.
    pub fn immediate() -> Self {
        Self {
            retarget_settle_ms: 0,
            action_settle_ms: 0,
            restore_settle_ms: 0,
            app_launch_wait_ms: 0,
            app_ready_wait_ms: 0,
        }
    }
}

/// Sleep for `ms` milliseconds; a zero delay returns immediately.
pub async fn settle(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

/// The desktop capabilities a command may use, injected at construction.
#[derive(Clone)]
pub struct Desktop {
    pub windows: Arc<dyn WindowSource>,
    pub input: Arc<dyn InputSynthesizer>,
    pub apps: Arc<dyn AppLauncher>,
}

impl Desktop {
    pub fn new(
        windows: Arc<dyn WindowSource>,
        input: Arc<dyn InputSynthesizer>,
        apps: Arc<dyn AppLauncher>,
    ) -> Self {
        Self {
            windows,
            input,
            apps,
        }
    }
}

impl fmt::Debug for Desktop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Desktop").finish_non_exhaustive()
    }
}
