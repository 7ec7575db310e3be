use anyhow::Result;
use async_trait::async_trait;

use crate::types::WindowHandle;

/// Source of top-level window handles.
///
/// Implementations wrap the platform window manager; the dispatcher never
/// inspects a handle beyond comparing it and handing it back.
pub trait WindowSource: Send + Sync {
    /// Handle of the window currently holding input focus.
    fn active_window(&self) -> Result<WindowHandle>;

    /// Bring the given window to the foreground. `Ok(false)` when refused.
    fn bring_to_front(&self, handle: WindowHandle) -> Result<bool>;
}

/// Synthesized keyboard input.
#[async_trait]
pub trait InputSynthesizer: Send + Sync {
    /// Switch to the previously focused window (Alt-Tab style).
    fn alt_tab(&self) -> Result<()>;

    /// Re-foreground whatever window the last switch landed on.
    fn focus_target_window(&self) -> Result<()>;

    /// Send a key combination such as `"Ctrl+Shift+S"`.
    async fn send_key_combination(&self, combo: &str) -> Result<()>;

    fn volume_up(&self) -> Result<()>;

    fn volume_down(&self) -> Result<()>;

    fn volume_mute(&self) -> Result<()>;
}

/// Starts and switches to named desktop applications.
#[async_trait]
pub trait AppLauncher: Send + Sync {
    fn is_running(&self, app: &str) -> Result<bool>;

    async fn launch(&self, app: &str) -> Result<()>;

    /// Bring a running application to the front. `Ok(false)` when it refused.
    async fn switch_to(&self, app: &str) -> Result<bool>;
}
