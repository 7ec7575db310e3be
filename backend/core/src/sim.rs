use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

use crate::traits::{AppLauncher, InputSynthesizer, WindowSource};
use crate::types::{Desktop, WindowHandle};

/// First handle handed out to launched applications.
const LAUNCH_HANDLE_BASE: u64 = 0x1000;

/// A capability call that can be made to fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    ActiveWindow,
    BringToFront,
    AltTab,
    FocusTargetWindow,
    SendKeys,
    Volume,
    IsRunning,
    Launch,
    SwitchTo,
}

/// One recorded call against the simulated desktop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesktopCall {
    ActiveWindow,
    BringToFront(WindowHandle),
    AltTab,
    FocusTargetWindow,
    SendKeys(String),
    VolumeUp,
    VolumeDown,
    VolumeMute,
    IsRunning(String),
    Launch(String),
    SwitchTo(String),
}

impl DesktopCall {
    /// True for calls that synthesize input.
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            DesktopCall::AltTab
                | DesktopCall::FocusTargetWindow
                | DesktopCall::SendKeys(_)
                | DesktopCall::VolumeUp
                | DesktopCall::VolumeDown
                | DesktopCall::VolumeMute
        )
    }
}

struct SimState {
    active: WindowHandle,
    previous: WindowHandle,
    /// Windows the next Alt-Tab presses land on, in order.
    alt_tab_script: VecDeque<WindowHandle>,
    refuse_foreground: bool,
    refuse_switch: bool,
    running: HashMap<String, WindowHandle>,
    next_handle: u64,
    faults: HashSet<FaultPoint>,
    calls: Vec<DesktopCall>,
}

/// In-memory desktop implementing every capability trait.
///
/// Alt-Tab swaps the active and previous windows unless a script says
/// otherwise. Every call is journaled, and any call can be made to fail.
pub struct SimulatedDesktop {
    state: Mutex<SimState>,
}

impl SimulatedDesktop {
    pub fn new(active: WindowHandle, previous: WindowHandle) -> Self {
        Self {
            state: Mutex::new(SimState {
                active,
                previous,
                alt_tab_script: VecDeque::new(),
                refuse_foreground: false,
                refuse_switch: false,
                running: HashMap::new(),
                next_handle: LAUNCH_HANDLE_BASE,
                faults: HashSet::new(),
                calls: Vec::new(),
            }),
        }
    }

    /// Script where successive Alt-Tab presses land.
    pub fn with_alt_tab_script(self, landings: impl IntoIterator<Item = WindowHandle>) -> Self {
        self.state.lock().alt_tab_script.extend(landings);
        self
    }

    pub fn with_running_app(self, app: impl Into<String>, window: WindowHandle) -> Self {
        self.state
            .lock()
            .running
            .insert(app.into().to_lowercase(), window);
        self
    }

    pub fn fail_on(self, point: FaultPoint) -> Self {
        self.state.lock().faults.insert(point);
        self
    }

    /// Make `bring_to_front` report refusal.
    pub fn refuse_foreground(self) -> Self {
        self.state.lock().refuse_foreground = true;
        self
    }

    /// Make `switch_to` report refusal.
    pub fn refuse_switch(self) -> Self {
        self.state.lock().refuse_switch = true;
        self
    }

    /// Bundle this desktop as the capability set handed to commands.
    pub fn desktop(self: &Arc<Self>) -> Desktop {
        Desktop::new(self.clone(), self.clone(), self.clone())
    }

    pub fn active(&self) -> WindowHandle {
        self.state.lock().active
    }

    pub fn calls(&self) -> Vec<DesktopCall> {
        self.state.lock().calls.clone()
    }

    /// Input-synthesis calls only, in order.
    pub fn input_calls(&self) -> Vec<DesktopCall> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.is_input())
            .cloned()
            .collect()
    }

    pub fn count(&self, call: &DesktopCall) -> usize {
        self.state.lock().calls.iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: DesktopCall, point: FaultPoint) -> Result<MutexGuard<'_, SimState>> {
        let mut state = self.state.lock();
        debug!(call = ?call, "Simulated desktop call");
        state.calls.push(call);
        if state.faults.contains(&point) {
            return Err(anyhow!("simulated {:?} failure", point));
        }
        Ok(state)
    }
}

fn switch_active(state: &mut SimState, to: WindowHandle) {
    if state.active != to {
        state.previous = state.active;
        state.active = to;
    }
}

impl WindowSource for SimulatedDesktop {
    fn active_window(&self) -> Result<WindowHandle> {
        let state = self.record(DesktopCall::ActiveWindow, FaultPoint::ActiveWindow)?;
        Ok(state.active)
    }

    fn bring_to_front(&self, handle: WindowHandle) -> Result<bool> {
        let mut state = self.record(DesktopCall::BringToFront(handle), FaultPoint::BringToFront)?;
        if state.refuse_foreground || handle.is_null() {
            return Ok(false);
        }
        switch_active(&mut state, handle);
        Ok(true)
    }
}

#[async_trait]
impl InputSynthesizer for SimulatedDesktop {
    fn alt_tab(&self) -> Result<()> {
        let mut state = self.record(DesktopCall::AltTab, FaultPoint::AltTab)?;
        let landing = match state.alt_tab_script.pop_front() {
            Some(handle) => handle,
            None => state.previous,
        };
        switch_active(&mut state, landing);
        Ok(())
    }

    fn focus_target_window(&self) -> Result<()> {
        drop(self.record(DesktopCall::FocusTargetWindow, FaultPoint::FocusTargetWindow)?);
        Ok(())
    }

    async fn send_key_combination(&self, combo: &str) -> Result<()> {
        drop(self.record(DesktopCall::SendKeys(combo.to_string()), FaultPoint::SendKeys)?);
        Ok(())
    }

    fn volume_up(&self) -> Result<()> {
        drop(self.record(DesktopCall::VolumeUp, FaultPoint::Volume)?);
        Ok(())
    }

    fn volume_down(&self) -> Result<()> {
        drop(self.record(DesktopCall::VolumeDown, FaultPoint::Volume)?);
        Ok(())
    }

    fn volume_mute(&self) -> Result<()> {
        drop(self.record(DesktopCall::VolumeMute, FaultPoint::Volume)?);
        Ok(())
    }
}

#[async_trait]
impl AppLauncher for SimulatedDesktop {
    fn is_running(&self, app: &str) -> Result<bool> {
        let state = self.record(DesktopCall::IsRunning(app.to_string()), FaultPoint::IsRunning)?;
        Ok(state.running.contains_key(&app.to_lowercase()))
    }

    async fn launch(&self, app: &str) -> Result<()> {
        let mut state = self.record(DesktopCall::Launch(app.to_string()), FaultPoint::Launch)?;
        let handle = WindowHandle(state.next_handle);
        state.next_handle += 1;
        state.running.insert(app.to_lowercase(), handle);
        switch_active(&mut state, handle);
        Ok(())
    }

    async fn switch_to(&self, app: &str) -> Result<bool> {
        let mut state = self.record(DesktopCall::SwitchTo(app.to_string()), FaultPoint::SwitchTo)?;
        if state.refuse_switch {
            return Ok(false);
        }
        let Some(handle) = state.running.get(&app.to_lowercase()).copied() else {
            return Ok(false);
        };
        switch_active(&mut state, handle);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASSISTANT: WindowHandle = WindowHandle(1);
    const EDITOR: WindowHandle = WindowHandle(2);

    #[test]
    fn alt_tab_swaps_without_script() {
        let sim = SimulatedDesktop::new(ASSISTANT, EDITOR);
        sim.alt_tab().unwrap();
        assert_eq!(sim.active(), EDITOR);
        sim.alt_tab().unwrap();
        assert_eq!(sim.active(), ASSISTANT);
    }

    #[test]
    fn alt_tab_follows_script() {
        let sim = SimulatedDesktop::new(ASSISTANT, EDITOR).with_alt_tab_script([ASSISTANT, EDITOR]);
        sim.alt_tab().unwrap();
        assert_eq!(sim.active(), ASSISTANT);
        sim.alt_tab().unwrap();
        assert_eq!(sim.active(), EDITOR);
        assert_eq!(sim.count(&DesktopCall::AltTab), 2);
    }

    #[tokio::test]
    async fn faults_are_journaled_then_raised() {
        let sim = SimulatedDesktop::new(ASSISTANT, EDITOR).fail_on(FaultPoint::SendKeys);
        assert!(sim.send_key_combination("Ctrl+S").await.is_err());
        assert_eq!(sim.input_calls(), vec![DesktopCall::SendKeys("Ctrl+S".into())]);
    }

    #[tokio::test]
    async fn launch_allocates_and_focuses() {
        let sim = SimulatedDesktop::new(ASSISTANT, EDITOR);
        assert!(!sim.is_running("Outlook").unwrap());
        sim.launch("Outlook").await.unwrap();
        assert!(sim.is_running("outlook").unwrap());
        assert_eq!(sim.active(), WindowHandle(LAUNCH_HANDLE_BASE));
        assert!(sim.switch_to("OUTLOOK").await.unwrap());
    }

    #[test]
    fn refused_foreground_keeps_focus() {
        let sim = SimulatedDesktop::new(EDITOR, ASSISTANT).refuse_foreground();
        assert!(!sim.bring_to_front(ASSISTANT).unwrap());
        assert_eq!(sim.active(), EDITOR);
    }
}
