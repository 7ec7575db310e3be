/// Foreign-window commands: switch to the previously focused window, verify
/// the switch, act there, then hand focus back.
use async_trait::async_trait;
use tracing::{debug, info, warn};

use voxdesk_core::{settle, CommandDescriptor, Desktop, FocusDiscipline, SettleTimings, VoxResult};

use crate::lifecycle::{ActionOutcome, FocusAwareCommand, FocusContext, FocusPhases, VariantBase};

/// Alt-Tab presses before giving up on a focus change.
const MAX_TRANSFER_ATTEMPTS: u32 = 2;

pub type ActiveWindowCommand = FocusAwareCommand<ActiveWindowPhases>;

pub struct ActiveWindowPhases {
    base: VariantBase,
}

impl ActiveWindowPhases {
    pub fn new(descriptor: CommandDescriptor, desktop: Desktop, timings: SettleTimings) -> VoxResult<Self> {
        let base = VariantBase::new(descriptor, desktop, timings, FocusDiscipline::ActiveWindow)?;
        Ok(Self { base })
    }
}

impl ActiveWindowCommand {
    pub fn build(
        text: impl Into<String>,
        descriptor: CommandDescriptor,
        desktop: Desktop,
        timings: SettleTimings,
    ) -> VoxResult<Self> {
        Ok(FocusAwareCommand::new(text, ActiveWindowPhases::new(descriptor, desktop, timings)?))
    }
}

#[async_trait]
impl FocusPhases for ActiveWindowPhases {
    fn base(&self) -> &VariantBase {
        &self.base
    }

    async fn prepare_focus(&self, ctx: &mut FocusContext) -> VoxResult<bool> {
        let VariantBase { descriptor, desktop, timings } = &self.base;
        let command_id = descriptor.id.as_str();

        let original = desktop.windows.active_window()?;
        ctx.original_window = Some(original);

        while ctx.transfer_attempts < MAX_TRANSFER_ATTEMPTS {
            desktop.input.alt_tab()?;
            ctx.transfer_attempts += 1;
            settle(descriptor.delay_after_focus_change_ms).await;

            let target = desktop.windows.active_window()?;
            ctx.target_window = Some(target);
            ctx.focus_changed = target != original;
            if ctx.focus_changed {
                break;
            }
            debug!(command_id, attempt = ctx.transfer_attempts, "[ActiveWindow] Focus did not move");
        }

        if !ctx.focus_changed {
            warn!(command_id, window = %original, "[ActiveWindow] Focus stayed on the original window");
            return Ok(false);
        }

        desktop.input.focus_target_window()?;
        settle(timings.retarget_settle_ms).await;
        info!(
            command_id,
            original = %original,
            attempts = ctx.transfer_attempts,
            "[ActiveWindow] Focus moved to target window"
        );
        Ok(true)
    }

    async fn execute_core(&self, _ctx: &FocusContext) -> VoxResult<ActionOutcome> {
        let Some(keys) = self.base.descriptor.keys() else {
            return Ok(ActionOutcome::Rejected("no key combination configured".into()));
        };
        self.base.desktop.input.send_key_combination(keys).await?;
        settle(self.base.timings.action_settle_ms).await;
        Ok(ActionOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use voxdesk_core::{DesktopCall, FaultPoint, SimulatedDesktop, VoxError, WindowHandle};

    use super::*;
    use crate::command::Command;
    use crate::lifecycle::{FailureReason, Phase, RestoreOutcome};

    const ASSISTANT: WindowHandle = WindowHandle(0x100);
    const EDITOR: WindowHandle = WindowHandle(0x200);

    fn save() -> CommandDescriptor {
        CommandDescriptor::new("save", "Save", FocusDiscipline::ActiveWindow)
            .with_triggers(["save"])
            .with_keys("Ctrl+S")
            .with_delay_ms(0)
    }

    fn command(sim: &Arc<SimulatedDesktop>, descriptor: CommandDescriptor) -> ActiveWindowCommand {
        ActiveWindowCommand::build("save", descriptor, sim.desktop(), SettleTimings::immediate()).unwrap()
    }

    #[tokio::test]
    async fn ctrl_s_lands_in_editor_and_returns() {
        let sim = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR));
        let mut cmd = command(&sim, save());

        assert!(cmd.execute().await);
        assert_eq!(
            sim.input_calls(),
            vec![
                DesktopCall::AltTab,
                DesktopCall::FocusTargetWindow,
                DesktopCall::SendKeys("Ctrl+S".into()),
            ]
        );
        assert_eq!(sim.active(), ASSISTANT);

        let report = cmd.last_report().unwrap();
        assert_eq!(report.context.original_window, Some(ASSISTANT));
        assert_eq!(report.context.target_window, Some(EDITOR));
        assert_eq!(report.context.transfer_attempts, 1);
        assert_eq!(report.restore, RestoreOutcome::Restored);
    }

    #[tokio::test]
    async fn retries_alt_tab_exactly_once() {
        let sim = Arc::new(
            SimulatedDesktop::new(ASSISTANT, EDITOR).with_alt_tab_script([ASSISTANT, EDITOR]),
        );
        let mut cmd = command(&sim, save());

        assert!(cmd.execute().await);
        assert_eq!(sim.count(&DesktopCall::AltTab), 2);
        assert_eq!(sim.count(&DesktopCall::FocusTargetWindow), 1);
        assert!(cmd.last_report().unwrap().context.focus_changed);
    }

    #[tokio::test]
    async fn stubborn_focus_still_sends_the_action() {
        let sim = Arc::new(
            SimulatedDesktop::new(ASSISTANT, EDITOR).with_alt_tab_script([ASSISTANT, ASSISTANT]),
        );
        let mut cmd = command(&sim, save());

        assert!(cmd.execute().await);
        assert_eq!(sim.count(&DesktopCall::AltTab), 2);
        assert_eq!(sim.count(&DesktopCall::FocusTargetWindow), 0);
        assert_eq!(sim.count(&DesktopCall::SendKeys("Ctrl+S".into())), 1);

        let report = cmd.last_report().unwrap();
        assert!(!report.context.focus_changed);
        assert_eq!(report.context.transfer_attempts, MAX_TRANSFER_ATTEMPTS);
    }

    #[tokio::test]
    async fn fresh_instances_behave_identically() {
        let first = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR));
        let second = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR));

        assert!(command(&first, save()).execute().await);
        assert!(command(&second, save()).execute().await);
        assert_eq!(first.calls(), second.calls());
    }

    #[tokio::test]
    async fn reusing_an_instance_starts_from_a_clean_context() {
        let sim = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR));
        let mut cmd = command(&sim, save());

        assert!(cmd.execute().await);
        let first = cmd.last_report().unwrap().context.clone();
        assert!(cmd.execute().await);
        assert_eq!(cmd.last_report().unwrap().context, first);
    }

    #[tokio::test]
    async fn missing_chord_is_rejected_after_transfer() {
        let sim = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR));
        let mut descriptor = save();
        descriptor.key_combination = None;
        let mut cmd = command(&sim, descriptor);

        assert!(!cmd.execute().await);
        assert_eq!(sim.count(&DesktopCall::SendKeys("Ctrl+S".into())), 0);
        assert!(matches!(
            cmd.last_report().unwrap().failure,
            Some(FailureReason::Rejected { .. })
        ));
    }

    #[tokio::test]
    async fn send_failure_returns_false_and_restores() {
        let sim = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR).fail_on(FaultPoint::SendKeys));
        let mut cmd = command(&sim, save().with_restore_focus(false));

        assert!(!cmd.execute().await);
        assert_eq!(sim.count(&DesktopCall::BringToFront(ASSISTANT)), 1);
        assert!(matches!(
            cmd.last_report().unwrap().failure,
            Some(FailureReason::Fault { phase: Phase::ExecuteCore, .. })
        ));
    }

    #[tokio::test]
    async fn alt_tab_failure_aborts_before_action() {
        let sim = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR).fail_on(FaultPoint::AltTab));
        let mut cmd = command(&sim, save());

        assert!(!cmd.execute().await);
        assert_eq!(sim.count(&DesktopCall::SendKeys("Ctrl+S".into())), 0);
    }

    #[tokio::test]
    async fn waits_the_focus_delay_before_reading_the_target() {
        let sim = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR));
        let mut cmd = command(&sim, save().with_delay_ms(50));

        let started = Instant::now();
        assert!(cmd.execute().await);
        assert!(started.elapsed() >= Duration::from_millis(50));

        let report = cmd.last_report().unwrap();
        assert!(report.elapsed_ms >= 50);
        assert_eq!(report.context.target_window, Some(EDITOR));
        assert_eq!(report.restore, RestoreOutcome::Restored);
        assert_eq!(sim.active(), ASSISTANT);
    }

    #[tokio::test]
    async fn retry_waits_the_focus_delay_again() {
        let sim = Arc::new(
            SimulatedDesktop::new(ASSISTANT, EDITOR).with_alt_tab_script([ASSISTANT, ASSISTANT]),
        );
        let mut cmd = command(&sim, save().with_delay_ms(40));

        let started = Instant::now();
        assert!(cmd.execute().await);
        assert!(started.elapsed() >= Duration::from_millis(80));
    }

    #[tokio::test]
    async fn settle_timings_are_honoured() {
        let sim = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR));
        let timings = SettleTimings {
            retarget_settle_ms: 20,
            action_settle_ms: 30,
            restore_settle_ms: 10,
            ..SettleTimings::immediate()
        };
        let mut cmd = ActiveWindowCommand::build("save", save(), sim.desktop(), timings).unwrap();

        let started = Instant::now();
        assert!(cmd.execute().await);
        assert!(started.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn rejects_system_wide_descriptor() {
        let sim = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR));
        let descriptor = CommandDescriptor::new("vol", "Volume", FocusDiscipline::SystemWide).with_keys("volumeup");
        let err = ActiveWindowPhases::new(descriptor, sim.desktop(), SettleTimings::immediate())
            .err()
            .unwrap();
        assert!(matches!(err, VoxError::DisciplineMismatch { .. }));
        assert!(sim.calls().is_empty());
    }
}
