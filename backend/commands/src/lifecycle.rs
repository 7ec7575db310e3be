/// Focus-aware command lifecycle: prepare focus, run the action, restore focus.
///
/// Variants supply the phases through [`FocusPhases`]; the ordering, fault
/// handling and reporting live in [`FocusAwareCommand::run`] and cannot be
/// overridden.
use std::fmt;
use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use voxdesk_core::{
    settle, CommandDescriptor, Desktop, FocusDiscipline, SettleTimings, VoxError, VoxResult,
    WindowHandle,
};
use voxdesk_logging::{CommandEvent, EventLogger};

use crate::command::Command;

// ---------------------------------------------------------------------------
// Per-call state
// ---------------------------------------------------------------------------

/// Window bookkeeping for one execution. Created fresh by every `run`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FocusContext {
    /// Window focused when preparation began (normally the assistant).
    pub original_window: Option<WindowHandle>,
    /// Window focused after the transfer attempt.
    pub target_window: Option<WindowHandle>,
    pub focus_changed: bool,
    pub transfer_attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LifecycleState {
    Created,
    PreparingFocus,
    Executing,
    RestoringFocus,
    Completed { success: bool },
}

/// Result of the action phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// The action could not be dispatched, e.g. no key combination.
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    PrepareFocus,
    ExecuteCore,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::PrepareFocus => "prepare_focus",
            Phase::ExecuteCore => "execute_core",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    Rejected { reason: String },
    Fault { phase: Phase, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum RestoreOutcome {
    /// The descriptor asked not to restore.
    Skipped,
    Restored,
    /// No usable original window, or the window manager refused.
    NotRestored,
    Failed(String),
    /// The variant has nothing to restore.
    NoOp,
}

impl fmt::Display for RestoreOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreOutcome::Skipped => f.write_str("skipped"),
            RestoreOutcome::Restored => f.write_str("restored"),
            RestoreOutcome::NotRestored => f.write_str("not restored"),
            RestoreOutcome::Failed(msg) => write!(f, "failed: {msg}"),
            RestoreOutcome::NoOp => f.write_str("no-op"),
        }
    }
}

/// Everything observable about one `run`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    pub command_id: String,
    pub command_text: String,
    pub success: bool,
    pub context: FocusContext,
    pub trace: Vec<LifecycleState>,
    pub failure: Option<FailureReason>,
    pub restore: RestoreOutcome,
    pub elapsed_ms: u64,
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Descriptor and capabilities shared by every variant.
#[derive(Debug, Clone)]
pub struct VariantBase {
    pub descriptor: CommandDescriptor,
    pub desktop: Desktop,
    pub timings: SettleTimings,
}

impl VariantBase {
    /// Fails with `DisciplineMismatch` unless the descriptor declares `expected`.
    pub fn new(
        descriptor: CommandDescriptor,
        desktop: Desktop,
        timings: SettleTimings,
        expected: FocusDiscipline,
    ) -> VoxResult<Self> {
        if descriptor.focus != expected {
            return Err(VoxError::DisciplineMismatch {
                command_id: descriptor.id.clone(),
                expected,
                found: descriptor.focus,
            });
        }
        Ok(Self {
            descriptor,
            desktop,
            timings,
        })
    }
}

/// The overridable steps of the lifecycle.
#[async_trait]
pub trait FocusPhases: Send + Sync {
    fn base(&self) -> &VariantBase;

    /// Move focus to the action's target. Must record `original_window`
    /// before changing anything. `Ok(false)` means focus did not verifiably
    /// move; execution continues regardless.
    async fn prepare_focus(&self, ctx: &mut FocusContext) -> VoxResult<bool>;

    async fn execute_core(&self, ctx: &FocusContext) -> VoxResult<ActionOutcome>;

    async fn restore_focus(&self, ctx: &FocusContext) -> VoxResult<RestoreOutcome> {
        restore_original_window(self.base(), ctx).await
    }
}

/// Default restoration: bring `original_window` back to the front.
pub async fn restore_original_window(
    base: &VariantBase,
    ctx: &FocusContext,
) -> VoxResult<RestoreOutcome> {
    let command_id = base.descriptor.id.as_str();
    let Some(original) = ctx.original_window.filter(|h| !h.is_null()) else {
        warn!(command_id, "[Lifecycle] No original window recorded, focus not restored");
        return Ok(RestoreOutcome::NotRestored);
    };

    if base.desktop.windows.bring_to_front(original)? {
        settle(base.timings.restore_settle_ms).await;
        info!(command_id, window = %original, "[Lifecycle] Focus restored");
        Ok(RestoreOutcome::Restored)
    } else {
        warn!(command_id, window = %original, "[Lifecycle] Window manager refused to restore focus");
        Ok(RestoreOutcome::NotRestored)
    }
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// A command built from a descriptor and a set of focus phases.
pub struct FocusAwareCommand<P> {
    text: String,
    phases: P,
    last_report: Option<ExecutionReport>,
}

impl<P: FocusPhases> FocusAwareCommand<P> {
    pub fn new(text: impl Into<String>, phases: P) -> Self {
        Self {
            text: text.into(),
            phases,
            last_report: None,
        }
    }

    pub fn descriptor(&self) -> &CommandDescriptor {
        &self.phases.base().descriptor
    }

    pub fn phases(&self) -> &P {
        &self.phases
    }

    /// Execute all phases in order and report what happened.
    ///
    /// A phase error triggers a best-effort restoration regardless of the
    /// descriptor's restore flag; the restoration's own error is dropped.
    pub async fn run(&self) -> ExecutionReport {
        let started = Instant::now();
        let descriptor = self.descriptor();
        let command_id = descriptor.id.as_str();

        let mut ctx = FocusContext::default();
        let mut trace = vec![LifecycleState::Created];

        info!(command_id, discipline = %descriptor.focus, "[Lifecycle] Executing command");
        EventLogger::log_event(
            command_id,
            CommandEvent::Started {
                command_text: self.text.clone(),
                discipline: descriptor.focus.to_string(),
            },
        );

        let (success, failure, restore) = match self.drive(&mut ctx, &mut trace).await {
            Ok((ActionOutcome::Completed, restore)) => (true, None, restore),
            Ok((ActionOutcome::Rejected(reason), restore)) => {
                (false, Some(FailureReason::Rejected { reason }), restore)
            }
            Err((phase, err)) => {
                warn!(command_id, %phase, error = %err, "[Lifecycle] Command failed, attempting focus restoration");
                EventLogger::log_event(
                    command_id,
                    CommandEvent::Fault {
                        phase: phase.to_string(),
                        message: err.to_string(),
                    },
                );
                trace.push(LifecycleState::RestoringFocus);
                let restore = match self.phases.restore_focus(&ctx).await {
                    Ok(outcome) => outcome,
                    Err(restore_err) => {
                        warn!(command_id, error = %restore_err, "[Lifecycle] Focus restoration failed");
                        RestoreOutcome::Failed(restore_err.to_string())
                    }
                };
                let failure = FailureReason::Fault {
                    phase,
                    message: err.to_string(),
                };
                (false, Some(failure), restore)
            }
        };

        trace.push(LifecycleState::Completed { success });
        let elapsed_ms = started.elapsed().as_millis() as u64;

        EventLogger::log_event(
            command_id,
            CommandEvent::Restore {
                outcome: restore.to_string(),
            },
        );
        EventLogger::log_event(command_id, CommandEvent::Completed { success, elapsed_ms });
        info!(command_id, success, elapsed_ms, "[Lifecycle] Command finished");

        ExecutionReport {
            command_id: command_id.to_string(),
            command_text: self.text.clone(),
            success,
            context: ctx,
            trace,
            failure,
            restore,
            elapsed_ms,
        }
    }

    async fn drive(
        &self,
        ctx: &mut FocusContext,
        trace: &mut Vec<LifecycleState>,
    ) -> Result<(ActionOutcome, RestoreOutcome), (Phase, VoxError)> {
        let descriptor = self.descriptor();
        let command_id = descriptor.id.as_str();

        trace.push(LifecycleState::PreparingFocus);
        let transferred = self
            .phases
            .prepare_focus(ctx)
            .await
            .map_err(|e| (Phase::PrepareFocus, e))?;
        if !transferred {
            warn!(command_id, "[Lifecycle] Focus transfer not confirmed, continuing anyway");
        }
        EventLogger::log_event(
            command_id,
            CommandEvent::FocusTransfer {
                original: ctx.original_window.map(|h| h.0),
                target: ctx.target_window.map(|h| h.0),
                attempts: ctx.transfer_attempts,
                changed: ctx.focus_changed,
            },
        );

        trace.push(LifecycleState::Executing);
        let outcome = self
            .phases
            .execute_core(ctx)
            .await
            .map_err(|e| (Phase::ExecuteCore, e))?;
        match &outcome {
            ActionOutcome::Completed => EventLogger::log_event(command_id, CommandEvent::ActionCompleted),
            ActionOutcome::Rejected(reason) => {
                warn!(command_id, reason = %reason, "[Lifecycle] Action rejected");
                EventLogger::log_event(
                    command_id,
                    CommandEvent::ActionRejected {
                        reason: reason.clone(),
                    },
                );
            }
        }

        if !descriptor.restore_focus {
            return Ok((outcome, RestoreOutcome::Skipped));
        }

        trace.push(LifecycleState::RestoringFocus);
        let restore = match self.phases.restore_focus(ctx).await {
            Ok(restore) => restore,
            Err(err) => {
                warn!(command_id, error = %err, "[Lifecycle] Focus restoration failed");
                RestoreOutcome::Failed(err.to_string())
            }
        };
        Ok((outcome, restore))
    }
}

#[async_trait]
impl<P: FocusPhases> Command for FocusAwareCommand<P> {
    fn command_text(&self) -> &str {
        &self.text
    }

    async fn execute(&mut self) -> bool {
        let report = self.run().await;
        let success = report.success;
        self.last_report = Some(report);
        success
    }

    fn last_report(&self) -> Option<&ExecutionReport> {
        self.last_report.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use voxdesk_core::{DesktopCall, FaultPoint, SimulatedDesktop};

    use super::*;
    use crate::test_support::CapturedLogs;

    const ASSISTANT: WindowHandle = WindowHandle(10);
    const EDITOR: WindowHandle = WindowHandle(20);

    /// Records the original window, then does whatever it was told to.
    struct ScriptedPhases {
        base: VariantBase,
        transfer: bool,
        prepare_fails: bool,
        action: Result<ActionOutcome, String>,
    }

    impl ScriptedPhases {
        fn new(sim: &Arc<SimulatedDesktop>, restore: bool) -> Self {
            let descriptor = CommandDescriptor::new("scripted", "Scripted", FocusDiscipline::ActiveWindow)
                .with_restore_focus(restore);
            Self {
                base: VariantBase::new(
                    descriptor,
                    sim.desktop(),
                    SettleTimings::immediate(),
                    FocusDiscipline::ActiveWindow,
                )
                .unwrap(),
                transfer: true,
                prepare_fails: false,
                action: Ok(ActionOutcome::Completed),
            }
        }
    }

    #[async_trait]
    impl FocusPhases for ScriptedPhases {
        fn base(&self) -> &VariantBase {
            &self.base
        }

        async fn prepare_focus(&self, ctx: &mut FocusContext) -> VoxResult<bool> {
            ctx.original_window = Some(self.base.desktop.windows.active_window()?);
            if self.prepare_fails {
                return Err(VoxError::Platform("alt-tab unavailable".into()));
            }
            Ok(self.transfer)
        }

        async fn execute_core(&self, _ctx: &FocusContext) -> VoxResult<ActionOutcome> {
            self.action.clone().map_err(VoxError::Platform)
        }
    }

    fn sim() -> Arc<SimulatedDesktop> {
        Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR))
    }

    #[tokio::test]
    async fn completed_action_restores_original_window() {
        let sim = sim();
        let cmd = FocusAwareCommand::new("do it", ScriptedPhases::new(&sim, true));
        let report = cmd.run().await;

        assert!(report.success);
        assert_eq!(report.restore, RestoreOutcome::Restored);
        assert_eq!(sim.count(&DesktopCall::BringToFront(ASSISTANT)), 1);
        assert_eq!(
            report.trace,
            vec![
                LifecycleState::Created,
                LifecycleState::PreparingFocus,
                LifecycleState::Executing,
                LifecycleState::RestoringFocus,
                LifecycleState::Completed { success: true },
            ]
        );
    }

    #[tokio::test]
    async fn restore_flag_off_skips_restoration() {
        let sim = sim();
        let cmd = FocusAwareCommand::new("do it", ScriptedPhases::new(&sim, false));
        let report = cmd.run().await;

        assert!(report.success);
        assert_eq!(report.restore, RestoreOutcome::Skipped);
        assert_eq!(sim.count(&DesktopCall::BringToFront(ASSISTANT)), 0);
        assert!(!report.trace.contains(&LifecycleState::RestoringFocus));
    }

    #[tokio::test]
    async fn unconfirmed_transfer_still_executes() {
        let sim = sim();
        let mut phases = ScriptedPhases::new(&sim, true);
        phases.transfer = false;
        let report = FocusAwareCommand::new("do it", phases).run().await;

        assert!(report.success);
        assert!(report.trace.contains(&LifecycleState::Executing));
    }

    #[tokio::test]
    async fn rejected_action_is_unsuccessful_but_restores() {
        let sim = sim();
        let mut phases = ScriptedPhases::new(&sim, true);
        phases.action = Ok(ActionOutcome::Rejected("no key combination".into()));
        let report = FocusAwareCommand::new("do it", phases).run().await;

        assert!(!report.success);
        assert_eq!(
            report.failure,
            Some(FailureReason::Rejected {
                reason: "no key combination".into()
            })
        );
        assert_eq!(report.restore, RestoreOutcome::Restored);
    }

    #[tokio::test]
    async fn action_fault_restores_even_when_flag_is_off() {
        let sim = sim();
        let mut phases = ScriptedPhases::new(&sim, false);
        phases.action = Err("synthesizer crashed".into());
        let report = FocusAwareCommand::new("do it", phases).run().await;

        assert!(!report.success);
        assert!(matches!(
            report.failure,
            Some(FailureReason::Fault { phase: Phase::ExecuteCore, .. })
        ));
        assert_eq!(report.restore, RestoreOutcome::Restored);
        assert_eq!(sim.count(&DesktopCall::BringToFront(ASSISTANT)), 1);
    }

    #[tokio::test]
    async fn prepare_fault_skips_action() {
        let sim = sim();
        let mut phases = ScriptedPhases::new(&sim, true);
        phases.prepare_fails = true;
        let report = FocusAwareCommand::new("do it", phases).run().await;

        assert!(!report.success);
        assert!(!report.trace.contains(&LifecycleState::Executing));
        assert!(matches!(
            report.failure,
            Some(FailureReason::Fault { phase: Phase::PrepareFocus, .. })
        ));
    }

    #[tokio::test]
    async fn restore_error_never_changes_success() {
        let sim = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR).fail_on(FaultPoint::BringToFront));
        let report = FocusAwareCommand::new("do it", ScriptedPhases::new(&sim, true))
            .run()
            .await;

        assert!(report.success);
        assert!(matches!(report.restore, RestoreOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn restore_error_after_fault_is_swallowed() {
        let sim = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR).fail_on(FaultPoint::BringToFront));
        let mut phases = ScriptedPhases::new(&sim, true);
        phases.action = Err("boom".into());
        let mut cmd = FocusAwareCommand::new("do it", phases);

        let (logs, _guard) = CapturedLogs::install();
        assert!(!cmd.execute().await);
        let report = cmd.last_report().unwrap();
        assert!(matches!(report.restore, RestoreOutcome::Failed(_)));
        assert!(logs.contents().contains("[Lifecycle] Focus restoration failed"));
    }

    #[tokio::test]
    async fn refused_restore_reports_not_restored() {
        let sim = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR).refuse_foreground());
        let report = FocusAwareCommand::new("do it", ScriptedPhases::new(&sim, true))
            .run()
            .await;

        assert!(report.success);
        assert_eq!(report.restore, RestoreOutcome::NotRestored);
    }

    #[tokio::test]
    async fn null_original_is_not_restored() {
        let sim = Arc::new(SimulatedDesktop::new(WindowHandle::NULL, EDITOR));
        let report = FocusAwareCommand::new("do it", ScriptedPhases::new(&sim, true))
            .run()
            .await;

        assert_eq!(report.restore, RestoreOutcome::NotRestored);
        assert!(sim.calls().iter().all(|c| !matches!(c, DesktopCall::BringToFront(_))));
    }

    #[test]
    fn mismatched_discipline_is_rejected() {
        let sim = sim();
        let descriptor = CommandDescriptor::new("vol", "Volume", FocusDiscipline::SystemWide);
        let err = VariantBase::new(
            descriptor,
            sim.desktop(),
            SettleTimings::immediate(),
            FocusDiscipline::ActiveWindow,
        )
        .unwrap_err();
        assert!(matches!(err, VoxError::DisciplineMismatch { .. }));
        assert!(sim.calls().is_empty());
    }
}
