/// Commands bound to a named application: launch or switch to it, act, and
/// return focus.
use async_trait::async_trait;
use tracing::{info, warn};

use voxdesk_core::{
    settle, CommandDescriptor, Desktop, FocusDiscipline, SettleTimings, VoxError, VoxResult,
};

use crate::lifecycle::{ActionOutcome, FocusAwareCommand, FocusContext, FocusPhases, VariantBase};

pub type SpecificAppCommand = FocusAwareCommand<SpecificAppPhases>;

pub struct SpecificAppPhases {
    base: VariantBase,
    app: String,
}

impl SpecificAppPhases {
    pub fn new(descriptor: CommandDescriptor, desktop: Desktop, timings: SettleTimings) -> VoxResult<Self> {
        let base = VariantBase::new(descriptor, desktop, timings, FocusDiscipline::SpecificApp)?;
        let app = base
            .descriptor
            .target()
            .ok_or_else(|| VoxError::MissingTargetApplication(base.descriptor.id.clone()))?
            .to_string();
        Ok(Self { base, app })
    }

    pub fn app(&self) -> &str {
        &self.app
    }
}

impl SpecificAppCommand {
    pub fn build(
        text: impl Into<String>,
        descriptor: CommandDescriptor,
        desktop: Desktop,
        timings: SettleTimings,
    ) -> VoxResult<Self> {
        Ok(FocusAwareCommand::new(text, SpecificAppPhases::new(descriptor, desktop, timings)?))
    }
}

#[async_trait]
impl FocusPhases for SpecificAppPhases {
    fn base(&self) -> &VariantBase {
        &self.base
    }

    async fn prepare_focus(&self, ctx: &mut FocusContext) -> VoxResult<bool> {
        let VariantBase { descriptor, desktop, timings } = &self.base;
        let command_id = descriptor.id.as_str();
        let app = self.app.as_str();

        let original = desktop.windows.active_window()?;
        ctx.original_window = Some(original);

        if !desktop.apps.is_running(app)? {
            info!(command_id, app, "[SpecificApp] Launching application");
            desktop.apps.launch(app).await?;
            settle(timings.app_launch_wait_ms).await;
        } else if !desktop.apps.switch_to(app).await? {
            warn!(command_id, app, "[SpecificApp] Could not switch to application");
            return Ok(false);
        }
        ctx.transfer_attempts = 1;

        settle(descriptor.delay_after_focus_change_ms).await;
        let target = desktop.windows.active_window()?;
        ctx.target_window = Some(target);
        ctx.focus_changed = target != original;
        Ok(ctx.focus_changed)
    }

    async fn execute_core(&self, _ctx: &FocusContext) -> VoxResult<ActionOutcome> {
        let wait = self.base.timings.app_ready_wait_ms;
        settle(wait).await;

        let Some(keys) = self.base.descriptor.keys() else {
            return Ok(ActionOutcome::Rejected("no key combination configured".into()));
        };
        self.base.desktop.input.send_key_combination(keys).await?;
        settle(wait).await;
        Ok(ActionOutcome::Completed)
    }
}
