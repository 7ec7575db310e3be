/// System-wide commands: volume, lock screen, show desktop and other
/// actions that need no foreign window.
use async_trait::async_trait;
use tracing::debug;

use voxdesk_core::{CommandDescriptor, Desktop, FocusDiscipline, SettleTimings, VoxResult};

use crate::lifecycle::{
    ActionOutcome, FocusAwareCommand, FocusContext, FocusPhases, RestoreOutcome, VariantBase,
};

pub type SystemWideCommand = FocusAwareCommand<SystemWidePhases>;

pub struct SystemWidePhases {
    base: VariantBase,
}

impl SystemWidePhases {
    pub fn new(descriptor: CommandDescriptor, desktop: Desktop, timings: SettleTimings) -> VoxResult<Self> {
        let base = VariantBase::new(descriptor, desktop, timings, FocusDiscipline::SystemWide)?;
        Ok(Self { base })
    }
}

impl SystemWideCommand {
    pub fn build(
        text: impl Into<String>,
        descriptor: CommandDescriptor,
        desktop: Desktop,
        timings: SettleTimings,
    ) -> VoxResult<Self> {
        Ok(FocusAwareCommand::new(text, SystemWidePhases::new(descriptor, desktop, timings)?))
    }
}

#[async_trait]
impl FocusPhases for SystemWidePhases {
    fn base(&self) -> &VariantBase {
        &self.base
    }

    async fn prepare_focus(&self, ctx: &mut FocusContext) -> VoxResult<bool> {
        ctx.original_window = Some(self.base.desktop.windows.active_window()?);
        Ok(true)
    }

    async fn execute_core(&self, _ctx: &FocusContext) -> VoxResult<ActionOutcome> {
        let Some(keys) = self.base.descriptor.keys() else {
            return Ok(ActionOutcome::Rejected("no key combination configured".into()));
        };

        let input = &self.base.desktop.input;
        match keys.to_lowercase().as_str() {
            "volumeup" => input.volume_up()?,
            "volumedown" => input.volume_down()?,
            "volumemute" | "mute" => input.volume_mute()?,
            _ => {
                debug!(command_id = %self.base.descriptor.id, keys, "[SystemWide] Sending key combination");
                input.send_key_combination(keys).await?;
            }
        }
        Ok(ActionOutcome::Completed)
    }

    /// Focus never left the assistant, so there is nothing to restore.
    async fn restore_focus(&self, _ctx: &FocusContext) -> VoxResult<RestoreOutcome> {
        Ok(RestoreOutcome::NoOp)
    }
}
