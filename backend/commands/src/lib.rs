pub mod active_window;
pub mod adapter;
pub mod command;
pub mod detection;
pub mod dispatch;
pub mod factory;
pub mod lifecycle;
pub mod registry;
pub mod specific_app;
pub mod system_wide;
#[cfg(test)]
mod test_support;
pub mod types;

pub use active_window::{ActiveWindowCommand, ActiveWindowPhases};
pub use adapter::{CommandActionType, CommandAdapter, CommandContext, CommandResponse, SystemCommand};
pub use command::Command;
pub use detection::{detect_command, normalize, CommandMatch, MatchKind};
pub use dispatch::{CommandDispatcher, Resolved};
pub use factory::{CommandFactory, DuplicateGuard, DEFAULT_DUPLICATE_WINDOW};
pub use lifecycle::{
    restore_original_window, ActionOutcome, ExecutionReport, FailureReason, FocusAwareCommand,
    FocusContext, FocusPhases, LifecycleState, Phase, RestoreOutcome, VariantBase,
};
pub use registry::{builtin_descriptors, DescriptorCatalog};
pub use specific_app::{SpecificAppCommand, SpecificAppPhases};
pub use system_wide::{SystemWideCommand, SystemWidePhases};
pub use types::DispatchOutcome;

use voxdesk_core::{Desktop, SettleTimings};

/// Build a dispatcher over the built-in catalog with default timings.
pub fn build_default_dispatcher(desktop: Desktop) -> CommandDispatcher {
    let factory = CommandFactory::new(desktop, SettleTimings::default());
    CommandDispatcher::new(DescriptorCatalog::builtin(), factory, DEFAULT_DUPLICATE_WINDOW)
}
