/// Command dispatch: route an utterance to a two-way handler or a catalog
/// descriptor, then execute it.
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use voxdesk_core::CommandDescriptor;
use voxdesk_logging::{redact_sensitive_data, CommandEvent, EventLogger};

use crate::adapter::{CommandAdapter, SystemCommand};
use crate::command::Command;
use crate::detection::normalize;
use crate::factory::{CommandFactory, DuplicateGuard};
use crate::registry::DescriptorCatalog;
use crate::types::DispatchOutcome;

/// What an utterance resolved to.
pub enum Resolved {
    Handler(Arc<dyn SystemCommand>),
    Descriptor(CommandDescriptor),
}

impl Resolved {
    pub fn label(&self) -> &str {
        match self {
            Resolved::Handler(handler) => handler.name(),
            Resolved::Descriptor(descriptor) => &descriptor.id,
        }
    }
}

pub struct CommandDispatcher {
    handlers: Vec<Arc<dyn SystemCommand>>,
    catalog: DescriptorCatalog,
    factory: CommandFactory,
    guard: DuplicateGuard,
}

impl CommandDispatcher {
    pub fn new(catalog: DescriptorCatalog, factory: CommandFactory, duplicate_window: Duration) -> Self {
        Self {
            handlers: Vec::new(),
            catalog,
            factory,
            guard: DuplicateGuard::new(duplicate_window),
        }
    }

    /// Handlers are consulted in registration order, before the catalog.
    pub fn register_handler(&mut self, handler: Arc<dyn SystemCommand>) {
        self.handlers.push(handler);
    }

    pub fn catalog(&self) -> &DescriptorCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut DescriptorCatalog {
        &mut self.catalog
    }

    pub fn resolve(&self, text: &str) -> Option<Resolved> {
        if let Some(handler) = self.handlers.iter().find(|h| h.can_handle(text)) {
            return Some(Resolved::Handler(handler.clone()));
        }
        self.catalog
            .find(text)
            .cloned()
            .map(Resolved::Descriptor)
    }

    pub async fn dispatch(&mut self, text: &str) -> DispatchOutcome {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return DispatchOutcome::NoMatch;
        }

        let Some(resolved) = self.resolve(text) else {
            info!(text = %redact_sensitive_data(&normalized), "[Commands] No command matches utterance");
            return DispatchOutcome::NoMatch;
        };
        let command_name = resolved.label().to_string();

        let exempt = matches!(&resolved, Resolved::Descriptor(d) if d.allow_rapid_repeat);
        if self.guard.is_duplicate(&normalized, exempt) {
            EventLogger::log_event(
                &command_name,
                CommandEvent::Suppressed {
                    command_text: text.to_string(),
                },
            );
            return DispatchOutcome::Suppressed { command: command_name };
        }

        let mut command: Box<dyn Command> = match resolved {
            Resolved::Handler(handler) => Box::new(CommandAdapter::new(handler, text)),
            Resolved::Descriptor(descriptor) => match self.factory.build(text, &descriptor) {
                Ok(command) => command,
                Err(e) => {
                    warn!(command = %command_name, error = %e, "[Commands] Could not build command");
                    return DispatchOutcome::Rejected {
                        command: command_name,
                        reason: e.to_string(),
                    };
                }
            },
        };

        self.guard.record(&normalized);

        info!(
            command = %command_name,
            text = %redact_sensitive_data(&normalized),
            "[Commands] Dispatching command"
        );
        let success = command.execute().await;
        DispatchOutcome::Executed {
            command: command_name,
            success,
            report: command.last_report().cloned(),
        }
    }

    /// Forget the last utterance so an immediate repeat executes.
    pub fn reset(&mut self) {
        self.guard.reset();
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use async_trait::async_trait;

    use voxdesk_core::{DesktopCall, FocusDiscipline, SettleTimings, SimulatedDesktop, WindowHandle};

    use super::*;
    use crate::adapter::{CommandContext, CommandResponse};
    use crate::test_support::CapturedLogs;

    const ASSISTANT: WindowHandle = WindowHandle(1);
    const EDITOR: WindowHandle = WindowHandle(2);

    struct TimeCommand;

    #[async_trait]
    impl SystemCommand for TimeCommand {
        fn name(&self) -> &str {
            "time"
        }

        fn can_handle(&self, text: &str) -> bool {
            text.to_lowercase().contains("what time")
        }

        async fn execute(&self, _ctx: &mut CommandContext) -> Result<Option<CommandResponse>> {
            Ok(Some(CommandResponse::ok("It is noon")))
        }
    }

    fn catalog() -> DescriptorCatalog {
        let mut catalog = DescriptorCatalog::builtin();
        for d in [catalog.get("save").cloned(), catalog.get("volume_up").cloned()] {
            catalog.register(d.unwrap().with_delay_ms(0));
        }
        catalog
    }

    fn dispatcher(sim: &Arc<SimulatedDesktop>, window: Duration) -> CommandDispatcher {
        let factory = CommandFactory::new(sim.desktop(), SettleTimings::immediate());
        CommandDispatcher::new(catalog(), factory, window)
    }

    #[tokio::test]
    async fn executes_catalog_command() {
        let sim = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR));
        let mut dispatcher = dispatcher(&sim, Duration::from_secs(1));

        let outcome = dispatcher.dispatch("Save").await;
        assert!(outcome.is_success());
        assert_eq!(outcome.command(), Some("save"));
        let DispatchOutcome::Executed { report: Some(report), .. } = outcome else {
            panic!("expected an executed outcome");
        };
        assert_eq!(report.context.target_window, Some(EDITOR));
        assert_eq!(sim.count(&DesktopCall::SendKeys("Ctrl+S".into())), 1);
    }

    #[tokio::test]
    async fn handlers_take_precedence_over_catalog() {
        let sim = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR));
        let mut dispatcher = dispatcher(&sim, Duration::from_secs(1));
        dispatcher.register_handler(Arc::new(TimeCommand));

        let outcome = dispatcher.dispatch("what time is it, save me").await;
        assert_eq!(outcome.command(), Some("time"));
        assert!(outcome.is_success());
        assert!(sim.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_and_empty_text_do_not_match() {
        let sim = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR));
        let mut dispatcher = dispatcher(&sim, Duration::from_secs(1));

        assert!(matches!(dispatcher.dispatch("  ").await, DispatchOutcome::NoMatch));
        assert!(matches!(dispatcher.dispatch("sing a song").await, DispatchOutcome::NoMatch));
        assert!(sim.calls().is_empty());
    }

    #[tokio::test]
    async fn rapid_duplicate_is_suppressed_until_reset() {
        let sim = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR));
        let mut dispatcher = dispatcher(&sim, Duration::from_secs(60));

        assert!(dispatcher.dispatch("save").await.is_success());
        assert!(matches!(
            dispatcher.dispatch("  SAVE ").await,
            DispatchOutcome::Suppressed { .. }
        ));
        dispatcher.reset();
        assert!(dispatcher.dispatch("save").await.is_success());
        assert_eq!(sim.count(&DesktopCall::SendKeys("Ctrl+S".into())), 2);
    }

    #[tokio::test]
    async fn rapid_repeat_commands_are_exempt() {
        let sim = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR));
        let mut dispatcher = dispatcher(&sim, Duration::from_secs(60));

        assert!(dispatcher.dispatch("volume up").await.is_success());
        assert!(dispatcher.dispatch("volume up").await.is_success());
        assert_eq!(sim.count(&DesktopCall::VolumeUp), 2);
    }

    #[tokio::test]
    async fn broken_descriptor_is_rejected() {
        let sim = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR));
        let mut dispatcher = dispatcher(&sim, Duration::from_secs(1));
        dispatcher.catalog_mut().register(
            CommandDescriptor::new("teams_mute", "Teams Mute", FocusDiscipline::SpecificApp)
                .with_triggers(["teams mute"])
                .with_keys("Ctrl+Shift+M"),
        );

        let outcome = dispatcher.dispatch("teams mute").await;
        assert!(matches!(outcome, DispatchOutcome::Rejected { ref command, .. } if command == "teams_mute"));
        assert!(sim.calls().is_empty());
    }

    #[tokio::test]
    async fn broken_descriptor_stays_rejected_on_retry() {
        let sim = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR));
        let mut dispatcher = dispatcher(&sim, Duration::from_secs(60));
        dispatcher.catalog_mut().register(
            CommandDescriptor::new("teams_mute", "Teams Mute", FocusDiscipline::SpecificApp)
                .with_triggers(["teams mute"])
                .with_keys("Ctrl+Shift+M"),
        );

        for _ in 0..2 {
            let outcome = dispatcher.dispatch("teams mute").await;
            assert!(matches!(outcome, DispatchOutcome::Rejected { .. }), "got {outcome:?}");
        }
        assert!(sim.calls().is_empty());
    }

    #[tokio::test]
    async fn utterance_text_is_redacted_in_logs() {
        let (logs, _guard) = CapturedLogs::install();

        let sim = Arc::new(SimulatedDesktop::new(ASSISTANT, EDITOR));
        let mut dispatcher = dispatcher(&sim, Duration::from_secs(60));
        dispatcher.dispatch("save and mail bob@example.com").await;
        dispatcher.dispatch("save and mail bob@example.com").await;
        dispatcher.dispatch("call 4111111111111111").await;

        let output = logs.contents();
        assert!(output.contains("[Commands] Dispatching command"));
        assert!(output.contains("Duplicate utterance suppressed"));
        assert!(!output.contains("bob@example.com"));
        assert!(!output.contains("4111111111111111"));
    }
}
