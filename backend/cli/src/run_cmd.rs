//! `voxdesk run <TEXT>`: dispatch against a simulated desktop.
//!
//! The desktop starts with the assistant window focused and an editor
//! behind it, so Alt-Tab lands on the editor unless focus is stubborn.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use voxdesk_commands::{CommandDispatcher, CommandFactory, DescriptorCatalog, DispatchOutcome};
use voxdesk_config::VoxdeskConfig;
use voxdesk_core::{DesktopCall, SettleTimings, SimulatedDesktop, WindowHandle};

use crate::terminal_output::{note_error, note_info, outcome_line, BOLD, RESET};

pub const ASSISTANT: WindowHandle = WindowHandle(0x1);
pub const EDITOR: WindowHandle = WindowHandle(0x2);

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub stubborn_focus: bool,
    pub immediate: bool,
}

pub async fn run(config: &VoxdeskConfig, catalog: DescriptorCatalog, text: &str, options: RunOptions) -> Result<()> {
    let sim = Arc::new(simulated_desktop(options));
    let outcome = dispatch(&sim, config, catalog, text, options).await;

    println!("{BOLD}Desktop calls{RESET}");
    for (i, call) in sim.calls().iter().enumerate() {
        println!("  {:>2}. {}", i + 1, describe_call(call));
    }
    println!("  focus ends on {}", window_name(sim.active()));
    println!();

    println!("{}", serde_json::to_string_pretty(&outcome).context("Failed to render outcome")?);
    println!();

    let line = outcome_line(&outcome);
    if outcome.is_success() {
        note_info(&line);
        Ok(())
    } else {
        note_error(&line);
        bail!("utterance did not execute successfully")
    }
}

fn simulated_desktop(options: RunOptions) -> SimulatedDesktop {
    let sim = SimulatedDesktop::new(ASSISTANT, EDITOR);
    if options.stubborn_focus {
        sim.with_alt_tab_script([ASSISTANT, ASSISTANT])
    } else {
        sim
    }
}

async fn dispatch(
    sim: &Arc<SimulatedDesktop>,
    config: &VoxdeskConfig,
    catalog: DescriptorCatalog,
    text: &str,
    options: RunOptions,
) -> DispatchOutcome {
    let timings = if options.immediate {
        SettleTimings::immediate()
    } else {
        config.settle_timings()
    };
    let factory = CommandFactory::new(sim.desktop(), timings);
    let mut dispatcher = CommandDispatcher::new(catalog, factory, config.duplicate_window());
    dispatcher.dispatch(text).await
}

fn window_name(handle: WindowHandle) -> String {
    match handle {
        ASSISTANT => format!("assistant ({handle})"),
        EDITOR => format!("editor ({handle})"),
        other => other.to_string(),
    }
}

fn describe_call(call: &DesktopCall) -> String {
    match call {
        DesktopCall::ActiveWindow => "active_window".to_string(),
        DesktopCall::BringToFront(h) => format!("bring_to_front {}", window_name(*h)),
        DesktopCall::AltTab => "alt_tab".to_string(),
        DesktopCall::FocusTargetWindow => "focus_target_window".to_string(),
        DesktopCall::SendKeys(combo) => format!("send_key_combination {combo}"),
        DesktopCall::VolumeUp => "volume_up".to_string(),
        DesktopCall::VolumeDown => "volume_down".to_string(),
        DesktopCall::VolumeMute => "volume_mute".to_string(),
        DesktopCall::IsRunning(app) => format!("is_running {app}"),
        DesktopCall::Launch(app) => format!("launch {app}"),
        DesktopCall::SwitchTo(app) => format!("switch_to {app}"),
    }
}
