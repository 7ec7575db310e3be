//! `voxdesk match <TEXT>`

use voxdesk_commands::{normalize, CommandMatch, DescriptorCatalog, MatchKind};
use voxdesk_core::KeyChord;

use crate::terminal_output::{discipline_badge, note_success, note_warn, BOLD, RESET};

pub fn run(catalog: &DescriptorCatalog, text: &str) {
    let Some(found) = catalog.find_match(text) else {
        note_warn(&format!("No command matches \"{}\"", normalize(text)));
        return;
    };

    note_success(&format!("{BOLD}{}{RESET} ({})", found.descriptor.name, found.descriptor.id));
    for (label, value) in describe(&found) {
        println!("  {label:<10} {value}");
    }
}

fn describe(found: &CommandMatch<'_>) -> Vec<(&'static str, String)> {
    let d = found.descriptor;
    let kind = match found.kind {
        MatchKind::Exact => "exact",
        MatchKind::Contains => "contains",
    };

    let mut lines = vec![
        ("trigger", format!("\"{}\" ({kind})", found.trigger)),
        ("focus", discipline_badge(d.focus)),
        ("keys", chord_summary(d.keys())),
    ];
    if let Some(alt) = d.alternative_key_combination.as_deref() {
        lines.push(("alt keys", chord_summary(Some(alt))));
    }
    if let Some(target) = d.target() {
        lines.push(("target", target.to_string()));
    }
    lines.push(("delay", format!("{} ms", d.delay_after_focus_change_ms)));
    lines.push(("restore", d.restore_focus.to_string()));
    if !d.description.is_empty() {
        lines.push(("about", d.description.clone()));
    }
    lines
}

/// Canonical form of a chord, or the raw text with the parse error.
fn chord_summary(keys: Option<&str>) -> String {
    let Some(raw) = keys else {
        return "-".to_string();
    };
    match raw.parse::<KeyChord>() {
        Ok(chord) => chord.to_string(),
        Err(e) => format!("{raw} (not a key chord: {e})"),
    }
}
