/// Trigger detection: map an utterance to the descriptor whose trigger it
/// names.
use serde::Serialize;

use voxdesk_core::CommandDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// The whole utterance is the trigger.
    Exact,
    /// The trigger appears somewhere inside the utterance.
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMatch<'a> {
    pub descriptor: &'a CommandDescriptor,
    pub trigger: &'a str,
    pub kind: MatchKind,
}

/// Trim and lowercase; inner runs of whitespace collapse to one space.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Find the descriptor an utterance refers to.
///
/// An exact trigger match anywhere in the list wins over a containment
/// match; within each pass, list order decides.
pub fn detect_command<'a>(text: &str, descriptors: &'a [CommandDescriptor]) -> Option<CommandMatch<'a>> {
    let input = normalize(text);
    if input.is_empty() {
        return None;
    }

    let triggers = || {
        descriptors.iter().flat_map(|d| {
            d.triggers
                .iter()
                .map(move |t| (d, t.as_str(), normalize(t)))
                .filter(|(_, _, norm)| !norm.is_empty())
        })
    };

    if let Some((descriptor, trigger, _)) = triggers().find(|(_, _, norm)| *norm == input) {
        return Some(CommandMatch { descriptor, trigger, kind: MatchKind::Exact });
    }

    triggers()
        .find(|(_, _, norm)| input.contains(norm.as_str()))
        .map(|(descriptor, trigger, _)| CommandMatch { descriptor, trigger, kind: MatchKind::Contains })
}
