/// Descriptor catalog: the built-in command set plus anything registered at
/// runtime or loaded from a catalog file.
use voxdesk_core::{CommandDescriptor, FocusDiscipline};

use crate::detection::{detect_command, CommandMatch};

const OUTLOOK: &str = "outlook";

fn system(id: &str, name: &str, triggers: &[&str], keys: &str, description: &str) -> CommandDescriptor {
    CommandDescriptor::new(id, name, FocusDiscipline::SystemWide)
        .with_triggers(triggers.iter().copied())
        .with_keys(keys)
        .with_description(description)
}

fn window(id: &str, name: &str, triggers: &[&str], keys: &str, description: &str) -> CommandDescriptor {
    CommandDescriptor::new(id, name, FocusDiscipline::ActiveWindow)
        .with_triggers(triggers.iter().copied())
        .with_keys(keys)
        .with_description(description)
}

fn outlook(id: &str, name: &str, triggers: &[&str], keys: &str, description: &str) -> CommandDescriptor {
    CommandDescriptor::new(id, name, FocusDiscipline::SpecificApp)
        .with_triggers(triggers.iter().copied())
        .with_target(OUTLOOK)
        .with_keys(keys)
        .with_description(description)
}

/// The built-in command set, in match priority order.
///
/// Longer phrases precede the shorter phrases they contain ("save as"
/// before "save", "find and replace" before "find").
pub fn builtin_descriptors() -> Vec<CommandDescriptor> {
    vec![
        // ---------------------------------------------------------------
        // System-wide
        // ---------------------------------------------------------------
        system("volume_up", "Volume Up", &["volume up", "turn up the volume", "louder"], "volumeup", "Raises the system volume.")
            .rapid_repeat(),
        system("volume_down", "Volume Down", &["volume down", "turn down the volume", "quieter"], "volumedown", "Lowers the system volume.")
            .rapid_repeat(),
        system("volume_mute", "Mute", &["unmute", "mute", "toggle mute"], "volumemute", "Toggles system mute."),
        system("lock_screen", "Lock Screen", &["lock screen", "lock the computer", "lock computer"], "Win+L", "Locks the workstation."),
        system("show_desktop", "Show Desktop", &["show desktop", "minimize all"], "Win+D", "Minimizes every window."),
        system("screenshot", "Screenshot", &["take a screenshot", "take screenshot", "screenshot"], "Win+PrintScreen", "Saves a screenshot."),
        system("task_view", "Task View", &["task view", "show all windows"], "Win+Tab", "Opens task view."),
        system("run_dialog", "Run Dialog", &["open run dialog", "run dialog"], "Win+R", "Opens the Run dialog."),
        system("file_explorer", "File Explorer", &["open file explorer", "file explorer", "open explorer"], "Win+E", "Opens a file explorer window."),
        // ---------------------------------------------------------------
        // Active window
        // ---------------------------------------------------------------
        window("snap_left", "Snap Left", &["snap left", "snap window left"], "Win+Left", "Snaps the window to the left half."),
        window("snap_right", "Snap Right", &["snap right", "snap window right"], "Win+Right", "Snaps the window to the right half."),
        window("save_as", "Save As", &["save as", "save file as"], "Ctrl+Shift+S", "Opens the Save As dialog."),
        window("save", "Save", &["save", "save file", "save document"], "Ctrl+S", "Saves the current document."),
        window("print", "Print", &["print", "print document"], "Ctrl+P", "Opens the print dialog."),
        window("copy", "Copy", &["copy", "copy that"], "Ctrl+C", "Copies the selection."),
        window("cut", "Cut", &["cut", "cut that"], "Ctrl+X", "Cuts the selection."),
        window("paste", "Paste", &["paste", "paste that"], "Ctrl+V", "Pastes the clipboard."),
        window("undo", "Undo", &["undo", "undo that"], "Ctrl+Z", "Undoes the last change.").rapid_repeat(),
        window("redo", "Redo", &["redo", "redo that"], "Ctrl+Y", "Redoes the last undone change.").rapid_repeat(),
        window("select_all", "Select All", &["select all", "select everything"], "Ctrl+A", "Selects everything."),
        window("replace", "Find and Replace", &["find and replace", "replace"], "Ctrl+H", "Opens find and replace."),
        window("find", "Find", &["find", "search in page"], "Ctrl+F", "Opens the find bar."),
        window("zoom_in", "Zoom In", &["zoom in", "make it bigger"], "Ctrl+Plus", "Zooms in.").rapid_repeat(),
        window("zoom_out", "Zoom Out", &["zoom out", "make it smaller"], "Ctrl+Minus", "Zooms out.").rapid_repeat(),
        window("zoom_reset", "Reset Zoom", &["reset zoom", "actual size"], "Ctrl+0", "Resets zoom to 100%."),
        window("fullscreen", "Full Screen", &["full screen", "fullscreen"], "F11", "Toggles full screen."),
        window("close_window", "Close Window", &["close window", "close this window"], "Alt+F4", "Closes the window."),
        window("new_tab", "New Tab", &["new tab", "open new tab"], "Ctrl+T", "Opens a new tab."),
        window("close_tab", "Close Tab", &["close tab", "close this tab"], "Ctrl+W", "Closes the current tab."),
        window("refresh", "Refresh", &["refresh", "reload"], "F5", "Reloads the page.").rapid_repeat(),
        window("page_up", "Page Up", &["page up"], "PageUp", "Scrolls one page up.").rapid_repeat(),
        window("page_down", "Page Down", &["page down"], "PageDown", "Scrolls one page down.").rapid_repeat(),
        window("scroll_up", "Up", &["scroll up", "go up"], "Up", "Moves the cursor up.").rapid_repeat(),
        window("scroll_down", "Down", &["scroll down", "go down"], "Down", "Moves the cursor down.").rapid_repeat(),
        window("press_enter", "Enter", &["press enter", "confirm"], "Enter", "Presses Enter."),
        // ---------------------------------------------------------------
        // Outlook
        // ---------------------------------------------------------------
        outlook("mark_as_unread", "Mark as Unread", &["mark as unread", "mark unread"], "Ctrl+U", "Marks the message unread."),
        outlook("go_to_inbox", "Go to Inbox", &["go to inbox", "inbox"], "Ctrl+Shift+I", "Opens the inbox."),
        outlook("open_calendar", "Open Calendar", &["open calendar", "calendar"], "Ctrl+2", "Opens the calendar."),
        outlook("add_attachment", "Add Attachment", &["add attachment", "attach file"], "Ctrl+Shift+A", "Attaches a file to the message."),
        outlook("check_mail", "Check Mail", &["check mail", "send and receive"], "F9", "Sends and receives mail."),
    ]
}

/// Ordered, id-keyed collection of command descriptors.
#[derive(Debug, Clone)]
pub struct DescriptorCatalog {
    descriptors: Vec<CommandDescriptor>,
}

impl DescriptorCatalog {
    pub fn empty() -> Self {
        Self { descriptors: Vec::new() }
    }

    pub fn builtin() -> Self {
        Self { descriptors: builtin_descriptors() }
    }

    pub fn from_descriptors(descriptors: Vec<CommandDescriptor>) -> Self {
        let mut catalog = Self::empty();
        catalog.extend(descriptors);
        catalog
    }

    /// Insert, or replace the descriptor with the same id in place.
    pub fn register(&mut self, descriptor: CommandDescriptor) {
        match self.descriptors.iter_mut().find(|d| d.id == descriptor.id) {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
    }

    pub fn extend(&mut self, descriptors: impl IntoIterator<Item = CommandDescriptor>) {
        for descriptor in descriptors {
            self.register(descriptor);
        }
    }

    pub fn unregister(&mut self, id: &str) -> bool {
        let before = self.descriptors.len();
        self.descriptors.retain(|d| d.id != id);
        self.descriptors.len() != before
    }

    pub fn get(&self, id: &str) -> Option<&CommandDescriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    pub fn all(&self) -> &[CommandDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn find(&self, text: &str) -> Option<&CommandDescriptor> {
        self.find_match(text).map(|m| m.descriptor)
    }

    pub fn find_match(&self, text: &str) -> Option<CommandMatch<'_>> {
        detect_command(text, &self.descriptors)
    }
}

impl Default for DescriptorCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use voxdesk_core::KeyChord;

    use super::*;

    #[test]
    fn builtin_ids_are_unique() {
        let catalog = DescriptorCatalog::builtin();
        let ids: HashSet<_> = catalog.all().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn builtin_chords_parse() {
        for d in DescriptorCatalog::builtin().all() {
            let keys = d.keys().unwrap();
            if d.focus == FocusDiscipline::SystemWide && keys.starts_with("volume") {
                continue;
            }
            assert!(keys.parse::<KeyChord>().is_ok(), "{} has bad chord {keys}", d.id);
        }
    }

    #[test]
    fn builtin_specific_apps_name_a_target() {
        let catalog = DescriptorCatalog::builtin();
        assert!(catalog
            .all()
            .iter()
            .filter(|d| d.focus == FocusDiscipline::SpecificApp)
            .all(|d| d.target() == Some(OUTLOOK)));
    }

    #[test]
    fn finds_builtins_by_phrase() {
        let catalog = DescriptorCatalog::builtin();
        assert_eq!(catalog.find("Volume Up").unwrap().id, "volume_up");
        assert_eq!(catalog.find("save as").unwrap().id, "save_as");
        assert_eq!(catalog.find("please save this").unwrap().id, "save");
        assert_eq!(catalog.find("find and replace").unwrap().id, "replace");
        assert_eq!(catalog.find("unmute").unwrap().id, "volume_mute");
        assert!(catalog.find("").is_none());
    }

    #[test]
    fn register_upserts_in_place() {
        let mut catalog = DescriptorCatalog::builtin();
        let position = catalog.all().iter().position(|d| d.id == "save").unwrap();
        let len = catalog.len();

        catalog.register(
            CommandDescriptor::new("save", "Save Everything", FocusDiscipline::ActiveWindow)
                .with_triggers(["save"])
                .with_keys("Ctrl+Shift+Alt+S"),
        );

        assert_eq!(catalog.len(), len);
        assert_eq!(catalog.all()[position].name, "Save Everything");
        assert_eq!(catalog.get("save").unwrap().keys(), Some("Ctrl+Shift+Alt+S"));
    }

    #[test]
    fn register_appends_new_ids_and_unregister_removes() {
        let mut catalog = DescriptorCatalog::empty();
        catalog.register(CommandDescriptor::new("a", "A", FocusDiscipline::ActiveWindow).with_triggers(["alpha"]));
        catalog.register(CommandDescriptor::new("b", "B", FocusDiscipline::ActiveWindow).with_triggers(["beta"]));
        assert_eq!(catalog.find("beta").unwrap().id, "b");

        assert!(catalog.unregister("b"));
        assert!(!catalog.unregister("b"));
        assert!(catalog.find("beta").is_none());
        assert_eq!(catalog.len(), 1);
    }
}
