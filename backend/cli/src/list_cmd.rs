//! `voxdesk list`

use voxdesk_commands::DescriptorCatalog;
use voxdesk_core::CommandDescriptor;

use crate::terminal_output::{discipline_badge, note_info, render_table, Column};

pub fn run(catalog: &DescriptorCatalog) {
    if catalog.is_empty() {
        note_info("The catalog is empty. Enable builtins or point commands.catalogPath at a file.");
        return;
    }

    println!("{}", render_catalog(catalog.all()));
    note_info(&format!("{} commands", catalog.len()));
}

fn render_catalog(descriptors: &[CommandDescriptor]) -> String {
    let columns = [
        Column::left("Id"),
        Column::left("Focus"),
        Column::left("Keys"),
        Column::left("Target"),
        Column::right("Delay"),
        Column::left("Triggers").max_width(48),
    ];
    let rows: Vec<Vec<String>> = descriptors.iter().map(row).collect();
    render_table(&columns, &rows)
}

fn row(d: &CommandDescriptor) -> Vec<String> {
    vec![
        d.id.clone(),
        discipline_badge(d.focus),
        d.keys().unwrap_or("-").to_string(),
        d.target().unwrap_or("-").to_string(),
        d.delay_after_focus_change_ms.to_string(),
        d.triggers.join(", "),
    ]
}
