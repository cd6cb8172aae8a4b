//! Table output formatting for CLI commands using comfy-table.

use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};
use std::env;

/// Two-column table with a bold header row
pub fn key_value_table<K, V>(header: (&str, &str), rows: impl IntoIterator<Item = (K, V)>) -> Table
where
    K: Into<String>,
    V: Into<String>,
{
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    if !supports_color() {
        table.force_no_tty();
    }

    table.set_header(vec![
        Cell::new(header.0).add_attribute(Attribute::Bold),
        Cell::new(header.1).add_attribute(Attribute::Bold),
    ]);
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key.into()), Cell::new(value.into())]);
    }
    table
}

/// Whether terminal colors should be used
pub fn supports_color() -> bool {
    // Respect NO_COLOR environment variable
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}
