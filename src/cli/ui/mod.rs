mod colors;

pub use colors::{apply_inquire_theme, error, highlight, info, success};

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::services::{NoticeKind, Notifier};

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Keep the first few characters of a credential and hide the rest.
pub fn mask_secret(value: &str) -> String {
    let mut iter = value.chars();
    let prefix: String = iter.by_ref().take(4).collect();
    if iter.next().is_some() {
        format!("{prefix}…")
    } else {
        prefix
    }
}

/// Field names that hold credentials and are masked when printed.
pub fn is_secret_field(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("key") || lower.contains("secret") || lower.contains("token")
}

/// Prints notifications as colored status lines.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Success => println!("{}", success(message)),
            NoticeKind::Error => eprintln!("{}", error(message)),
        }
    }
}
