//! Non-interactive settings overview

use anyhow::Result;
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;

use crate::i18n::tr;
use crate::settings::registry::{self, Category};
use crate::settings::store::SettingsStore;
use crate::ui::prelude::*;

pub fn print_status(store: &SettingsStore) -> Result<()> {
    if matches!(get_output_format(), OutputFormat::Json) {
        for spec in registry::SETTINGS {
            let value = store
                .current(spec.id)
                .map(|v| v.to_string())
                .unwrap_or_default();
            emit(
                Level::Info,
                "status.setting",
                &format!("{} = {}", spec.id, value),
                Some(serde_json::json!({
                    "id": spec.id,
                    "category": spec.category.id(),
                    "value": value,
                    "persistent": spec.persistent,
                    "requires_reboot": spec.requires_reboot,
                })),
            );
        }
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        tr("status.setting"),
        tr("status.current"),
        tr("status.persistent"),
    ]);
    for &category in Category::all() {
        for spec in registry::settings_in_category(category) {
            let value = store
                .current(spec.id)
                .map(crate::menu::format_value)
                .unwrap_or_default();
            let persistent = if spec.persistent {
                tr("status.yes")
            } else {
                tr("status.no")
            };
            table.add_row(vec![tr(spec.title_key), value, persistent]);
        }
    }
    println!("{table}");
    Ok(())
}
