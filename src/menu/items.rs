//! Menu item types
//!
//! Display strings are precomputed from the store so the selectable
//! items stay cheap clones.

use crate::i18n::tr;
use crate::menu_utils::FzfSelectable;
use crate::settings::registry::{Category, SettingSpec};
use crate::settings::store::SettingsStore;
use crate::settings::value::SettingValue;
use crate::ui;

pub fn format_value(value: &SettingValue) -> String {
    match value {
        SettingValue::Bool(true) => tr("menu.on"),
        SettingValue::Bool(false) => tr("menu.off"),
        other => other.to_string(),
    }
}

#[derive(Clone)]
pub enum MainMenuItem {
    Category(Category),
    Apply(usize),
    Exit,
}

impl FzfSelectable for MainMenuItem {
    fn fzf_display_text(&self) -> String {
        match self {
            MainMenuItem::Category(category) => tr(category.title_key()),
            MainMenuItem::Apply(0) => tr("menu.apply"),
            MainMenuItem::Apply(count) => format!(
                "{} ({} {})",
                tr("menu.apply"),
                count,
                tr("menu.pending_changes")
            ),
            MainMenuItem::Exit => tr("menu.exit"),
        }
    }

    fn fzf_key(&self) -> String {
        match self {
            MainMenuItem::Category(category) => format!("category:{}", category.id()),
            MainMenuItem::Apply(_) => "apply".to_string(),
            MainMenuItem::Exit => "exit".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct SettingItem {
    pub spec: &'static SettingSpec,
    display: String,
}

impl SettingItem {
    pub fn new(spec: &'static SettingSpec, store: &SettingsStore) -> Self {
        let current = store.current(spec.id);
        let pending = store.pending(spec.id);
        let display = match (current, pending) {
            (Some(current), Some(pending)) if pending != current => format!(
                "{}  [{} {} {}]",
                tr(spec.title_key),
                format_value(current),
                ui::GLYPH_PENDING,
                format_value(pending)
            ),
            (Some(current), _) => format!("{}  [{}]", tr(spec.title_key), format_value(current)),
            _ => tr(spec.title_key),
        };
        Self { spec, display }
    }
}

#[derive(Clone)]
pub enum CategoryMenuItem {
    Setting(SettingItem),
    Apply(usize),
    Back,
}

impl FzfSelectable for CategoryMenuItem {
    fn fzf_display_text(&self) -> String {
        match self {
            CategoryMenuItem::Setting(item) => item.display.clone(),
            CategoryMenuItem::Apply(0) => tr("menu.apply"),
            CategoryMenuItem::Apply(count) => format!(
                "{} ({} {})",
                tr("menu.apply"),
                count,
                tr("menu.pending_changes")
            ),
            CategoryMenuItem::Back => tr("menu.back"),
        }
    }

    fn fzf_key(&self) -> String {
        match self {
            CategoryMenuItem::Setting(item) => format!("setting:{}", item.spec.id),
            CategoryMenuItem::Apply(_) => "apply".to_string(),
            CategoryMenuItem::Back => "back".to_string(),
        }
    }
}

/// on/off choice offered when editing a toggle.
#[derive(Clone)]
pub struct ToggleOption {
    pub value: bool,
}

impl FzfSelectable for ToggleOption {
    fn fzf_display_text(&self) -> String {
        format_value(&SettingValue::Bool(self.value))
    }

    fn fzf_key(&self) -> String {
        if self.value { "on" } else { "off" }.to_string()
    }
}
