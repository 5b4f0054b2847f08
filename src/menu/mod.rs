//! Interactive menu controller
//!
//! One explicit state machine drives the whole session. The controller
//! blocks on operator input between transitions; the only long-running
//! state is `ApplyInProgress`, during which no input is accepted.

mod items;

pub use items::format_value;

use anyhow::{Result, bail};
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use dialoguer::{Confirm, Input};

use crate::common::progress;
use crate::device::DeviceBackend;
use crate::i18n::tr;
use crate::menu_utils::{FzfResult, FzfWrapper};
use crate::settings::apply::{self, PerSettingResult};
use crate::settings::error::RebootError;
use crate::settings::reboot::{self, RebootDecision};
use crate::settings::registry::{self, Category, SettingSpec};
use crate::settings::store::SettingsStore;
use crate::settings::value::{SettingValue, ValueDomain};
use crate::ui::{self, prelude::*};

use items::{CategoryMenuItem, MainMenuItem, SettingItem, ToggleOption};

enum MenuState {
    Welcome,
    MainMenu,
    CategoryMenu(Category),
    EditingSetting {
        spec: &'static SettingSpec,
        back: Category,
    },
    ConfirmApply,
    ApplyInProgress,
    RebootPrompt(Vec<&'static str>),
    RebootConfirm,
    Exit,
}

pub struct MenuController<'a> {
    store: SettingsStore,
    device: &'a dyn DeviceBackend,
}

impl<'a> MenuController<'a> {
    pub fn new(store: SettingsStore, device: &'a dyn DeviceBackend) -> Self {
        Self { store, device }
    }

    pub fn run(mut self) -> Result<()> {
        let mut state = MenuState::Welcome;
        loop {
            state = match state {
                MenuState::Welcome => {
                    emit(Level::Info, "menu.welcome", &tr("welcome.title"), None);
                    emit(Level::Info, "menu.welcome.hint", &tr("welcome.choose"), None);
                    separator();
                    MenuState::MainMenu
                }
                MenuState::MainMenu => self.main_menu()?,
                MenuState::CategoryMenu(category) => self.category_menu(category)?,
                MenuState::EditingSetting { spec, back } => {
                    self.edit_setting(spec)?;
                    MenuState::CategoryMenu(back)
                }
                MenuState::ConfirmApply => self.confirm_apply()?,
                MenuState::ApplyInProgress => self.run_apply()?,
                MenuState::RebootPrompt(ids) => {
                    self.show_reboot_notice(&ids);
                    MenuState::RebootConfirm
                }
                MenuState::RebootConfirm => self.reboot_confirm()?,
                MenuState::Exit => break,
            };
        }
        Ok(())
    }

    fn main_menu(&mut self) -> Result<MenuState> {
        let pending = self.store.diff().len();
        let mut menu_items = Vec::with_capacity(Category::all().len() + 2);
        for &category in Category::all() {
            menu_items.push(MainMenuItem::Category(category));
        }
        menu_items.push(MainMenuItem::Apply(pending));
        menu_items.push(MainMenuItem::Exit);

        match FzfWrapper::builder()
            .header(tr("welcome.choose"))
            .select(menu_items)?
        {
            FzfResult::Selected(MainMenuItem::Category(category)) => {
                Ok(MenuState::CategoryMenu(category))
            }
            FzfResult::Selected(MainMenuItem::Apply(_)) => Ok(MenuState::ConfirmApply),
            FzfResult::Selected(MainMenuItem::Exit) | FzfResult::Cancelled => Ok(MenuState::Exit),
            FzfResult::Error(err) => bail!("menu selection failed: {err}"),
        }
    }

    fn category_menu(&mut self, category: Category) -> Result<MenuState> {
        let pending = self.store.diff().len();
        let settings = registry::settings_in_category(category);
        let mut menu_items: Vec<CategoryMenuItem> = settings
            .into_iter()
            .map(|spec| CategoryMenuItem::Setting(SettingItem::new(spec, &self.store)))
            .collect();
        menu_items.push(CategoryMenuItem::Apply(pending));
        menu_items.push(CategoryMenuItem::Back);

        let header = match category {
            // The services' state survives a shutdown; say so, like the
            // note under the original checkboxes.
            Category::Services => {
                format!("{}\n{}", tr(category.title_key()), tr("services.persistent_note"))
            }
            _ => tr(category.title_key()),
        };

        match FzfWrapper::builder().header(header).select(menu_items)? {
            FzfResult::Selected(CategoryMenuItem::Setting(item)) => Ok(MenuState::EditingSetting {
                spec: item.spec,
                back: category,
            }),
            FzfResult::Selected(CategoryMenuItem::Apply(_)) => Ok(MenuState::ConfirmApply),
            FzfResult::Selected(CategoryMenuItem::Back) | FzfResult::Cancelled => {
                Ok(MenuState::MainMenu)
            }
            FzfResult::Error(err) => bail!("menu selection failed: {err}"),
        }
    }

    /// Edit one setting. Cancelling discards the pending edit for this id
    /// only; validation failures re-prompt and never leave the menu.
    fn edit_setting(&mut self, spec: &'static SettingSpec) -> Result<()> {
        match spec.domain {
            ValueDomain::Toggle => self.edit_toggle(spec),
            ValueDomain::OneOf(options) => self.edit_choice(spec, options),
            ValueDomain::IntRange { .. } => self.edit_number(spec),
            ValueDomain::Hostname => self.edit_text(spec),
        }
    }

    fn edit_toggle(&mut self, spec: &'static SettingSpec) -> Result<()> {
        let options = vec![ToggleOption { value: true }, ToggleOption { value: false }];
        match FzfWrapper::builder()
            .prompt(tr(spec.title_key))
            .select(options)?
        {
            FzfResult::Selected(option) => {
                self.stage(spec, SettingValue::Bool(option.value));
            }
            FzfResult::Cancelled => self.store.reset_pending(spec.id),
            FzfResult::Error(err) => bail!("menu selection failed: {err}"),
        }
        Ok(())
    }

    fn edit_choice(&mut self, spec: &'static SettingSpec, options: &'static [i64]) -> Result<()> {
        let choices: Vec<String> = options.iter().map(|v| v.to_string()).collect();
        match FzfWrapper::builder()
            .prompt(tr(spec.title_key))
            .select(choices)?
        {
            FzfResult::Selected(choice) => {
                // The list only offers in-domain values
                let value = choice.parse::<i64>().unwrap_or(options[0]);
                self.stage(spec, SettingValue::Int(value));
            }
            FzfResult::Cancelled => self.store.reset_pending(spec.id),
            FzfResult::Error(err) => bail!("menu selection failed: {err}"),
        }
        Ok(())
    }

    fn edit_number(&mut self, spec: &'static SettingSpec) -> Result<()> {
        loop {
            let raw: String = Input::new()
                .with_prompt(format!(
                    "{} ({}, {})",
                    tr(spec.title_key),
                    tr("edit.prompt_value"),
                    spec.domain.describe()
                ))
                .allow_empty(true)
                .interact_text()?;
            let raw = raw.trim();
            if raw.is_empty() {
                self.store.reset_pending(spec.id);
                return Ok(());
            }
            let value = match raw.parse::<i64>() {
                Ok(value) => SettingValue::Int(value),
                Err(_) => {
                    emit(Level::Warn, "menu.edit.invalid", &tr("edit.invalid_value"), None);
                    continue;
                }
            };
            if self.try_stage(spec, value) {
                return Ok(());
            }
        }
    }

    fn edit_text(&mut self, spec: &'static SettingSpec) -> Result<()> {
        let initial = self
            .store
            .pending(spec.id)
            .and_then(|value| value.as_text().map(String::from))
            .unwrap_or_default();
        loop {
            let raw: String = Input::new()
                .with_prompt(tr("edit.prompt_hostname"))
                .with_initial_text(initial.clone())
                .allow_empty(true)
                .interact_text()?;
            let raw = raw.trim().to_string();
            if raw.is_empty() {
                self.store.reset_pending(spec.id);
                return Ok(());
            }
            if self.try_stage(spec, SettingValue::Text(raw)) {
                return Ok(());
            }
        }
    }

    fn stage(&mut self, spec: &'static SettingSpec, value: SettingValue) {
        self.try_stage(spec, value);
    }

    /// Returns false when the value was rejected, so the caller can
    /// re-prompt the same field.
    fn try_stage(&mut self, spec: &'static SettingSpec, value: SettingValue) -> bool {
        match self.store.set_pending(spec.id, value) {
            Ok(()) => true,
            Err(err) => {
                emit(
                    Level::Warn,
                    "menu.edit.invalid",
                    &format!("{} ({err})", tr("edit.invalid_value")),
                    None,
                );
                false
            }
        }
    }

    fn confirm_apply(&mut self) -> Result<MenuState> {
        let diff = self.store.diff();
        if diff.is_empty() {
            emit(Level::Info, "apply.none", &tr("apply.none"), None);
            return Ok(MenuState::MainMenu);
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(vec![
            tr("status.setting"),
            tr("status.current"),
            tr("status.pending"),
        ]);
        for change in &diff {
            table.add_row(vec![
                tr(change.spec.title_key),
                format_value(&change.from),
                format_value(&change.to),
            ]);
        }
        println!("{table}");

        if let RebootDecision::RebootRecommended { ids } = reboot::evaluate(&diff) {
            emit(
                Level::Warn,
                "apply.reboot_needed",
                &format!(
                    "{} {}",
                    tr("reboot.pending_after_apply"),
                    titles_for(&ids).join(", ")
                ),
                None,
            );
        }

        let confirmed = Confirm::new()
            .with_prompt(tr("apply.confirm"))
            .default(true)
            .interact()?;
        Ok(if confirmed {
            MenuState::ApplyInProgress
        } else {
            MenuState::MainMenu
        })
    }

    fn run_apply(&mut self) -> Result<MenuState> {
        let diff = self.store.diff();
        let spinner = progress::create_spinner(tr("apply.in_progress"));
        let results = apply::apply(&mut self.store, self.device, &diff);
        progress::finish_spinner(spinner);

        self.print_summary(&results);

        let reboot_ids = apply::succeeded_reboot_ids(&results);
        Ok(if reboot_ids.is_empty() {
            MenuState::MainMenu
        } else {
            MenuState::RebootPrompt(reboot_ids)
        })
    }

    fn print_summary(&self, results: &[PerSettingResult]) {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec![tr("status.setting"), tr("status.result")]);
        for result in results {
            let spec = registry::setting_by_id(result.id);
            let title = spec.map(|s| tr(s.title_key)).unwrap_or_else(|| result.id.to_string());
            let outcome = match &result.outcome {
                Ok(()) => format!("{} {}", ui::GLYPH_OK, tr("apply.ok")),
                Err(err) => format!("{} {}: {:#}", ui::GLYPH_FAIL, tr("apply.failed"), err.cause),
            };
            table.add_row(vec![title, outcome]);
        }
        emit(Level::Info, "apply.summary", &tr("apply.summary"), None);
        println!("{table}");
    }

    fn show_reboot_notice(&self, ids: &[&'static str]) {
        emit(
            Level::Warn,
            "reboot.recommended",
            &format!("{} ({})", tr("reboot.recommended"), titles_for(ids).join(", ")),
            None,
        );
    }

    fn reboot_confirm(&mut self) -> Result<MenuState> {
        let confirmed = Confirm::new()
            .with_prompt(tr("reboot.confirm"))
            .default(false)
            .interact()?;
        if !confirmed {
            return Ok(MenuState::MainMenu);
        }
        if let Err(cause) = self.device.reboot() {
            emit(Level::Error, "reboot.failed", &tr("reboot.failed"), None);
            return Err(RebootError { cause }.into());
        }
        Ok(MenuState::Exit)
    }
}

fn titles_for(ids: &[&'static str]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| registry::setting_by_id(id))
        .map(|spec| tr(spec.title_key))
        .collect()
}
