//! Message catalogue lookup
//!
//! Labels are kept in TOML catalogues embedded at build time: an English
//! base table plus per-language overlays. The merged table for the active
//! locale is built once at startup and read-only afterwards. Missing keys
//! fall back to English and then to the key itself.

use std::collections::HashMap;
use std::sync::OnceLock;

use anyhow::{Context, Result};

const CATALOG_EN: &str = include_str!("../catalogs/en.toml");
const CATALOG_DE: &str = include_str!("../catalogs/de.toml");

static CATALOGUE: OnceLock<HashMap<String, String>> = OnceLock::new();

fn parse_catalog(raw: &str) -> Result<HashMap<String, String>> {
    let table: HashMap<String, String> =
        toml::from_str(raw).context("parsing embedded message catalogue")?;
    Ok(table)
}

fn normalize_lang(lang: &str) -> &'static str {
    let lower = lang.trim().to_ascii_lowercase();
    let tag = lower.split(['-', '_', '.']).next().unwrap_or("");
    match tag {
        "de" => "de",
        _ => "en",
    }
}

fn build_table(lang: &str) -> Result<HashMap<String, String>> {
    let mut table = parse_catalog(CATALOG_EN)?;
    if normalize_lang(lang) == "de" {
        for (key, value) in parse_catalog(CATALOG_DE)? {
            table.insert(key, value);
        }
    }
    Ok(table)
}

/// Initialize the catalogue from the process locale. Only the first call wins.
pub fn init() -> Result<()> {
    let lang = std::env::var("LANG").unwrap_or_default();
    let table = build_table(&lang)?;
    let _ = CATALOGUE.set(table);
    Ok(())
}

/// Look up a message by key. Falls back to the key itself so a missing
/// entry stays visible instead of crashing the menu.
pub fn tr(key: &str) -> String {
    CATALOGUE
        .get()
        .and_then(|table| table.get(key))
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_catalog_parses() {
        let table = parse_catalog(CATALOG_EN).unwrap();
        assert_eq!(
            table.get("reboot.recommended").map(String::as_str),
            Some("It's recommended to restart the device.")
        );
    }

    #[test]
    fn german_overlay_wins_but_falls_back() {
        let table = build_table("de_DE.UTF-8").unwrap();
        assert_eq!(
            table.get("category.services").map(String::as_str),
            Some("Dienste")
        );
        // "Rotation" is identical in both languages and only present in the base
        assert_eq!(
            table.get("setting.display_rotation").map(String::as_str),
            Some("Rotation")
        );
    }

    #[test]
    fn unknown_locale_uses_english() {
        let table = build_table("fr_FR").unwrap();
        assert_eq!(
            table.get("category.services").map(String::as_str),
            Some("Services")
        );
    }
}
