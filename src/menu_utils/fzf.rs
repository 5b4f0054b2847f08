//! FZF wrapper for menu selection
//!
//! Thin wrapper around the external `fzf` binary. Menu items implement
//! [`FzfSelectable`]; the selected line is mapped back to the item through
//! its key.
//!
//! All invocations clear `FZF_DEFAULT_OPTS` to avoid conflicts with
//! user/system-wide settings that may contain unsupported options.

use std::collections::HashMap;
use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

/// Trait for types that can be displayed in FZF selection menus.
pub trait FzfSelectable {
    /// Text shown in the FZF selection list.
    fn fzf_display_text(&self) -> String;

    /// Unique key for identifying this item (defaults to display text).
    fn fzf_key(&self) -> String {
        self.fzf_display_text()
    }
}

impl FzfSelectable for String {
    fn fzf_display_text(&self) -> String {
        self.clone()
    }
}

impl FzfSelectable for &str {
    fn fzf_display_text(&self) -> String {
        self.to_string()
    }
}

/// Result type for FZF operations
#[derive(Debug, PartialEq)]
pub enum FzfResult<T> {
    Selected(T),
    Cancelled,
    Error(String),
}

pub struct FzfWrapper {
    prompt: Option<String>,
    header: Option<String>,
}

impl FzfWrapper {
    pub fn builder() -> FzfBuilder {
        FzfBuilder::default()
    }

    pub fn select<T: FzfSelectable + Clone>(&self, items: Vec<T>) -> Result<FzfResult<T>> {
        if items.is_empty() {
            return Ok(FzfResult::Cancelled);
        }

        let mut item_map: HashMap<String, T> = HashMap::new();
        let mut lines = Vec::with_capacity(items.len());
        for item in &items {
            // Prefix the key so duplicate display texts stay distinguishable;
            // --with-nth hides it from the list.
            let line = format!("{}\t{}", item.fzf_key(), item.fzf_display_text());
            item_map.insert(item.fzf_key(), item.clone());
            lines.push(line);
        }

        let mut args = vec![
            "--tiebreak=index".to_string(),
            "--delimiter=\t".to_string(),
            "--with-nth=2..".to_string(),
            "--no-sort".to_string(),
            "--layout=reverse".to_string(),
        ];
        if let Some(prompt) = &self.prompt {
            args.push("--prompt".to_string());
            args.push(format!("{} > ", prompt));
        }
        if let Some(header) = &self.header {
            args.push("--header".to_string());
            args.push(format!("\n{}\n ", header));
        }

        let mut child = Command::new("fzf")
            .args(&args)
            .env_remove("FZF_DEFAULT_OPTS")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("launching fzf (is it installed?)")?;

        {
            let stdin = child
                .stdin
                .as_mut()
                .context("opening fzf stdin")?;
            stdin.write_all(lines.join("\n").as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if let Some(code) = output.status.code()
            && (code == 130 || code == 143)
        {
            return Ok(FzfResult::Cancelled);
        }

        if !output.status.success() && crate::ui::is_debug_enabled() {
            crate::ui::emit(
                crate::ui::Level::Debug,
                "fzf.execution_failed",
                &format!(
                    "fzf exited with {:?}: {}",
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
                None,
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let selected = stdout.trim_end();
        if selected.is_empty() {
            return Ok(FzfResult::Cancelled);
        }

        let key = selected.split('\t').next().unwrap_or(selected);
        match item_map.remove(key) {
            Some(item) => Ok(FzfResult::Selected(item)),
            None => Ok(FzfResult::Error(format!(
                "fzf returned an unknown selection: {selected}"
            ))),
        }
    }
}

#[derive(Default)]
pub struct FzfBuilder {
    prompt: Option<String>,
    header: Option<String>,
}

impl FzfBuilder {
    pub fn prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn header<S: Into<String>>(mut self, header: S) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn build(self) -> FzfWrapper {
        FzfWrapper {
            prompt: self.prompt,
            header: self.header,
        }
    }

    pub fn select<T: FzfSelectable + Clone>(self, items: Vec<T>) -> Result<FzfResult<T>> {
        self.build().select(items)
    }
}
