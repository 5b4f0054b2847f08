//! Current and pending values for every setting
//!
//! The store is process-local and in-memory; the device itself is the
//! backing configuration. Current values are populated once at startup
//! from a [`DeviceSnapshot`], pending values are edited by the menu, and
//! the apply pipeline commits them back one id at a time.

use std::collections::BTreeMap;

use crate::device::DeviceSnapshot;

use super::error::ValidationError;
use super::registry::{self, SettingSpec};
use super::value::SettingValue;

#[derive(Debug, Clone)]
struct SettingEntry {
    current: SettingValue,
    pending: SettingValue,
}

/// One entry of the pending change set.
#[derive(Debug, Clone)]
pub struct PendingChange {
    pub spec: &'static SettingSpec,
    pub from: SettingValue,
    pub to: SettingValue,
}

#[derive(Debug)]
pub struct SettingsStore {
    entries: BTreeMap<&'static str, SettingEntry>,
}

impl SettingsStore {
    /// Build the store from a device snapshot. Settings the snapshot does
    /// not cover fall back to their documented defaults; the caller is
    /// responsible for warning the operator when that happens.
    pub fn from_snapshot(snapshot: &DeviceSnapshot) -> Self {
        let entries = registry::SETTINGS
            .iter()
            .map(|spec| {
                let current = snapshot
                    .values
                    .get(spec.id)
                    .cloned()
                    .unwrap_or_else(|| spec.default.to_value());
                (
                    spec.id,
                    SettingEntry {
                        pending: current.clone(),
                        current,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Every setting at its documented default. Used when the device
    /// configuration is unreadable at startup.
    pub fn from_defaults() -> Self {
        Self::from_snapshot(&DeviceSnapshot::default())
    }

    pub fn current(&self, id: &str) -> Option<&SettingValue> {
        self.entries.get(id).map(|entry| &entry.current)
    }

    pub fn pending(&self, id: &str) -> Option<&SettingValue> {
        self.entries.get(id).map(|entry| &entry.pending)
    }

    /// Stage a new value for one setting. Values outside the declared
    /// domain are rejected before anything is stored; the current value
    /// is never touched.
    pub fn set_pending(&mut self, id: &str, value: SettingValue) -> Result<(), ValidationError> {
        let spec = registry::setting_by_id(id)
            .ok_or_else(|| ValidationError::new(id, "unknown setting"))?;
        spec.domain.validate(spec.id, &value)?;
        if let Some(entry) = self.entries.get_mut(spec.id) {
            entry.pending = value;
        }
        Ok(())
    }

    /// Discard the pending edit for exactly one setting.
    pub fn reset_pending(&mut self, id: &str) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.pending = entry.current.clone();
        }
    }

    /// Make the pending value current for exactly one setting. Called by
    /// the apply pipeline after the external mechanism succeeded, so a
    /// partial failure leaves every other current value accurate.
    pub fn commit(&mut self, id: &str) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.current = entry.pending.clone();
        }
    }

    /// The pending change set: settings whose pending value differs from
    /// the current one, in registry (display and apply) order. Recomputed
    /// on every call, never stored.
    pub fn diff(&self) -> Vec<PendingChange> {
        registry::SETTINGS
            .iter()
            .filter_map(|spec| {
                let entry = self.entries.get(spec.id)?;
                if entry.pending != entry.current {
                    Some(PendingChange {
                        spec,
                        from: entry.current.clone(),
                        to: entry.pending.clone(),
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}
