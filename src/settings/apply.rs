//! Apply pipeline
//!
//! Walks the pending change set in registry order (service toggles before
//! boot-config rewrites), invokes the external mechanism for each setting
//! and commits successes one id at a time. A failure is recorded and
//! skipped over; it never aborts the remaining settings, and the failed
//! setting stays pending so the operator can retry or abandon just that
//! item.

use crate::device::{DeviceBackend, DisplayParam};

use super::error::ApplyError;
use super::registry::SettingKind;
use super::store::{PendingChange, SettingsStore};

#[derive(Debug)]
pub struct PerSettingResult {
    pub id: &'static str,
    pub requires_reboot: bool,
    pub outcome: Result<(), ApplyError>,
}

impl PerSettingResult {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

pub fn apply(
    store: &mut SettingsStore,
    device: &dyn DeviceBackend,
    changes: &[PendingChange],
) -> Vec<PerSettingResult> {
    let mut results = Vec::with_capacity(changes.len());

    for change in changes {
        let outcome = realize(device, change).map_err(|cause| ApplyError {
            id: change.spec.id,
            cause,
        });
        if outcome.is_ok() {
            store.commit(change.spec.id);
        }
        results.push(PerSettingResult {
            id: change.spec.id,
            requires_reboot: change.spec.requires_reboot,
            outcome,
        });
    }

    results
}

fn realize(device: &dyn DeviceBackend, change: &PendingChange) -> anyhow::Result<()> {
    match change.spec.kind {
        SettingKind::Service(service) => {
            let on = change
                .to
                .as_bool()
                .ok_or_else(|| anyhow::anyhow!("service toggle expects on/off"))?;
            device.set_service_state(service, on)
        }
        SettingKind::Display(field) => {
            let value = change
                .to
                .as_int()
                .ok_or_else(|| anyhow::anyhow!("display parameter expects a number"))?;
            device.set_display_param(DisplayParam { field, value })
        }
        SettingKind::Hostname => {
            let name = change
                .to
                .as_text()
                .ok_or_else(|| anyhow::anyhow!("hostname expects text"))?;
            device.set_hostname(name)
        }
    }
}

/// Ids of successfully applied settings that only take effect after a
/// restart. The menu feeds this into the reboot prompt.
pub fn succeeded_reboot_ids(results: &[PerSettingResult]) -> Vec<&'static str> {
    results
        .iter()
        .filter(|result| result.succeeded() && result.requires_reboot)
        .map(|result| result.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    use anyhow::{Result, bail};

    use crate::device::{DeviceSnapshot, DisplayField, ServiceToggle};
    use crate::settings::error::LoadError;
    use crate::settings::reboot::{self, RebootDecision};
    use crate::settings::value::SettingValue;

    use super::*;

    #[derive(Debug, PartialEq)]
    enum Call {
        Service(ServiceToggle, bool),
        Display(DisplayField, i64),
        Hostname(String),
        Reboot,
    }

    #[derive(Default)]
    struct MockDevice {
        calls: RefCell<Vec<Call>>,
        failing_services: Vec<ServiceToggle>,
        snapshot_values: BTreeMap<&'static str, SettingValue>,
    }

    impl DeviceBackend for MockDevice {
        fn snapshot(&self) -> Result<DeviceSnapshot, LoadError> {
            Ok(DeviceSnapshot {
                values: self.snapshot_values.clone(),
            })
        }

        fn set_service_state(&self, service: ServiceToggle, on: bool) -> Result<()> {
            self.calls.borrow_mut().push(Call::Service(service, on));
            if self.failing_services.contains(&service) {
                bail!("unit not found");
            }
            Ok(())
        }

        fn set_display_param(&self, param: DisplayParam) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(Call::Display(param.field, param.value));
            Ok(())
        }

        fn set_hostname(&self, name: &str) -> Result<()> {
            self.calls.borrow_mut().push(Call::Hostname(name.to_string()));
            Ok(())
        }

        fn reboot(&self) -> Result<()> {
            self.calls.borrow_mut().push(Call::Reboot);
            Ok(())
        }
    }

    #[test]
    fn ssh_and_rotation_apply_with_specific_reboot_advice() {
        let device = MockDevice::default();
        let mut store = SettingsStore::from_defaults();
        store
            .set_pending("ssh_server", SettingValue::Bool(true))
            .unwrap();
        store
            .set_pending("display_rotation", SettingValue::Int(180))
            .unwrap();

        let diff = store.diff();
        assert_eq!(
            reboot::evaluate(&diff),
            RebootDecision::RebootRecommended {
                ids: vec!["display_rotation"]
            }
        );

        let results = apply(&mut store, &device, &diff);
        assert!(results.iter().all(PerSettingResult::succeeded));
        assert_eq!(
            *device.calls.borrow(),
            vec![
                Call::Service(ServiceToggle::Ssh, true),
                Call::Display(DisplayField::Rotation, 180),
            ]
        );
        // SSH is in effect immediately, rotation staged until restart
        assert_eq!(store.current("ssh_server"), Some(&SettingValue::Bool(true)));
        assert_eq!(succeeded_reboot_ids(&results), vec!["display_rotation"]);
        assert!(store.diff().is_empty());
    }

    #[test]
    fn failure_is_isolated_and_stays_pending() {
        let device = MockDevice {
            failing_services: vec![ServiceToggle::Vnc],
            ..MockDevice::default()
        };
        let mut store = SettingsStore::from_defaults();
        store
            .set_pending("ssh_server", SettingValue::Bool(true))
            .unwrap();
        store
            .set_pending("vnc_server", SettingValue::Bool(true))
            .unwrap();

        let diff = store.diff();
        let results = apply(&mut store, &device, &diff);

        // Both external calls were attempted
        assert_eq!(device.calls.borrow().len(), 2);
        assert!(results[0].succeeded());
        assert!(!results[1].succeeded());

        // The success is durable, the failure is retryable
        assert_eq!(store.current("ssh_server"), Some(&SettingValue::Bool(true)));
        assert_eq!(store.current("vnc_server"), Some(&SettingValue::Bool(false)));
        let ids: Vec<&str> = store.diff().iter().map(|c| c.spec.id).collect();
        assert_eq!(ids, vec!["vnc_server"]);
    }

    #[test]
    fn retrying_the_failed_subset_leaves_successes_alone() {
        let mut device = MockDevice {
            failing_services: vec![ServiceToggle::Vnc],
            ..MockDevice::default()
        };
        let mut store = SettingsStore::from_defaults();
        store
            .set_pending("ssh_server", SettingValue::Bool(true))
            .unwrap();
        store
            .set_pending("vnc_server", SettingValue::Bool(true))
            .unwrap();
        let diff = store.diff();
        apply(&mut store, &device, &diff);

        // Second round: only the failed setting is left in the diff
        device.failing_services.clear();
        device.calls.borrow_mut().clear();
        let retry_diff = store.diff();
        let results = apply(&mut store, &device, &retry_diff);

        assert_eq!(
            *device.calls.borrow(),
            vec![Call::Service(ServiceToggle::Vnc, true)]
        );
        assert!(results.iter().all(PerSettingResult::succeeded));
        assert!(store.diff().is_empty());
    }

    #[test]
    fn hostname_goes_through_the_hostname_collaborator() {
        let device = MockDevice::default();
        let mut store = SettingsStore::from_defaults();
        store
            .set_pending("hostname", SettingValue::Text("tx-pi".to_string()))
            .unwrap();

        let diff = store.diff();
        let results = apply(&mut store, &device, &diff);
        assert_eq!(
            *device.calls.borrow(),
            vec![Call::Hostname("tx-pi".to_string())]
        );
        assert_eq!(succeeded_reboot_ids(&results), vec!["hostname"]);
    }

    #[test]
    fn spi_speed_out_of_range_never_reaches_the_device() {
        let device = MockDevice::default();
        let mut store = SettingsStore::from_defaults();
        assert!(
            store
                .set_pending("spi_speed", SettingValue::Int(1000))
                .is_err()
        );
        let diff = store.diff();
        let results = apply(&mut store, &device, &diff);
        assert!(results.is_empty());
        assert!(device.calls.borrow().is_empty());
    }

    #[test]
    fn mixed_outcome_reboot_prompt_only_counts_successes() {
        // I2C (reboot-impacting) fails, rotation (reboot-impacting) succeeds
        let device = MockDevice {
            failing_services: vec![ServiceToggle::I2c],
            ..MockDevice::default()
        };
        let mut store = SettingsStore::from_defaults();
        store
            .set_pending("i2c_bus", SettingValue::Bool(true))
            .unwrap();
        store
            .set_pending("display_rotation", SettingValue::Int(270))
            .unwrap();

        let diff = store.diff();
        let results = apply(&mut store, &device, &diff);
        assert_eq!(succeeded_reboot_ids(&results), vec!["display_rotation"]);
    }
}
