//! Reboot policy
//!
//! Pure function of the pending change set; no device access. Calling it
//! twice on the same diff yields the same decision.

use super::store::PendingChange;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebootDecision {
    NoneRequired,
    /// At least one changed setting only takes effect after a restart.
    /// Carries the exact ids so the operator-facing message can be
    /// specific.
    RebootRecommended { ids: Vec<&'static str> },
}

pub fn evaluate(changes: &[PendingChange]) -> RebootDecision {
    let ids: Vec<&'static str> = changes
        .iter()
        .filter(|change| change.spec.requires_reboot)
        .map(|change| change.spec.id)
        .collect();

    if ids.is_empty() {
        RebootDecision::NoneRequired
    } else {
        RebootDecision::RebootRecommended { ids }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::store::SettingsStore;
    use crate::settings::value::SettingValue;

    #[test]
    fn empty_diff_needs_no_reboot() {
        assert_eq!(evaluate(&[]), RebootDecision::NoneRequired);
    }

    #[test]
    fn live_toggles_need_no_reboot() {
        let mut store = SettingsStore::from_defaults();
        store
            .set_pending("ssh_server", SettingValue::Bool(true))
            .unwrap();
        store
            .set_pending("vnc_server", SettingValue::Bool(true))
            .unwrap();
        assert_eq!(evaluate(&store.diff()), RebootDecision::NoneRequired);
    }

    #[test]
    fn lists_exactly_the_reboot_impacting_ids() {
        let mut store = SettingsStore::from_defaults();
        store
            .set_pending("ssh_server", SettingValue::Bool(true))
            .unwrap();
        store
            .set_pending("display_rotation", SettingValue::Int(180))
            .unwrap();
        let decision = evaluate(&store.diff());
        assert_eq!(
            decision,
            RebootDecision::RebootRecommended {
                ids: vec!["display_rotation"]
            }
        );
    }

    #[test]
    fn evaluation_is_deterministic() {
        let mut store = SettingsStore::from_defaults();
        store
            .set_pending("i2c_bus", SettingValue::Bool(true))
            .unwrap();
        store
            .set_pending("frame_rate", SettingValue::Int(25))
            .unwrap();
        let diff = store.diff();
        assert_eq!(evaluate(&diff), evaluate(&diff));
    }
}
