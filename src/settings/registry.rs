//! Static catalogue of configurable items
//!
//! Fixed at build time, never mutated at runtime. Display order matters:
//! categories and the settings within them are listed the way the menu
//! presents them, and the apply pipeline walks changes in the same order
//! so cheap service toggles run before boot-config rewrites.

use crate::device::{DisplayField, ServiceToggle};

use super::value::{DefaultValue, ValueDomain};

/// Category identifiers for settings organization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Services,
    Display,
    Network,
}

impl Category {
    pub fn id(&self) -> &'static str {
        match self {
            Category::Services => "services",
            Category::Display => "display",
            Category::Network => "network",
        }
    }

    pub fn title_key(&self) -> &'static str {
        match self {
            Category::Services => "category.services",
            Category::Display => "category.display",
            Category::Network => "category.network",
        }
    }

    /// All categories in display order
    pub fn all() -> &'static [Category] {
        &[Category::Services, Category::Display, Category::Network]
    }
}

/// Which external mechanism realizes a change to this setting.
#[derive(Debug, Clone, Copy)]
pub enum SettingKind {
    Service(ServiceToggle),
    Display(DisplayField),
    Hostname,
}

#[derive(Debug)]
pub struct SettingSpec {
    pub id: &'static str,
    pub category: Category,
    pub title_key: &'static str,
    pub kind: SettingKind,
    pub domain: ValueDomain,
    /// Whether the effective state survives a power cycle without
    /// re-application.
    pub persistent: bool,
    /// Whether a change only takes effect after a device restart.
    pub requires_reboot: bool,
    /// Documented safe default, used when the device state cannot be read.
    pub default: DefaultValue,
}

pub const SETTINGS: &[SettingSpec] = &[
    SettingSpec {
        id: "ssh_server",
        category: Category::Services,
        title_key: "setting.ssh_server",
        kind: SettingKind::Service(ServiceToggle::Ssh),
        domain: ValueDomain::Toggle,
        persistent: true,
        requires_reboot: false,
        default: DefaultValue::Bool(false),
    },
    SettingSpec {
        id: "vnc_server",
        category: Category::Services,
        title_key: "setting.vnc_server",
        kind: SettingKind::Service(ServiceToggle::Vnc),
        domain: ValueDomain::Toggle,
        persistent: true,
        requires_reboot: false,
        default: DefaultValue::Bool(false),
    },
    SettingSpec {
        id: "i2c_bus",
        category: Category::Services,
        title_key: "setting.i2c_bus",
        kind: SettingKind::Service(ServiceToggle::I2c),
        domain: ValueDomain::Toggle,
        persistent: true,
        requires_reboot: true,
        default: DefaultValue::Bool(false),
    },
    SettingSpec {
        id: "camera",
        category: Category::Services,
        title_key: "setting.camera",
        kind: SettingKind::Service(ServiceToggle::Camera),
        domain: ValueDomain::Toggle,
        persistent: true,
        requires_reboot: true,
        default: DefaultValue::Bool(false),
    },
    SettingSpec {
        id: "display_rotation",
        category: Category::Display,
        title_key: "setting.display_rotation",
        kind: SettingKind::Display(DisplayField::Rotation),
        domain: ValueDomain::OneOf(&[0, 90, 180, 270]),
        persistent: true,
        requires_reboot: true,
        default: DefaultValue::Int(90),
    },
    SettingSpec {
        id: "spi_speed",
        category: Category::Display,
        title_key: "setting.spi_speed",
        kind: SettingKind::Display(DisplayField::SpiSpeedMhz),
        domain: ValueDomain::IntRange { min: 16, max: 125 },
        persistent: true,
        requires_reboot: true,
        default: DefaultValue::Int(16),
    },
    SettingSpec {
        id: "frame_rate",
        category: Category::Display,
        title_key: "setting.frame_rate",
        kind: SettingKind::Display(DisplayField::FrameRate),
        domain: ValueDomain::IntRange { min: 0, max: 50 },
        persistent: true,
        requires_reboot: true,
        default: DefaultValue::Int(0),
    },
    SettingSpec {
        id: "hostname",
        category: Category::Network,
        title_key: "setting.hostname",
        kind: SettingKind::Hostname,
        domain: ValueDomain::Hostname,
        persistent: true,
        requires_reboot: true,
        default: DefaultValue::Text("raspberrypi"),
    },
];

pub fn setting_by_id(id: &str) -> Option<&'static SettingSpec> {
    SETTINGS.iter().find(|setting| setting.id == id)
}

pub fn settings_in_category(category: Category) -> Vec<&'static SettingSpec> {
    SETTINGS
        .iter()
        .filter(|setting| setting.category == category)
        .collect()
}
