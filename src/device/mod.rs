//! External collaborators
//!
//! Everything that actually touches the device lives behind the
//! [`DeviceBackend`] trait: the service manager, the boot config file,
//! the hostname and the reboot mechanism. The settings layer only ever
//! sees this seam, which keeps the pipeline testable without a device.

pub mod boot_config;
pub mod hostname;
pub mod systemd;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use sudo::RunningAs;

use crate::settings::error::LoadError;
use crate::settings::value::SettingValue;
use crate::ui::prelude::*;

use boot_config::BootConfigFile;

/// Services and buses toggled through the Services menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceToggle {
    Ssh,
    Vnc,
    I2c,
    Camera,
}

impl ServiceToggle {
    /// systemd unit backing the toggle; bus toggles have none and are
    /// realized through the boot config instead.
    pub fn unit(&self) -> Option<&'static str> {
        match self {
            ServiceToggle::Ssh => Some("ssh"),
            ServiceToggle::Vnc => Some("x11vnc"),
            ServiceToggle::I2c | ServiceToggle::Camera => None,
        }
    }
}

/// Boot-time display driver parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayField {
    Rotation,
    SpiSpeedMhz,
    FrameRate,
}

#[derive(Debug, Clone, Copy)]
pub struct DisplayParam {
    pub field: DisplayField,
    pub value: i64,
}

/// Current values read from the device at startup. May be partial: ids
/// that could not be read are simply absent and fall back to defaults in
/// the store.
#[derive(Debug, Default)]
pub struct DeviceSnapshot {
    pub values: BTreeMap<&'static str, SettingValue>,
}

pub trait DeviceBackend {
    /// Read the current values for every setting the device knows about.
    fn snapshot(&self) -> Result<DeviceSnapshot, LoadError>;

    /// Enable/disable a service or bus. For daemon-backed services this
    /// takes effect immediately; bus toggles only after a restart.
    fn set_service_state(&self, service: ServiceToggle, on: bool) -> Result<()>;

    /// Persist a display driver parameter into the boot configuration.
    /// Takes effect after a restart.
    fn set_display_param(&self, param: DisplayParam) -> Result<()>;

    fn set_hostname(&self, name: &str) -> Result<()>;

    /// Restart the device. Irreversible; on success the process ends.
    fn reboot(&self) -> Result<()>;
}

/// The real device.
pub struct SystemDevice {
    boot_config: BootConfigFile,
    hostname_path: PathBuf,
    privileged: bool,
}

impl SystemDevice {
    pub fn new() -> Self {
        Self {
            boot_config: BootConfigFile::new("/boot/config.txt"),
            hostname_path: PathBuf::from("/etc/hostname"),
            privileged: matches!(sudo::check(), RunningAs::Root),
        }
    }
}

impl Default for SystemDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceBackend for SystemDevice {
    fn snapshot(&self) -> Result<DeviceSnapshot, LoadError> {
        let mut snapshot = DeviceSnapshot::default();

        // The boot config is the backing store proper; if it cannot be
        // read at all the whole load is considered failed.
        let content = self
            .boot_config
            .read()
            .map_err(LoadError::new)?;

        if let Some(display) = boot_config::parse_display_config(&content) {
            if let Some(rotation) = display.rotation {
                snapshot
                    .values
                    .insert("display_rotation", SettingValue::Int(rotation));
            }
            if let Some(speed) = display.speed {
                snapshot
                    .values
                    .insert("spi_speed", SettingValue::Int(speed / 1_000_000));
            }
            if let Some(fps) = display.fps {
                snapshot.values.insert("frame_rate", SettingValue::Int(fps));
            }
        }
        snapshot.values.insert(
            "i2c_bus",
            SettingValue::Bool(boot_config::i2c_enabled(&content)),
        );
        snapshot.values.insert(
            "camera",
            SettingValue::Bool(boot_config::camera_enabled(&content)),
        );

        // Service and hostname reads degrade per setting instead of
        // failing the snapshot.
        for (id, service) in [("ssh_server", ServiceToggle::Ssh), ("vnc_server", ServiceToggle::Vnc)] {
            let unit = service.unit().expect("daemon services have a unit");
            match systemd::service_is_active(unit) {
                Ok(active) => {
                    snapshot.values.insert(id, SettingValue::Bool(active));
                }
                Err(err) => emit(
                    Level::Warn,
                    "device.snapshot.service",
                    &format!("Failed to read state of '{unit}': {err:#}"),
                    None,
                ),
            }
        }

        match hostname::current_hostname(&self.hostname_path) {
            Ok(name) => {
                snapshot.values.insert("hostname", SettingValue::Text(name));
            }
            Err(err) => emit(
                Level::Warn,
                "device.snapshot.hostname",
                &format!("Failed to read hostname: {err:#}"),
                None,
            ),
        }

        Ok(snapshot)
    }

    fn set_service_state(&self, service: ServiceToggle, on: bool) -> Result<()> {
        match service {
            ServiceToggle::Ssh | ServiceToggle::Vnc => {
                let unit = service.unit().ok_or_else(|| anyhow!("missing unit"))?;
                systemd::set_service_enabled(unit, on, self.privileged)
                    .with_context(|| format!("switching service '{unit}'"))
            }
            ServiceToggle::I2c => self
                .boot_config
                .update(|content| Ok(boot_config::set_i2c(content, on)))
                .context("rewriting I2C bus configuration"),
            ServiceToggle::Camera => self
                .boot_config
                .update(|content| Ok(boot_config::set_camera(content, on)))
                .context("rewriting camera configuration"),
        }
    }

    fn set_display_param(&self, param: DisplayParam) -> Result<()> {
        self.boot_config
            .update(|content| boot_config::set_display_field(content, param))
            .context("rewriting display configuration")
    }

    fn set_hostname(&self, name: &str) -> Result<()> {
        hostname::set_hostname(name, self.privileged).context("setting hostname")
    }

    fn reboot(&self) -> Result<()> {
        systemd::run_as_root(self.privileged, "reboot", &[])
    }
}
