//! systemd service control

use anyhow::{Context, Result};
use duct::cmd;

/// Whether the unit is currently running.
pub fn service_is_active(unit: &str) -> Result<bool> {
    let output = cmd("systemctl", ["is-active", unit])
        .stdout_capture()
        .stderr_capture()
        .unchecked()
        .run()
        .with_context(|| format!("querying state of '{unit}'"))?;
    Ok(output.status.success())
}

/// Enable and start, or disable and stop, a unit. Escalates through sudo
/// when the process is not already running as root.
pub fn set_service_enabled(unit: &str, on: bool, privileged: bool) -> Result<()> {
    let action = if on { "enable" } else { "disable" };
    run_as_root(privileged, "systemctl", &[action, "--now", unit])
}

pub fn run_as_root(privileged: bool, program: &str, args: &[&str]) -> Result<()> {
    let expression = if privileged {
        cmd(program, args)
    } else {
        let mut sudo_args = vec![program];
        sudo_args.extend_from_slice(args);
        cmd("/usr/bin/sudo", sudo_args)
    };
    expression
        .run()
        .with_context(|| format!("running {program} {}", args.join(" ")))?;
    Ok(())
}
