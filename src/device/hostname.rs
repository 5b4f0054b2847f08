//! Hostname read/write

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::systemd::run_as_root;

pub fn current_hostname(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading hostname from {}", path.display()))?;
    Ok(content.trim().to_string())
}

/// Persist the new hostname through hostnamectl, which rewrites
/// /etc/hostname for us.
pub fn set_hostname(name: &str, privileged: bool) -> Result<()> {
    run_as_root(privileged, "hostnamectl", &["set-hostname", name])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hostname");
        std::fs::write(&path, "tx-pi\n").unwrap();
        assert_eq!(current_hostname(&path).unwrap(), "tx-pi");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(current_hostname(&dir.path().join("hostname")).is_err());
    }
}
