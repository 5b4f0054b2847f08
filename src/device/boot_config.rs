//! Boot configuration file access
//!
//! The display driver, the I2C bus and the camera are configured through
//! lines in the firmware boot config (`/boot/config.txt`):
//!
//! ```text
//! dtoverlay=waveshare35a:rotate=180,speed=40000000,fps=50
//! dtparam=i2c_arm=on
//! start_x=1
//! ```
//!
//! The SPI speed is stored in Hz here but presented in MHz everywhere
//! else. Rewrites go through a temp file in the same directory so a
//! failed write never truncates the real config.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use lazy_static::lazy_static;
use regex::Regex;
use tempfile::NamedTempFile;

use super::{DisplayField, DisplayParam};

lazy_static! {
    static ref DISPLAY_PATTERN: Regex = Regex::new(
        r"(?m)^dtoverlay=(waveshare[^:\n]+):?(?:,?(?:rotate=([0-9]+))|,?(?:speed=([0-9]+))|,?(?:fps=([0-9]+)))*$"
    )
    .expect("display pattern");
    static ref I2C_PATTERN: Regex = Regex::new(
        r"^(device_tree_param|dtparam)=([^,]*,)*i2c(_arm)?(=(on|true|yes|1))?(,.*)?$"
    )
    .expect("i2c pattern");
}

/// Display driver parameters as found in the boot config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    pub driver: String,
    pub rotation: Option<i64>,
    /// In Hz, as stored in the file
    pub speed: Option<i64>,
    pub fps: Option<i64>,
}

impl DisplayConfig {
    fn to_line(&self) -> String {
        let mut params = Vec::new();
        if let Some(rotation) = self.rotation {
            params.push(format!("rotate={rotation}"));
        }
        if let Some(speed) = self.speed {
            params.push(format!("speed={speed}"));
        }
        if let Some(fps) = self.fps {
            params.push(format!("fps={fps}"));
        }
        if params.is_empty() {
            format!("dtoverlay={}", self.driver)
        } else {
            format!("dtoverlay={}:{}", self.driver, params.join(","))
        }
    }
}

/// Extract the display driver overlay line, if any.
pub fn parse_display_config(content: &str) -> Option<DisplayConfig> {
    let caps = DISPLAY_PATTERN.captures(content)?;
    let int_group = |idx: usize| {
        caps.get(idx)
            .and_then(|m| m.as_str().parse::<i64>().ok())
    };
    Some(DisplayConfig {
        driver: caps.get(1)?.as_str().to_string(),
        rotation: int_group(2),
        speed: int_group(3),
        fps: int_group(4),
    })
}

pub fn i2c_enabled(content: &str) -> bool {
    content.lines().any(|line| I2C_PATTERN.is_match(line))
}

pub fn camera_enabled(content: &str) -> bool {
    content.lines().any(|line| line.trim() == "start_x=1")
}

/// Rewrite one display parameter, keeping the others as they are.
/// A frame rate of 0 removes the parameter so the driver default applies.
pub fn set_display_field(content: &str, param: DisplayParam) -> Result<String> {
    let mut config = parse_display_config(content)
        .ok_or_else(|| anyhow!("no display driver overlay found in boot config"))?;
    match param.field {
        DisplayField::Rotation => config.rotation = Some(param.value),
        DisplayField::SpiSpeedMhz => config.speed = Some(param.value * 1_000_000),
        DisplayField::FrameRate => {
            config.fps = if param.value > 0 { Some(param.value) } else { None }
        }
    }
    Ok(DISPLAY_PATTERN
        .replace(content, config.to_line().as_str())
        .into_owned())
}

pub fn set_i2c(content: &str, on: bool) -> String {
    rewrite_toggle_lines(content, |line| I2C_PATTERN.is_match(line), on, "dtparam=i2c_arm=on")
}

pub fn set_camera(content: &str, on: bool) -> String {
    rewrite_toggle_lines(
        content,
        |line| line.trim_start().starts_with("start_x="),
        on,
        "start_x=1",
    )
}

fn rewrite_toggle_lines(
    content: &str,
    matches: impl Fn(&str) -> bool,
    on: bool,
    enable_line: &str,
) -> String {
    let mut lines: Vec<&str> = content.lines().filter(|line| !matches(line)).collect();
    if on {
        lines.push(enable_line);
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// The boot config on disk. The path is injectable so tests never touch
/// the real firmware config.
pub struct BootConfigFile {
    path: PathBuf,
}

impl BootConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .with_context(|| format!("reading boot config from {}", self.path.display()))
    }

    /// Read, transform and atomically write back the config.
    pub fn update(&self, transform: impl FnOnce(&str) -> Result<String>) -> Result<()> {
        let content = self.read()?;
        let updated = transform(&content)?;
        if updated == content {
            return Ok(());
        }

        let dir = self
            .path
            .parent()
            .ok_or_else(|| anyhow!("boot config path has no parent directory"))?;
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("creating temp file in {}", dir.display()))?;
        tmp.write_all(updated.as_bytes())
            .context("writing boot config")?;
        tmp.persist(&self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(s: &str) -> (String, Option<i64>, Option<i64>, Option<i64>) {
        let config = parse_display_config(s).expect("should parse");
        (config.driver, config.rotation, config.speed, config.fps)
    }

    #[test]
    fn parses_display_overlay_variants() {
        let cases: &[(&str, (&str, Option<i64>, Option<i64>, Option<i64>))] = &[
            (
                "dtoverlay=waveshare35b-v2:rotate=180\n",
                ("waveshare35b-v2", Some(180), None, None),
            ),
            ("dtoverlay=waveshare35b-v2\n", ("waveshare35b-v2", None, None, None)),
            (
                "dtoverlay=waveshare35a:rotate=180,speed=40000000\n",
                ("waveshare35a", Some(180), Some(40_000_000), None),
            ),
            (
                "dtoverlay=waveshare35a:rotate=180,speed=40000000,fps=50\n",
                ("waveshare35a", Some(180), Some(40_000_000), Some(50)),
            ),
            (
                "dtoverlay=waveshare35a:speed=40000000,fps=50\n",
                ("waveshare35a", None, Some(40_000_000), Some(50)),
            ),
            (
                "dtoverlay=waveshare35a:speed=40000000,rotate=90\n",
                ("waveshare35a", Some(90), Some(40_000_000), None),
            ),
            (
                "dtoverlay=waveshare35a:fps=24,speed=27000000,rotate=90\n",
                ("waveshare35a", Some(90), Some(27_000_000), Some(24)),
            ),
        ];
        for (input, (driver, rotation, speed, fps)) in cases {
            let (d, r, s, f) = parsed(input);
            assert_eq!(d, *driver, "{input}");
            assert_eq!(r, *rotation, "{input}");
            assert_eq!(s, *speed, "{input}");
            assert_eq!(f, *fps, "{input}");
        }
    }

    #[test]
    fn no_overlay_means_no_config() {
        assert_eq!(parse_display_config("gpu_mem=64\n"), None);
    }

    #[test]
    fn rotation_rewrite_keeps_other_params_and_lines() {
        let content = "gpu_mem=64\ndtoverlay=waveshare35a:rotate=90,speed=40000000\ndtparam=audio=on\n";
        let updated = set_display_field(
            content,
            DisplayParam {
                field: DisplayField::Rotation,
                value: 180,
            },
        )
        .unwrap();
        assert_eq!(
            updated,
            "gpu_mem=64\ndtoverlay=waveshare35a:rotate=180,speed=40000000\ndtparam=audio=on\n"
        );
    }

    #[test]
    fn spi_speed_is_written_in_hz() {
        let content = "dtoverlay=waveshare35a:rotate=90\n";
        let updated = set_display_field(
            content,
            DisplayParam {
                field: DisplayField::SpiSpeedMhz,
                value: 40,
            },
        )
        .unwrap();
        assert_eq!(updated, "dtoverlay=waveshare35a:rotate=90,speed=40000000\n");
    }

    #[test]
    fn frame_rate_zero_removes_the_parameter() {
        let content = "dtoverlay=waveshare35a:rotate=90,speed=40000000,fps=50\n";
        let updated = set_display_field(
            content,
            DisplayParam {
                field: DisplayField::FrameRate,
                value: 0,
            },
        )
        .unwrap();
        assert_eq!(updated, "dtoverlay=waveshare35a:rotate=90,speed=40000000\n");
    }

    #[test]
    fn display_rewrite_without_overlay_fails() {
        let err = set_display_field(
            "gpu_mem=64\n",
            DisplayParam {
                field: DisplayField::Rotation,
                value: 180,
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("no display driver overlay"));
    }

    #[test]
    fn detects_i2c_variants() {
        assert!(i2c_enabled("dtparam=i2c_arm=on\n"));
        assert!(i2c_enabled("device_tree_param=i2c\n"));
        assert!(i2c_enabled("dtparam=audio=on,i2c_arm=on\n"));
        assert!(!i2c_enabled("dtparam=audio=on\n"));
        assert!(!i2c_enabled("# dtparam=i2c_arm=on is disabled\n"));
    }

    #[test]
    fn i2c_toggle_roundtrip() {
        let content = "gpu_mem=64\n";
        let enabled = set_i2c(content, true);
        assert!(i2c_enabled(&enabled));
        assert!(enabled.starts_with("gpu_mem=64\n"));
        let disabled = set_i2c(&enabled, false);
        assert!(!i2c_enabled(&disabled));
        assert_eq!(disabled, "gpu_mem=64\n");
    }

    #[test]
    fn camera_toggle_roundtrip() {
        let content = "gpu_mem=128\n";
        let enabled = set_camera(content, true);
        assert!(camera_enabled(&enabled));
        let disabled = set_camera(&enabled, false);
        assert!(!camera_enabled(&disabled));
        assert_eq!(disabled, "gpu_mem=128\n");
    }

    #[test]
    fn update_rewrites_file_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.txt");
        std::fs::write(&path, "dtoverlay=waveshare35a:rotate=90\n").unwrap();

        let file = BootConfigFile::new(&path);
        file.update(|content| {
            set_display_field(
                content,
                DisplayParam {
                    field: DisplayField::Rotation,
                    value: 270,
                },
            )
        })
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "dtoverlay=waveshare35a:rotate=270\n"
        );
    }
}
