//! INI parsing logic for converting `Ini` → `ConfigFile`.

use ini::Ini;

use super::file::{ConfigFile, ConfigFileError};
use crate::coord::MAX_ZOOM;

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_positive<T>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value.trim().parse::<T>() {
        Ok(v) if v > T::default() => Ok(v),
        _ => Err(invalid(section, key, value, reason)),
    }
}

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [server] section
    if let Some(section) = ini.section(Some("server")) {
        if let Some(v) = section.get("url") {
            let v = v.trim();
            if !v.starts_with("http://") && !v.starts_with("https://") {
                return Err(invalid(
                    "server",
                    "url",
                    v,
                    "must start with http:// or https://",
                ));
            }
            config.server.url = v.to_string();
        }
    }

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("parallel") {
            config.download.parallel =
                parse_positive("download", "parallel", v, "must be a positive integer")?;
        }
        if let Some(v) = section.get("timeout") {
            config.download.timeout = parse_positive(
                "download",
                "timeout",
                v,
                "must be a positive integer (seconds)",
            )?;
        }
        if let Some(v) = section.get("poll_interval") {
            config.download.poll_interval = parse_positive(
                "download",
                "poll_interval",
                v,
                "must be a positive integer (seconds)",
            )?;
        }
    }

    // [output] section
    if let Some(section) = ini.section(Some("output")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.output.directory = v.to_string();
            }
        }
        if let Some(v) = section.get("zoom") {
            let zoom = v
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|z| *z <= MAX_ZOOM)
                .ok_or_else(|| invalid("output", "zoom", v, "must be an integer from 0 to 22"))?;
            config.output.zoom = Some(zoom);
        }
        if let Some(v) = section.get("source") {
            let v = v.trim();
            if !v.is_empty() {
                config.output.source = v.to_string();
            }
        }
    }

    Ok(config)
}
