use schemars::{Schema, schema_for};
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use toml::{Table, Value};
use tracing::{debug, trace};

use super::models::{ActionDef, ActionKind, Config, UNSAFE_PREFIX_CHARS};
use crate::error::ConfigError;

/// Load configuration from a TOML string.
///
/// The raw table is validated before it is converted into a [`Config`], so type
/// mistakes are reported against the offending field rather than as a generic
/// deserialization error.
pub fn load_from_str(s: &str) -> Result<Config, ConfigError> {
    parse(s, None)
}

/// Load configuration from a file path synchronously.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path_ref = path.as_ref();
    let text = std::fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
        path: path_ref.to_path_buf(),
        source,
    })?;
    let cfg = parse(&text, Some(path_ref))?;
    debug!(target: "tui_capture::config", "Loaded config from {}", path_ref.display());
    Ok(cfg)
}

/// Load configuration from a file path asynchronously (Tokio).
pub async fn load_from_path_async<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    use tokio::fs;
    let path_ref = path.as_ref();
    let text = fs::read_to_string(path_ref)
        .await
        .map_err(|source| ConfigError::Io {
            path: path_ref.to_path_buf(),
            source,
        })?;
    let cfg = parse(&text, Some(path_ref))?;
    debug!(target: "tui_capture::config", "Loaded config from {}", path_ref.display());
    Ok(cfg)
}

fn parse(text: &str, origin: Option<&Path>) -> Result<Config, ConfigError> {
    let parse_err = |source| ConfigError::Parse {
        path: origin.map(Path::to_path_buf),
        source,
    };
    let table: Table = toml::from_str(text).map_err(parse_err)?;
    validate_table(&table)?;
    let cfg: Config = Value::Table(table).try_into().map_err(parse_err)?;
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Generate the JSON Schema for the Config model (for editors and external tooling).
pub fn generate_schema() -> Schema {
    schema_for!(Config)
}

/// Write the JSON Schema for the Config model to any writer (pretty-printed).
pub fn write_schema_to_writer<W: Write>(mut writer: W) -> anyhow::Result<()> {
    use anyhow::Context;
    let schema = generate_schema();
    let json = serde_json::to_string_pretty(&schema).context("Failed to serialize schema")?;
    writer
        .write_all(json.as_bytes())
        .context("Failed to write schema to writer")?;
    Ok(())
}

/// Validate a raw configuration table.
///
/// Checks, in order: required `app_module` / `app_class`, `size`,
/// `capture_prefix`, `output_dir`, then every `[[step]]`. The first problem
/// found is returned.
pub fn validate_table(table: &Table) -> Result<(), ConfigError> {
    for field in ["app_module", "app_class"] {
        match table.get(field) {
            None => return Err(ConfigError::missing(field)),
            Some(value) => {
                let s = expect_str(field, value)?;
                if s.trim().is_empty() {
                    return Err(ConfigError::invalid(field, "cannot be empty"));
                }
            }
        }
    }

    if let Some(size) = table.get("size") {
        check_size_value(size)?;
    }

    if let Some(prefix) = table.get("capture_prefix") {
        let prefix = expect_str("capture_prefix", prefix)?;
        check_capture_prefix(prefix).map_err(|r| ConfigError::invalid("capture_prefix", r))?;
    }

    if let Some(dir) = table.get("output_dir") {
        if expect_str("output_dir", dir)?.is_empty() {
            return Err(ConfigError::invalid("output_dir", "cannot be empty"));
        }
    }

    match table.get("step") {
        None => {}
        Some(Value::Array(steps)) => {
            for (idx, step) in steps.iter().enumerate() {
                validate_step_value(idx, step)?;
            }
        }
        Some(other) => {
            return Err(ConfigError::invalid(
                "step",
                format!(
                    "must be an array of tables ([[step]]), got {}",
                    other.type_str()
                ),
            ));
        }
    }

    trace!(target: "tui_capture::config", "Raw configuration table is valid");
    Ok(())
}

fn validate_step_value(idx: usize, step: &Value) -> Result<(), ConfigError> {
    let at = |name: &str| format!("step[{idx}].{name}");

    let Value::Table(step) = step else {
        return Err(ConfigError::invalid(
            format!("step[{idx}]"),
            format!("must be a table, got {}", step.type_str()),
        ));
    };

    let kind_name = match step.get("type") {
        None => return Err(ConfigError::missing(at("type"))),
        Some(v) => expect_str(&at("type"), v)?,
    };
    let kind = ActionKind::from_name(kind_name).ok_or_else(|| {
        ConfigError::invalid(
            at("type"),
            format!(
                "unknown action type '{kind_name}' (expected one of: press, delay, click, capture)"
            ),
        )
    })?;

    match kind {
        ActionKind::Press => {
            let mut count = 0usize;
            if let Some(key) = step.get("key") {
                count += expect_str(&at("key"), key)?.split_whitespace().count();
            }
            match step.get("keys") {
                None => {}
                Some(Value::Array(items)) => {
                    for (i, item) in items.iter().enumerate() {
                        let key = expect_str(&format!("step[{idx}].keys[{i}]"), item)?;
                        if key.trim().is_empty() {
                            return Err(ConfigError::invalid(
                                format!("step[{idx}].keys[{i}]"),
                                "cannot be empty",
                            ));
                        }
                        count += 1;
                    }
                }
                Some(other) => {
                    return Err(ConfigError::invalid(
                        at("keys"),
                        format!("must be an array of strings, got {}", other.type_str()),
                    ));
                }
            }
            if count == 0 {
                return Err(ConfigError::invalid(
                    format!("step[{idx}]"),
                    "press requires at least one key in 'key' or 'keys'",
                ));
            }
        }
        ActionKind::Delay => {
            let seconds = match step.get("seconds") {
                None => return Err(ConfigError::missing(at("seconds"))),
                Some(Value::Integer(n)) => *n as f64,
                Some(Value::Float(f)) => *f,
                Some(other) => {
                    return Err(ConfigError::invalid(
                        at("seconds"),
                        format!("must be a number, got {}", other.type_str()),
                    ));
                }
            };
            check_seconds(seconds).map_err(|r| ConfigError::invalid(at("seconds"), r))?;
        }
        ActionKind::Click => {
            let label = match step.get("label") {
                None => return Err(ConfigError::missing(at("label"))),
                Some(v) => expect_str(&at("label"), v)?,
            };
            if label.trim().is_empty() {
                return Err(ConfigError::invalid(at("label"), "cannot be empty"));
            }
        }
        ActionKind::Capture => {
            if let Some(output) = step.get("output") {
                if expect_str(&at("output"), output)?.trim().is_empty() {
                    return Err(ConfigError::invalid(at("output"), "cannot be empty"));
                }
            }
        }
    }
    Ok(())
}

/// Validate a typed configuration (e.g. one built in code rather than loaded from TOML).
pub fn validate_config(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app_module.trim().is_empty() {
        return Err(ConfigError::invalid("app_module", "cannot be empty"));
    }
    if cfg.app_class.trim().is_empty() {
        return Err(ConfigError::invalid("app_class", "cannot be empty"));
    }
    if cfg.size.width() == 0 || cfg.size.height() == 0 {
        return Err(ConfigError::invalid(
            "size",
            "width and height must be positive integers",
        ));
    }
    check_capture_prefix(&cfg.capture_prefix)
        .map_err(|r| ConfigError::invalid("capture_prefix", r))?;
    if cfg
        .output_dir
        .as_ref()
        .is_some_and(|d| d.as_os_str().is_empty())
    {
        return Err(ConfigError::invalid("output_dir", "cannot be empty"));
    }

    for (idx, step) in cfg.steps.iter().enumerate() {
        match step {
            ActionDef::Press { .. } => {
                if step.key_list().is_empty() {
                    return Err(ConfigError::invalid(
                        format!("step[{idx}]"),
                        "press requires at least one key in 'key' or 'keys'",
                    ));
                }
            }
            ActionDef::Delay { seconds } => check_seconds(*seconds)
                .map_err(|r| ConfigError::invalid(format!("step[{idx}].seconds"), r))?,
            ActionDef::Click { label } => {
                if label.trim().is_empty() {
                    return Err(ConfigError::invalid(
                        format!("step[{idx}].label"),
                        "cannot be empty",
                    ));
                }
            }
            ActionDef::Capture { output } => {
                if output.as_deref().is_some_and(|o| o.trim().is_empty()) {
                    return Err(ConfigError::invalid(
                        format!("step[{idx}].output"),
                        "cannot be empty",
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Check that a capture prefix is usable as a file-name stem on every platform.
pub fn check_capture_prefix(prefix: &str) -> Result<(), String> {
    if prefix.is_empty() {
        return Err("cannot be empty".to_string());
    }
    let found: String = prefix
        .chars()
        .filter(|c| UNSAFE_PREFIX_CHARS.contains(c))
        .collect();
    if !found.is_empty() {
        return Err(format!(
            "contains invalid characters {found:?} (not allowed: / \\ : * ?)"
        ));
    }
    Ok(())
}

fn check_seconds(seconds: f64) -> Result<(), String> {
    if !seconds.is_finite() {
        return Err("must be a finite number".to_string());
    }
    if seconds < 0.0 {
        return Err(format!("must be non-negative, got {seconds}"));
    }
    if Duration::try_from_secs_f64(seconds).is_err() {
        return Err(format!("is too large, got {seconds}"));
    }
    Ok(())
}

fn check_size_value(size: &Value) -> Result<(), ConfigError> {
    let invalid = || {
        ConfigError::invalid(
            "size",
            "must be an array of two positive integers [width, height]",
        )
    };
    let Value::Array(dims) = size else {
        return Err(invalid());
    };
    if dims.len() != 2 {
        return Err(invalid());
    }
    for dim in dims {
        match dim {
            Value::Integer(n) if *n > 0 && *n <= i64::from(u16::MAX) => {}
            _ => return Err(invalid()),
        }
    }
    Ok(())
}

fn expect_str<'a>(field: &str, value: &'a Value) -> Result<&'a str, ConfigError> {
    value.as_str().ok_or_else(|| {
        ConfigError::invalid(
            field,
            format!("must be a string, got {}", value.type_str()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Size;

    fn table(s: &str) -> Table {
        toml::from_str(s).unwrap()
    }

    fn invalid_field(s: &str) -> (String, String) {
        match validate_table(&table(s)).unwrap_err() {
            ConfigError::Invalid { field, reason } => (field, reason),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    const HEAD: &str = "app_module = \"test\"\napp_class = \"Test\"\n";

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg = load_from_str(HEAD).unwrap();
        assert_eq!(cfg.size, Size(80, 40));
        assert_eq!(cfg.capture_prefix, "capture");
        assert!(cfg.output_dir.is_none());
        assert!(cfg.steps.is_empty());
    }

    #[test]
    fn full_config_parses_all_step_kinds() {
        let cfg = load_from_str(&format!(
            r#"{HEAD}
size = [100, 30]
output_dir = "shots"
capture_prefix = "demo"

[[step]]
type = "press"
key = "tab enter"

[[step]]
type = "press"
keys = ["down"]

[[step]]
type = "delay"
seconds = 1

[[step]]
type = "click"
label = "Run Selected"

[[step]]
type = "capture"
output = "final"
"#
        ))
        .unwrap();
        assert_eq!(cfg.size, Size(100, 30));
        assert_eq!(cfg.steps.len(), 5);
        assert_eq!(cfg.steps[0].key_list(), vec!["tab", "enter"]);
        assert_eq!(cfg.steps[2], ActionDef::Delay { seconds: 1.0 });
        assert_eq!(
            cfg.steps[4],
            ActionDef::Capture {
                output: Some("final".into())
            }
        );
    }

    #[test]
    fn missing_app_module_is_reported() {
        let err = validate_table(&table("app_class = \"Test\"")).unwrap_err();
        assert_eq!(err.field(), Some("app_module"));
        assert!(err.to_string().contains("app_module"));
    }

    #[test]
    fn missing_app_class_is_reported() {
        let err = load_from_str("app_module = \"test\"").unwrap_err();
        assert_eq!(err.field(), Some("app_class"));
    }

    #[test]
    fn capture_prefix_must_be_string() {
        let (field, reason) = invalid_field(&format!("{HEAD}capture_prefix = 123"));
        assert_eq!(field, "capture_prefix");
        assert!(reason.starts_with("must be a string"));
    }

    #[test]
    fn capture_prefix_cannot_be_empty() {
        let err = validate_table(&table(&format!("{HEAD}capture_prefix = \"\""))).unwrap_err();
        assert_eq!(err.to_string(), "'capture_prefix' cannot be empty");
    }

    #[test]
    fn capture_prefix_rejects_unsafe_characters() {
        for bad in ["my/prefix", "my\\\\prefix", "my:prefix", "my*prefix", "my?prefix"] {
            let (field, reason) = invalid_field(&format!("{HEAD}capture_prefix = \"{bad}\""));
            assert_eq!(field, "capture_prefix");
            assert!(reason.contains("invalid characters"), "{bad}: {reason}");
        }
    }

    #[test]
    fn capture_prefix_allows_underscore_and_dash() {
        for good in ["my_prefix", "my-prefix"] {
            validate_table(&table(&format!("{HEAD}capture_prefix = \"{good}\""))).unwrap();
        }
    }

    #[test]
    fn size_must_be_two_positive_integers() {
        for bad in ["[80]", "[0, 40]", "[80, -1]", "[80, 40, 2]", "\"80x40\"", "[80.5, 40]"] {
            let (field, _) = invalid_field(&format!("{HEAD}size = {bad}"));
            assert_eq!(field, "size", "{bad}");
        }
    }

    #[test]
    fn unknown_step_type_is_rejected() {
        let (field, reason) = invalid_field(&format!("{HEAD}[[step]]\ntype = \"scroll\"\n"));
        assert_eq!(field, "step[0].type");
        assert!(reason.contains("scroll"));
    }

    #[test]
    fn delay_requires_non_negative_seconds() {
        let err = validate_table(&table(&format!("{HEAD}[[step]]\ntype = \"delay\"\n")))
            .unwrap_err();
        assert_eq!(err.field(), Some("step[0].seconds"));

        let (field, reason) =
            invalid_field(&format!("{HEAD}[[step]]\ntype = \"delay\"\nseconds = -0.5\n"));
        assert_eq!(field, "step[0].seconds");
        assert!(reason.contains("non-negative"));

        let (_, reason) =
            invalid_field(&format!("{HEAD}[[step]]\ntype = \"delay\"\nseconds = \"1\"\n"));
        assert!(reason.starts_with("must be a number"));

        let (field, reason) =
            invalid_field(&format!("{HEAD}[[step]]\ntype = \"delay\"\nseconds = 1e20\n"));
        assert_eq!(field, "step[0].seconds");
        assert!(reason.contains("too large"), "{reason}");
    }

    #[test]
    fn click_requires_label() {
        let err = validate_table(&table(&format!(
            "{HEAD}[[step]]\ntype = \"capture\"\n[[step]]\ntype = \"click\"\n"
        )))
        .unwrap_err();
        assert_eq!(err.field(), Some("step[1].label"));

        for label in ["", "   "] {
            let (field, reason) = invalid_field(&format!(
                "{HEAD}[[step]]\ntype = \"capture\"\n[[step]]\ntype = \"click\"\nlabel = \"{label}\"\n"
            ));
            assert_eq!(field, "step[1].label");
            assert_eq!(reason, "cannot be empty");

            let mut cfg = Config::new("test", "Test");
            cfg.steps.push(ActionDef::Capture { output: None });
            cfg.steps.push(ActionDef::Click { label: label.into() });
            assert_eq!(validate_config(&cfg).unwrap_err().field(), Some("step[1].label"));
        }
    }

    #[test]
    fn press_requires_a_key() {
        let (field, _) = invalid_field(&format!("{HEAD}[[step]]\ntype = \"press\"\nkey = \"  \"\n"));
        assert_eq!(field, "step[0]");
        let (field, _) =
            invalid_field(&format!("{HEAD}[[step]]\ntype = \"press\"\nkeys = [\"tab\", 3]\n"));
        assert_eq!(field, "step[0].keys[1]");
    }

    #[test]
    fn typed_validation_matches_raw_rules() {
        let mut cfg = Config::new("test", "Test");
        cfg.capture_prefix = "a:b".into();
        assert_eq!(validate_config(&cfg).unwrap_err().field(), Some("capture_prefix"));

        let mut cfg = Config::new("test", "Test");
        cfg.steps.push(ActionDef::Delay { seconds: f64::NAN });
        assert_eq!(validate_config(&cfg).unwrap_err().field(), Some("step[0].seconds"));

        let mut cfg = Config::new("test", "Test");
        cfg.steps.push(ActionDef::Delay { seconds: 1e20 });
        assert_eq!(validate_config(&cfg).unwrap_err().field(), Some("step[0].seconds"));

        let mut cfg = Config::new("test", "Test");
        cfg.size = Size(0, 10);
        assert_eq!(validate_config(&cfg).unwrap_err().field(), Some("size"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = load_from_str("app_module = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: None, .. }));
    }

    #[test]
    fn schema_mentions_step_field() {
        let mut buf = Vec::new();
        write_schema_to_writer(&mut buf).unwrap();
        let json = String::from_utf8(buf).unwrap();
        assert!(json.contains("capture_prefix"));
        assert!(json.contains("\"step\""));
    }
}
