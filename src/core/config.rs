//! Logger configuration
//!
//! Configuration is assembled from layers. Each [`ConfigLayer`] holds only the
//! keys a source actually set; layers are merged key by key (later wins) in the
//! order defaults, file, environment, explicit override. [`ConfigLayer::resolve`]
//! then validates the merged layer into an immutable [`LoggerConfig`]. Invalid
//! values never abort construction: the field falls back to its default and a
//! [`ConfigWarning`] is reported.

use super::color::Color;
use super::date_pattern::DatePattern;
use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::timestamp::{TimeZoneSetting, LOCAL_TIMEZONE};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "logger.json";
pub const DEFAULT_DIRECTORY: &str = "logs";
pub const DEFAULT_MAX_FILES: i64 = 3;
pub const DEFAULT_FILE_NAME_FORMAT: &str = "yyyy-MM-dd";
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd HH:mm:ss";
pub const DEFAULT_PATTERN: &str = "{color:gray}{pretty-timestamp}{reset} {color:levelColor}[{level-name}]{reset} {color:gray}({reset}{file-name}:{color:blue}{line}{reset}:{color:blue}{column}{color:gray}){reset} {data}";
pub const DEFAULT_CUSTOM_PATTERN: &str = "{color:gray}{pretty-timestamp}{reset} {color:tagColor}[{tag}]{reset} {color:contextColor}({context}){reset} {data}";

/// Validated, immutable logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub directory: PathBuf,
    pub level: LogLevel,
    pub disable_file: bool,
    pub rotate: bool,
    /// Retention count; `None` keeps every file
    pub max_files: Option<i64>,
    pub file_name_format: DatePattern,
    pub console: bool,
    pub console_color: bool,
    pub date_format: DatePattern,
    pub timezone: TimeZoneSetting,
    pub silent: bool,
    pub pattern: String,
    pub custom_pattern: String,
    pub level_color: HashMap<LogLevel, Color>,
    /// Keyed by upper-cased tag
    pub custom_colors: HashMap<String, Color>,
    pub pretty_print: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        ConfigLayer::defaults().resolve().0
    }
}

impl LoggerConfig {
    /// Whether a call at `level` reaches any sink
    pub fn should_log(&self, level: LogLevel) -> bool {
        !self.silent && level.passes(self.level)
    }

    /// Color for `{color:levelColor}`
    pub fn level_color(&self, level: LogLevel) -> Color {
        self.level_color
            .get(&level)
            .copied()
            .unwrap_or_else(|| level.default_color())
    }

    /// Color override for a tag, if configured
    pub fn tag_color(&self, tag: &str) -> Option<Color> {
        self.custom_colors.get(&tag.to_uppercase()).copied()
    }
}

/// A configuration problem that was recovered from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub field: &'static str,
    pub message: String,
}

impl ConfigWarning {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Deserialize a field that may be absent, `null`, or a value
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// One source of configuration; unset keys are `None`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigLayer {
    pub directory: Option<String>,
    pub level: Option<String>,
    pub disable_file: Option<bool>,
    pub rotate: Option<bool>,
    /// `Some(None)` is an explicit "unlimited"
    #[serde(deserialize_with = "nullable")]
    pub max_files: Option<Option<i64>>,
    pub file_name_format: Option<String>,
    pub console: Option<bool>,
    pub console_color: Option<bool>,
    pub date_format: Option<String>,
    pub timezone: Option<String>,
    pub silent: Option<bool>,
    pub pattern: Option<String>,
    pub custom_pattern: Option<String>,
    pub level_color: Option<HashMap<String, String>>,
    pub custom_colors: Option<HashMap<String, String>>,
    pub pretty_print: Option<bool>,
}

impl ConfigLayer {
    /// The compiled defaults, with every key set
    pub fn defaults() -> Self {
        Self {
            directory: Some(DEFAULT_DIRECTORY.to_string()),
            level: Some(LogLevel::Info.name().to_string()),
            disable_file: Some(false),
            rotate: Some(true),
            max_files: Some(Some(DEFAULT_MAX_FILES)),
            file_name_format: Some(DEFAULT_FILE_NAME_FORMAT.to_string()),
            console: Some(true),
            console_color: Some(true),
            date_format: Some(DEFAULT_DATE_FORMAT.to_string()),
            timezone: Some(LOCAL_TIMEZONE.to_string()),
            silent: Some(false),
            pattern: Some(DEFAULT_PATTERN.to_string()),
            custom_pattern: Some(DEFAULT_CUSTOM_PATTERN.to_string()),
            level_color: Some(HashMap::new()),
            custom_colors: Some(HashMap::new()),
            pretty_print: Some(true),
        }
    }

    /// Parse a layer from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a layer from a JSON file.
    ///
    /// A missing file is an empty layer. A file that exists but cannot be read
    /// or parsed is also an empty layer, plus a warning.
    pub fn from_file(path: impl AsRef<Path>) -> (Self, Vec<ConfigWarning>) {
        let path = path.as_ref();
        if !path.exists() {
            return (Self::default(), Vec::new());
        }

        let loaded = std::fs::read_to_string(path)
            .map_err(LoggerError::from)
            .and_then(|text| Self::from_json(&text));

        match loaded {
            Ok(layer) => (layer, Vec::new()),
            Err(e) => (
                Self::default(),
                vec![ConfigWarning::new(
                    "file",
                    format!("ignoring '{}': {}", path.display(), e),
                )],
            ),
        }
    }

    /// Read `LOG_*` variables from the process environment
    pub fn from_env() -> (Self, Vec<ConfigWarning>) {
        Self::from_env_vars(std::env::vars())
    }

    /// Build a layer from `LOG_*` key/value pairs
    pub fn from_env_vars<I, K, V>(vars: I) -> (Self, Vec<ConfigWarning>)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut layer = Self::default();
        let mut warnings = Vec::new();
        let flag = |value: &str| value == "true";

        for (key, value) in vars {
            let value: String = value.into();
            match key.as_ref() {
                "LOG_LEVEL" => layer.level = Some(value),
                "LOG_DIRECTORY" => layer.directory = Some(value),
                "LOG_DISABLE_FILE" => layer.disable_file = Some(flag(&value)),
                "LOG_ROTATE" => layer.rotate = Some(flag(&value)),
                "LOG_MAX_FILES" => match value.trim() {
                    "null" | "unlimited" => layer.max_files = Some(None),
                    number => match number.parse::<i64>() {
                        Ok(n) => layer.max_files = Some(Some(n)),
                        Err(_) => warnings.push(ConfigWarning::new(
                            "maxFiles",
                            format!("LOG_MAX_FILES is not a number: '{}'", value),
                        )),
                    },
                },
                "LOG_FILE_NAME_FORMAT" => layer.file_name_format = Some(value),
                "LOG_CONSOLE" => layer.console = Some(flag(&value)),
                "LOG_CONSOLE_COLOR" => layer.console_color = Some(flag(&value)),
                "LOG_DATE_FORMAT" => layer.date_format = Some(value),
                "LOG_TIMEZONE" => layer.timezone = Some(value),
                "LOG_SILENT" => layer.silent = Some(flag(&value)),
                "LOG_PATTERN" => layer.pattern = Some(value),
                "LOG_CUSTOM_PATTERN" => layer.custom_pattern = Some(value),
                "LOG_PRETTY_PRINT" => layer.pretty_print = Some(flag(&value)),
                _ => {}
            }
        }

        (layer, warnings)
    }

    /// Overlay `other` on top of `self`, key by key
    #[must_use]
    pub fn merge(self, other: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            directory: other.directory.or(self.directory),
            level: other.level.or(self.level),
            disable_file: other.disable_file.or(self.disable_file),
            rotate: other.rotate.or(self.rotate),
            max_files: other.max_files.or(self.max_files),
            file_name_format: other.file_name_format.or(self.file_name_format),
            console: other.console.or(self.console),
            console_color: other.console_color.or(self.console_color),
            date_format: other.date_format.or(self.date_format),
            timezone: other.timezone.or(self.timezone),
            silent: other.silent.or(self.silent),
            pattern: other.pattern.or(self.pattern),
            custom_pattern: other.custom_pattern.or(self.custom_pattern),
            level_color: other.level_color.or(self.level_color),
            custom_colors: other.custom_colors.or(self.custom_colors),
            pretty_print: other.pretty_print.or(self.pretty_print),
        }
    }

    /// Validate into a [`LoggerConfig`]. Unset keys take their defaults;
    /// invalid keys take their defaults and produce a warning.
    pub fn resolve(self) -> (LoggerConfig, Vec<ConfigWarning>) {
        let mut warnings = Vec::new();

        let level = match self.level {
            Some(raw) => raw.parse::<LogLevel>().unwrap_or_else(|e| {
                warnings.push(ConfigWarning::new("level", e));
                LogLevel::Info
            }),
            None => LogLevel::Info,
        };

        let max_files = match self.max_files {
            Some(Some(n)) if n < 1 => {
                warnings.push(ConfigWarning::new(
                    "maxFiles",
                    format!("must be >= 1 if set, got {}; using {}", n, DEFAULT_MAX_FILES),
                ));
                Some(DEFAULT_MAX_FILES)
            }
            Some(setting) => setting,
            None => Some(DEFAULT_MAX_FILES),
        };

        let file_name_format = compile_or_default(
            "fileNameFormat",
            self.file_name_format,
            DEFAULT_FILE_NAME_FORMAT,
            DatePattern::compile_file_name,
            &mut warnings,
        );
        let date_format = compile_or_default(
            "dateFormat",
            self.date_format,
            DEFAULT_DATE_FORMAT,
            DatePattern::compile,
            &mut warnings,
        );

        let timezone = match self.timezone {
            Some(raw) => raw.parse::<TimeZoneSetting>().unwrap_or_else(|e| {
                warnings.push(ConfigWarning::new("timezone", e));
                TimeZoneSetting::Local
            }),
            None => TimeZoneSetting::Local,
        };

        let mut level_color = HashMap::new();
        for (raw_level, raw_color) in self.level_color.unwrap_or_default() {
            let parsed_level = raw_level.parse::<LogLevel>();
            let parsed_color = raw_color.parse::<Color>();
            match (parsed_level, parsed_color) {
                (Ok(l), Ok(c)) => {
                    level_color.insert(l, c);
                }
                (Err(e), _) | (_, Err(e)) => {
                    warnings.push(ConfigWarning::new("levelColor", e));
                }
            }
        }

        let mut custom_colors = HashMap::new();
        for (tag, raw_color) in self.custom_colors.unwrap_or_default() {
            match raw_color.parse::<Color>() {
                Ok(c) => {
                    custom_colors.insert(tag.to_uppercase(), c);
                }
                Err(e) => warnings.push(ConfigWarning::new(
                    "customColors",
                    format!("{} for tag '{}'", e, tag),
                )),
            }
        }

        let config = LoggerConfig {
            directory: PathBuf::from(
                self.directory
                    .unwrap_or_else(|| DEFAULT_DIRECTORY.to_string()),
            ),
            level,
            disable_file: self.disable_file.unwrap_or(false),
            rotate: self.rotate.unwrap_or(true),
            max_files,
            file_name_format,
            console: self.console.unwrap_or(true),
            console_color: self.console_color.unwrap_or(true),
            date_format,
            timezone,
            silent: self.silent.unwrap_or(false),
            pattern: self.pattern.unwrap_or_else(|| DEFAULT_PATTERN.to_string()),
            custom_pattern: self
                .custom_pattern
                .unwrap_or_else(|| DEFAULT_CUSTOM_PATTERN.to_string()),
            level_color,
            custom_colors,
            pretty_print: self.pretty_print.unwrap_or(true),
        };

        (config, warnings)
    }
}

fn compile_or_default(
    field: &'static str,
    raw: Option<String>,
    default: &str,
    compile: fn(&str) -> Result<DatePattern>,
    warnings: &mut Vec<ConfigWarning>,
) -> DatePattern {
    let fallback = || compile(default).expect("built-in date pattern compiles");
    match raw {
        Some(raw) => compile(&raw).unwrap_or_else(|e| {
            warnings.push(ConfigWarning::new(field, e.to_string()));
            fallback()
        }),
        None => fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::default();
        assert_eq!(config.directory, PathBuf::from("logs"));
        assert_eq!(config.level, LogLevel::Info);
        assert!(config.rotate);
        assert_eq!(config.max_files, Some(3));
        assert_eq!(config.file_name_format.as_str(), "yyyy-MM-dd");
        assert_eq!(config.timezone, TimeZoneSetting::Local);
        assert!(config.pretty_print);
        assert_eq!(config.pattern, DEFAULT_PATTERN);
    }

    #[test]
    fn test_merge_later_layer_wins() {
        let file = ConfigLayer {
            level: Some("debug".into()),
            directory: Some("file-dir".into()),
            ..ConfigLayer::default()
        };
        let env = ConfigLayer {
            level: Some("warn".into()),
            ..ConfigLayer::default()
        };
        let (config, warnings) = ConfigLayer::defaults().merge(file).merge(env).resolve();
        assert!(warnings.is_empty());
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.directory, PathBuf::from("file-dir"));
    }

    #[test]
    fn test_json_layer_distinguishes_null_max_files() {
        let unlimited = ConfigLayer::from_json(r#"{"maxFiles": null}"#).unwrap();
        assert_eq!(unlimited.max_files, Some(None));

        let absent = ConfigLayer::from_json(r#"{"rotate": false}"#).unwrap();
        assert_eq!(absent.max_files, None);
        assert_eq!(absent.rotate, Some(false));

        let (config, _) = ConfigLayer::defaults().merge(unlimited).resolve();
        assert_eq!(config.max_files, None);
    }

    #[test]
    fn test_json_layer_camel_case_keys() {
        let layer = ConfigLayer::from_json(
            r#"{"disableFile": true, "consoleColor": false, "levelColor": {"info": "cyan"},
                "customColors": {"db": "magenta"}, "prettyPrint": false}"#,
        )
        .unwrap();
        let (config, warnings) = layer.resolve();
        assert!(warnings.is_empty());
        assert!(config.disable_file);
        assert!(!config.console_color);
        assert!(!config.pretty_print);
        assert_eq!(config.level_color(LogLevel::Info), Color::Cyan);
        assert_eq!(config.level_color(LogLevel::Warn), Color::Yellow);
        assert_eq!(config.tag_color("Db"), Some(Color::Magenta));
    }

    #[test]
    fn test_invalid_values_fall_back_with_warnings() {
        let layer = ConfigLayer {
            level: Some("loud".into()),
            max_files: Some(Some(0)),
            file_name_format: Some("logs/yyyy".into()),
            date_format: Some("yyyy-QQ".into()),
            timezone: Some("Nowhere/Special".into()),
            level_color: Some(HashMap::from([("info".into(), "mauve".into())])),
            custom_colors: Some(HashMap::from([("db".into(), "sparkly".into())])),
            ..ConfigLayer::default()
        };
        let (config, warnings) = layer.resolve();

        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.max_files, Some(DEFAULT_MAX_FILES));
        assert_eq!(config.file_name_format.as_str(), DEFAULT_FILE_NAME_FORMAT);
        assert_eq!(config.date_format.as_str(), DEFAULT_DATE_FORMAT);
        assert_eq!(config.timezone, TimeZoneSetting::Local);
        assert!(config.level_color.is_empty());
        assert!(config.custom_colors.is_empty());

        let fields: Vec<&str> = warnings.iter().map(|w| w.field).collect();
        for field in [
            "level",
            "maxFiles",
            "fileNameFormat",
            "dateFormat",
            "timezone",
            "levelColor",
            "customColors",
        ] {
            assert!(fields.contains(&field), "missing warning for {}", field);
        }
    }

    #[test]
    fn test_env_layer() {
        let (layer, warnings) = ConfigLayer::from_env_vars([
            ("LOG_LEVEL", "error"),
            ("LOG_ROTATE", "false"),
            ("LOG_MAX_FILES", "unlimited"),
            ("LOG_TIMEZONE", "Europe/Berlin"),
            ("LOG_SILENT", "yes"),
            ("HOME", "/root"),
        ]);
        assert!(warnings.is_empty());
        assert_eq!(layer.level.as_deref(), Some("error"));
        assert_eq!(layer.rotate, Some(false));
        assert_eq!(layer.max_files, Some(None));
        assert_eq!(layer.silent, Some(false));

        let (config, _) = layer.resolve();
        assert_eq!(config.timezone.to_string(), "Europe/Berlin");
    }

    #[test]
    fn test_env_layer_bad_number() {
        let (layer, warnings) = ConfigLayer::from_env_vars([("LOG_MAX_FILES", "many")]);
        assert_eq!(layer.max_files, None);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "maxFiles");
    }

    #[test]
    fn test_file_layer() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"level": "trace", "maxFiles": 7}}"#).unwrap();
        let (layer, warnings) = ConfigLayer::from_file(file.path());
        assert!(warnings.is_empty());
        assert_eq!(layer.level.as_deref(), Some("trace"));
        assert_eq!(layer.max_files, Some(Some(7)));
    }

    #[test]
    fn test_missing_and_broken_file_layers() {
        let (layer, warnings) = ConfigLayer::from_file("/definitely/not/here/logger.json");
        assert_eq!(layer, ConfigLayer::default());
        assert!(warnings.is_empty());

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let (layer, warnings) = ConfigLayer::from_file(file.path());
        assert_eq!(layer, ConfigLayer::default());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_should_log() {
        let mut config = LoggerConfig::default();
        assert!(config.should_log(LogLevel::Info));
        assert!(!config.should_log(LogLevel::Debug));
        config.silent = true;
        assert!(!config.should_log(LogLevel::Fatal));
    }
}
