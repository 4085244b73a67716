use crate::scenes::SceneKind;
use log::warn;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

const CONFIG_PATH: &str = "glhello.ini";

// --- Minimal INI reader ---
#[derive(Debug, Default)]
pub struct SimpleIni {
    sections: HashMap<String, HashMap<String, String>>,
}

impl SimpleIni {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        self.parse(&content);
        Ok(())
    }

    pub fn parse(&mut self, content: &str) {
        self.sections.clear();

        let mut current_section: Option<String> = None;

        for raw_line in content.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            // Section header: [SectionName]
            if line.starts_with('[') && line.ends_with(']') && line.len() >= 2 {
                let name = &line[1..line.len() - 1];
                let section = name.trim().to_string();
                current_section = Some(section.clone());
                self.sections.entry(section).or_default();
                continue;
            }

            // Key/value pair: key=value
            if let Some(eq_idx) = line.find('=') {
                let (key_raw, value_raw) = line.split_at(eq_idx);
                let key = key_raw.trim();
                if key.is_empty() {
                    continue;
                }
                // Skip '=' and trim whitespace from the value.
                let value = value_raw[1..].trim().to_string();
                let section = current_section.clone().unwrap_or_default();
                self.sections
                    .entry(section)
                    .or_default()
                    .insert(key.to_string(), value);
            }
        }
    }

    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        self.sections.get(section).and_then(|s| s.get(key)).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const fn as_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Off => log::LevelFilter::Off,
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(format!("'{s}' is not a valid log level")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub scene: SceneKind,
    pub display_width: u32,
    pub display_height: u32,
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scene: SceneKind::OffscreenQuad,
            display_width: 640,
            display_height: 480,
            log_level: LogLevel::Info,
        }
    }
}

static CONFIG: std::sync::LazyLock<Mutex<Config>> =
    std::sync::LazyLock::new(|| Mutex::new(Config::default()));

fn create_default_config_file() -> Result<(), std::io::Error> {
    let default = Config::default();
    let content = format!(
        "[Options]\n\
         ; Scene: offscreen (pbuffer + FBO quad setup) or onscreen (window triangle).\n\
         Scene={}\n\
         DisplayWidth={}\n\
         DisplayHeight={}\n\
         LogLevel={}\n",
        default.scene.as_str(),
        default.display_width,
        default.display_height,
        default.log_level.as_str(),
    );
    std::fs::write(CONFIG_PATH, content)
}

pub fn load() {
    if !std::path::Path::new(CONFIG_PATH).exists()
        && let Err(e) = create_default_config_file()
    {
        warn!("Failed to create default config file: {e}");
    }

    let mut conf = SimpleIni::new();
    match conf.load(CONFIG_PATH) {
        Ok(()) => {
            // Populate the global CONFIG struct from the file, using
            // default values for any missing keys.
            let mut cfg = CONFIG.lock().unwrap();
            let default = Config::default();

            cfg.scene = conf
                .get("Options", "Scene")
                .and_then(|v| SceneKind::from_str(&v).ok())
                .unwrap_or(default.scene);
            cfg.display_width = conf
                .get("Options", "DisplayWidth")
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|&v| v > 0)
                .unwrap_or(default.display_width);
            cfg.display_height = conf
                .get("Options", "DisplayHeight")
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|&v| v > 0)
                .unwrap_or(default.display_height);
            cfg.log_level = conf
                .get("Options", "LogLevel")
                .and_then(|v| LogLevel::from_str(&v).ok())
                .unwrap_or(default.log_level);
        }
        Err(e) => {
            warn!("Could not read {CONFIG_PATH} ({e}); using default config.");
        }
    }
}

pub fn get() -> Config {
    *CONFIG.lock().unwrap()
}

#[cfg(test)]
mod tests {
    use super::{Config, LogLevel, SimpleIni};
    use crate::scenes::SceneKind;
    use std::str::FromStr;

    #[test]
    fn ini_reader_handles_sections_comments_and_whitespace() {
        let mut ini = SimpleIni::new();
        ini.parse(
            "; leading comment\n\
             [Options]\n\
             Scene = onscreen\n\
             # hash comment\n\
             DisplayWidth=1024\n\
             \n\
             [ Other ]\n\
             key=  spaced value  \n",
        );
        assert_eq!(ini.get("Options", "Scene").as_deref(), Some("onscreen"));
        assert_eq!(ini.get("Options", "DisplayWidth").as_deref(), Some("1024"));
        assert_eq!(
            ini.get("Other", "key").as_deref(),
            Some("spaced value"),
            "section names and values should be trimmed"
        );
        assert_eq!(ini.get("Options", "Missing"), None);
    }

    #[test]
    fn ini_reader_keeps_pairs_that_precede_a_section_header() {
        let mut ini = SimpleIni::new();
        ini.parse("orphan=1\n[Options]\nScene=offscreen\n");
        // Orphan pairs land in the unnamed section rather than being lost.
        assert_eq!(ini.get("", "orphan").as_deref(), Some("1"));
        assert_eq!(ini.get("Options", "Scene").as_deref(), Some("offscreen"));
    }

    #[test]
    fn log_level_parses_common_spellings() {
        assert_eq!(LogLevel::from_str("WARN"), Ok(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("warning"), Ok(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("none"), Ok(LogLevel::Off));
        assert!(LogLevel::from_str("loud").is_err());
    }

    #[test]
    fn default_config_matches_documented_demo_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.scene, SceneKind::OffscreenQuad);
        assert_eq!((cfg.display_width, cfg.display_height), (640, 480));
        assert_eq!(cfg.log_level, LogLevel::Info);
    }
}
