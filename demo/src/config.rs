use dotenv::var;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Text for each display line, top to bottom.
    pub lines: Vec<String>,
    /// Keep the current time updated on the line below the text.
    pub clock: bool,
}

impl Config {
    pub fn try_load() -> Option<Self> {
        let config_str = var("CONFIG_FILE").unwrap_or_else(|_| "config.json".to_string());
        let config_path = Path::new(&config_str);
        if config_path.exists() {
            let file = std::fs::File::open(config_path).ok()?;
            let reader = std::io::BufReader::new(file);
            serde_json::from_reader(reader).ok()
        } else {
            None
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            lines: vec!["Hello, world!".to_string(), "lcdpico".to_string()],
            clock: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config: Config = serde_json::from_str(r#"{ "clock": true }"#).unwrap();
        assert!(config.clock);
        assert_eq!(config.lines, Config::default().lines);
    }

    #[test]
    fn full_config() {
        let config: Config = serde_json::from_str(r#"{ "lines": ["a", "b", "c"], "clock": false }"#).unwrap();
        assert_eq!(config.lines, vec!["a", "b", "c"]);
        assert!(!config.clock);
    }
}
