//! INI file configuration adapter.

use crate::domain::config_validation::parse_bool;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(|e| std::io::Error::other(e))?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[data]
symbol = SPY
interval = 1d

[simulation]
initial_capital = 100000.0
short_window = 5
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(adapter.get_string("data", "symbol"), Some("SPY".to_string()));
        assert_eq!(adapter.get_string("data", "interval"), Some("1d".to_string()));
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter =
            FileConfigAdapter::from_string("[simulation]\ninitial_capital = 100\n").unwrap();
        assert_eq!(adapter.get_string("simulation", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_value() {
        let adapter = FileConfigAdapter::from_string("[simulation]\nlong_window = 20\n").unwrap();
        assert_eq!(adapter.get_int("simulation", "long_window", 0), 20);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[simulation]\nlong_window = abc\n").unwrap();
        assert_eq!(adapter.get_int("simulation", "long_window", 42), 42);
    }

    #[test]
    fn get_usize_clamps_negative_to_zero() {
        let adapter =
            FileConfigAdapter::from_string("[simulation]\nshort_window = -3\nlong_window = 30\n")
                .unwrap();
        assert_eq!(adapter.get_usize("simulation", "short_window", 5), 0);
        assert_eq!(adapter.get_usize("simulation", "long_window", 20), 30);
        assert_eq!(adapter.get_usize("simulation", "volatility_window", 20), 20);
    }

    #[test]
    fn get_double_returns_value() {
        let adapter =
            FileConfigAdapter::from_string("[simulation]\ntrailing_stop_pct = 0.05\n").unwrap();
        assert_eq!(adapter.get_double("simulation", "trailing_stop_pct", 0.0), 0.05);
    }

    #[test]
    fn get_double_returns_default_for_missing_or_garbage() {
        let adapter =
            FileConfigAdapter::from_string("[simulation]\nslippage_pct = lots\n").unwrap();
        assert_eq!(adapter.get_double("simulation", "slippage_pct", 0.0005), 0.0005);
        assert_eq!(adapter.get_double("simulation", "missing", 99.9), 99.9);
    }

    #[test]
    fn get_bool_accepts_common_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[simulation]\na = true\nb = yes\nc = 1\nd = false\ne = no\nf = 0\n",
        )
        .unwrap();
        assert!(adapter.get_bool("simulation", "a", false));
        assert!(adapter.get_bool("simulation", "b", false));
        assert!(adapter.get_bool("simulation", "c", false));
        assert!(!adapter.get_bool("simulation", "d", true));
        assert!(!adapter.get_bool("simulation", "e", true));
        assert!(!adapter.get_bool("simulation", "f", true));
    }

    #[test]
    fn get_bool_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[simulation]\n").unwrap();
        assert!(adapter.get_bool("simulation", "trailing_stop_enabled", true));
        assert!(!adapter.get_bool("simulation", "trailing_stop_enabled", false));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[report]\nseries_output = /tmp/series.csv\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("report", "series_output"),
            Some("/tmp/series.csv".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(result.is_err());
    }
}
