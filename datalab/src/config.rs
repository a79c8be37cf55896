use anyhow::Result;
use config::{Config as ConfigLoader, Environment, File};
use datalab_core::TaskConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub tasks: TaskConfig,
}

impl Config {
    /// Layers `config/default`, `config/local` and `DATALAB__*` variables,
    /// e.g. `DATALAB__TASKS__MAX_CONCURRENT_TASKS=4`.
    pub fn load() -> Result<Self> {
        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("DATALAB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_loader(config)
    }

    fn from_loader(config: ConfigLoader) -> Result<Self> {
        let mut loaded: Config = config.try_deserialize()?;
        loaded.tasks = loaded.tasks.validated()?;
        Ok(loaded)
    }

    /// Filter directive used when `RUST_LOG` is unset.
    pub fn default_filter(&self) -> String {
        let level = &self.log_level;
        format!(
            "datalab={level},datalab_core={level},datalab_api={level},datalab_workflow={level},tower_http={level}"
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            log_level: "info".to_string(),
            tasks: TaskConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use pretty_assertions::assert_eq;

    fn load_toml(source: &str) -> Result<Config> {
        let config = ConfigLoader::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?;
        Config::from_loader(config)
    }

    #[test]
    fn test_empty_source_uses_defaults() {
        let config = load_toml("").unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.tasks, TaskConfig::default());
    }

    #[test]
    fn test_partial_task_section() {
        let config = load_toml(
            r#"
            port = 8080

            [tasks]
            max_concurrent_tasks = 4
            timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.tasks.max_concurrent_tasks, 4);
        assert_eq!(config.tasks.timeout_secs, Some(30));
        assert_eq!(config.tasks.report_interval_ms, 500);
    }

    #[test]
    fn test_invalid_task_section_is_rejected() {
        let result = load_toml(
            r#"
            [tasks]
            max_concurrent_tasks = 0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_default_filter_uses_log_level() {
        let config = Config {
            log_level: "warn".to_string(),
            ..Config::default()
        };
        assert!(config.default_filter().starts_with("datalab=warn,"));
        assert!(config.default_filter().ends_with("tower_http=warn"));
        for crate_name in ["datalab_core", "datalab_api", "datalab_workflow"] {
            assert!(config
                .default_filter()
                .contains(&format!("{}=warn", crate_name)));
        }
    }
}
