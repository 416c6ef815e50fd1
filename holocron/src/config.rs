use catalog::config::Config as CatalogConfig;
use serde::Deserialize;
use std::fs::File;

#[derive(Deserialize, Debug)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Deserialize, Debug, Default)]
pub struct LoggingConfig {
    pub sentry_dsn: Option<String>,
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".into()
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
    pub catalog: CatalogConfig,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data = serde_yaml::from_reader(file)?;

        Ok(data)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::users::Role;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    #[test]
    fn full_config() {
        let yaml = r#"
            logging:
                sentry_dsn: https://key@sentry.example.com/1
                level: catalog=debug,info
            metrics:
                statsd_host: 127.0.0.1
                statsd_port: 8125
            catalog:
                listener:
                    host: 0.0.0.0
                    port: 8080
                upstream:
                    url: https://swapi.dev/api/
                    timeout_secs: 3
                cache:
                    ttl_secs: 600
                users:
                    - id: 1
                      email: luke@example.com
                      nick_name: farmboy
                      external_id: 1
                      api_token: luke-token
                    - id: 2
                      email: admin@example.com
                      nick_name: admiral
                      external_id: 10
                      role: admin
                      api_token: admin-token
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        let logging = config.logging.expect("logging config");
        assert_eq!(
            logging.sentry_dsn.as_deref(),
            Some("https://key@sentry.example.com/1")
        );
        assert_eq!(logging.level, "catalog=debug,info");

        let metrics = config.metrics.expect("metrics config");
        assert_eq!(metrics.statsd_port, 8125);

        let catalog = config.catalog;
        assert_eq!(catalog.listener.port, 8080);
        assert_eq!(catalog.upstream.url.as_str(), "https://swapi.dev/api/");
        assert_eq!(catalog.upstream.timeout_secs, 3);
        assert_eq!(catalog.cache.ttl_secs, 600);
        assert_eq!(catalog.users.len(), 2);
        assert_eq!(catalog.users[0].role, Role::User);
        assert_eq!(catalog.users[1].role, Role::Admin);
        assert_eq!(catalog.validate(), Ok(()));
    }

    #[test]
    fn minimal_config() {
        let yaml = r#"
            catalog:
                upstream:
                    url: https://swapi.dev/api/
            logging:
                sentry_dsn: null
            "#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        assert!(config.metrics.is_none());
        let logging = config.logging.expect("logging config");
        assert!(logging.sentry_dsn.is_none());
        assert_eq!(logging.level, "info");
        assert!(config.catalog.users.is_empty());
    }

    #[test]
    fn missing_and_invalid_files() {
        let missing = Config::from_file(std::path::Path::new("/nonexistent/holocron.yaml"));
        assert!(matches!(missing, Err(ConfigError::LoadError(_))));

        let tmp = write_tmp_file("catalog:\n    listener:\n        port: 80\n");
        let invalid = Config::from_file(tmp.path());
        assert!(matches!(invalid, Err(ConfigError::ParseError(_))));
    }
}
