use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for environment overrides, e.g. `FACESWAP_JOBS__MAX_CONCURRENT=4`.
pub const ENV_PREFIX: &str = "FACESWAP_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    with_env_overrides(Figment::new().merge(Toml::file(path)))
}

/// Load configuration from defaults and environment variables only
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    with_env_overrides(Figment::new())
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn with_env_overrides(figment: Figment) -> Result<Config, ConfigError> {
    figment
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["CONFIG"]).split("__"))
        .merge(storage_env())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// The unprefixed storage variables the service has always been deployed with.
fn storage_env() -> Env {
    Env::raw().filter_map(|key| {
        let mapped = match key.as_str().to_ascii_uppercase().as_str() {
            "AWS_ACCESS_KEY" => "storage.access_key",
            "AWS_SECRET_KEY" => "storage.secret_key",
            "S3_BUCKET_NAME" => "storage.bucket",
            "AWS_REGION" => "storage.region",
            _ => return None,
        };
        Some(mapped.into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[server]
port = 9000

[jobs]
max_concurrent = 3
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.jobs.max_concurrent, 3);
    }

    #[test]
    fn test_load_config_from_str_wrong_type() {
        let toml = r#"
[server]
port = "not-a-port"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/faceswap.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        figment::Jail::expect_with(|_jail| {
            let mut temp_file = NamedTempFile::new().unwrap();
            writeln!(
                temp_file,
                r#"
[server]
host = "127.0.0.1"
port = 3000

[storage]
bucket = "from-file"
region = "us-east-1"
"#
            )
            .unwrap();

            let config = load_config(temp_file.path()).unwrap();
            assert_eq!(config.server.port, 3000);
            assert_eq!(config.server.host.to_string(), "127.0.0.1");
            assert_eq!(config.storage.bucket, "from-file");
            Ok(())
        });
    }

    #[test]
    fn test_prefixed_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "faceswap.toml",
                r#"
[jobs]
max_concurrent = 2
"#,
            )?;
            jail.set_env("FACESWAP_JOBS__MAX_CONCURRENT", "6");
            jail.set_env("FACESWAP_TOOL__TIMEOUT_SECS", "120");

            let config = load_config(Path::new("faceswap.toml")).unwrap();
            assert_eq!(config.jobs.max_concurrent, 6);
            assert_eq!(config.tool.timeout_secs, 120);
            Ok(())
        });
    }

    #[test]
    fn test_storage_env_variables_are_mapped() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("AWS_ACCESS_KEY", "AKIAENV");
            jail.set_env("AWS_SECRET_KEY", "secret-from-env");
            jail.set_env("S3_BUCKET_NAME", "env-bucket");
            jail.set_env("AWS_REGION", "ap-south-1");

            let config = load_config_from_env().unwrap();
            assert_eq!(config.storage.access_key, "AKIAENV");
            assert_eq!(config.storage.secret_key, "secret-from-env");
            assert_eq!(config.storage.bucket, "env-bucket");
            assert_eq!(config.storage.region, "ap-south-1");
            Ok(())
        });
    }
}
