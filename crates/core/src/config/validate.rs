use tracing::warn;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Storage bucket and region are set
/// - Job admission, job deadline, tool timeout and pool size are non-zero
///
/// Missing storage credentials are allowed here; uploads report them per request.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.storage.bucket.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.bucket must be set (or S3_BUCKET_NAME)".to_string(),
        ));
    }

    if config.storage.region.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.region must be set (or AWS_REGION)".to_string(),
        ));
    }

    if config.jobs.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "jobs.max_concurrent cannot be 0".to_string(),
        ));
    }

    if config.jobs.job_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "jobs.job_timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.tool.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "tool.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.target_pool.count == 0 {
        return Err(ConfigError::ValidationError(
            "target_pool.count cannot be 0".to_string(),
        ));
    }

    let longest_pass_chain = config
        .tool
        .timeout_secs
        .saturating_mul(config.target_pool.count as u64);
    if config.jobs.job_timeout_secs < longest_pass_chain {
        warn!(
            job_timeout_secs = config.jobs.job_timeout_secs,
            longest_pass_chain_secs = longest_pass_chain,
            "jobs.job_timeout_secs is shorter than target_pool.count tool passes at tool.timeout_secs; \
             slow five-target jobs hit the job deadline first"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.storage.bucket = "swaps".to_string();
        config.storage.region = "us-east-1".to_string();
        config
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_allows_missing_credentials() {
        let config = valid_config();
        assert!(config.storage.access_key.is_empty());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_missing_bucket_fails() {
        let mut config = valid_config();
        config.storage.bucket = "  ".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("storage.bucket"));
    }

    #[test]
    fn test_validate_missing_region_fails() {
        let mut config = valid_config();
        config.storage.region.clear();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("storage.region"));
    }

    #[test]
    fn test_validate_zero_job_timeout_fails() {
        let mut config = valid_config();
        config.jobs.job_timeout_secs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("jobs.job_timeout_secs"));
    }

    #[test]
    fn test_validate_allows_zero_admission_wait() {
        let mut config = valid_config();
        config.jobs.admission_timeout_secs = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_zero_concurrency_fails() {
        let mut config = valid_config();
        config.jobs.max_concurrent = 0;
        assert!(validate_config(&config).is_err());
    }
}
