//! check-config command: validate a configuration file without sending anything

use crate::cli::load_options;
use anyhow::{Context, Result};
use flowrelay_core::providers::create_transport;
use flowrelay_core::ConfigurationError;
use std::path::PathBuf;

/// Validate the configuration and describe the transport it selects.
pub fn execute_check_config(config_path: Option<PathBuf>) -> Result<String> {
    let (path, options) = load_options(config_path)?;

    options
        .validate()
        .map_err(ConfigurationError::Invalid)
        .with_context(|| format!("Invalid configuration in {:?}", path))?;
    let config = options.resolve()?;
    let transport = create_transport(&config);

    let interval = match config.min_interval {
        Some(interval) => format!("{}ms", interval.as_millis()),
        None => "none".to_string(),
    };
    Ok(format!(
        "{:?}: ok (transport: {}, destinations: {}, interval: {})",
        path,
        transport.name(),
        config.destinations.len(),
        interval
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_check_valid_flow_config() {
        let file = write_config(
            r#"
username = "me@example.com"
flows = ["ops", "dev"]
interval = 500
"#,
        );
        let report = execute_check_config(Some(file.path().to_path_buf())).unwrap();
        assert!(report.contains("transport: flowdock-flow"));
        assert!(report.contains("destinations: 2"));
        assert!(report.contains("interval: 500ms"));
    }

    #[test]
    fn test_check_reports_every_problem() {
        let file = write_config(r#"token = "T""#);
        let err = execute_check_config(Some(file.path().to_path_buf())).unwrap_err();
        match err.downcast_ref::<ConfigurationError>() {
            Some(ConfigurationError::Invalid(problems)) => {
                assert_eq!(problems, &vec!["nick is required with token".to_string()]);
            }
            other => panic!("expected invalid configuration, got {:?}", other),
        }
    }
}
