//! Configuration loading via `ortho-config`.

use std::ffi::OsString;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::provisioner::ProvisionerSettings;

/// Scaleway credentials and endpoint derived from environment variables,
/// configuration files, and defaults.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "SCW",
    discovery(
        app_name = "diskprov",
        env_var = "DISKPROV_CONFIG_PATH",
        config_file_name = "diskprov.toml",
        dotfile_name = ".diskprov.toml",
        project_file_name = "diskprov.toml"
    )
)]
pub struct ScalewayConfig {
    /// Access key assigned to the Scaleway application. Not needed for API
    /// calls; captured so operators can tell which key a deployment uses.
    pub access_key: Option<String>,
    /// Secret key used for authentication. This value is required.
    pub secret_key: String,
    /// Project identifier that owns created disks.
    pub default_project_id: String,
    /// Base URL of the Scaleway API.
    #[ortho_config(default = "https://api.scaleway.com".to_owned())]
    pub api_url: String,
}

/// Lifecycle timing knobs.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "DISKPROV",
    discovery(
        app_name = "diskprov",
        env_var = "DISKPROV_CONFIG_PATH",
        config_file_name = "diskprov.toml",
        dotfile_name = ".diskprov.toml",
        project_file_name = "diskprov.toml"
    )
)]
pub struct ProvisionerConfig {
    /// Seconds to wait for a new disk to become available.
    #[ortho_config(default = 60)]
    pub provision_timeout_secs: u64,
    /// Seconds to wait for a disk to become free before deleting it.
    #[ortho_config(default = 30)]
    pub delete_timeout_secs: u64,
    /// Seconds between status polls.
    #[ortho_config(default = 5)]
    pub poll_interval_secs: u64,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }

    fn missing(&self) -> ConfigError {
        ConfigError::MissingField(format!(
            "missing {}: set {} or add {} to diskprov.toml",
            self.description, self.env_var, self.toml_key
        ))
    }
}

fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(metadata.missing());
    }
    Ok(())
}

fn require_positive(value: u64, metadata: &FieldMetadata) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue(format!(
            "{} must be greater than zero: set {} or {} in diskprov.toml",
            metadata.description, metadata.env_var, metadata.toml_key
        )));
    }
    Ok(())
}

impl ScalewayConfig {
    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("diskprov")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on required fields. Error messages name
    /// the environment variable and TOML key that supply each value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_field(
            &self.secret_key,
            &FieldMetadata::new("Scaleway API secret key", "SCW_SECRET_KEY", "secret_key"),
        )?;
        require_field(
            &self.default_project_id,
            &FieldMetadata::new(
                "Scaleway project ID",
                "SCW_DEFAULT_PROJECT_ID",
                "default_project_id",
            ),
        )?;
        require_field(
            &self.api_url,
            &FieldMetadata::new("Scaleway API URL", "SCW_API_URL", "api_url"),
        )?;
        Ok(())
    }
}

impl ProvisionerConfig {
    /// Loads configuration without attempting to parse CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("diskprov")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Rejects zero durations.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when any duration is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive(
            self.provision_timeout_secs,
            &FieldMetadata::new(
                "provision timeout",
                "DISKPROV_PROVISION_TIMEOUT_SECS",
                "provision_timeout_secs",
            ),
        )?;
        require_positive(
            self.delete_timeout_secs,
            &FieldMetadata::new(
                "delete timeout",
                "DISKPROV_DELETE_TIMEOUT_SECS",
                "delete_timeout_secs",
            ),
        )?;
        require_positive(
            self.poll_interval_secs,
            &FieldMetadata::new(
                "poll interval",
                "DISKPROV_POLL_INTERVAL_SECS",
                "poll_interval_secs",
            ),
        )?;
        Ok(())
    }

    /// Wait budgets for the provisioner.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when validation fails.
    pub fn settings(&self) -> Result<ProvisionerSettings, ConfigError> {
        self.validate()?;
        Ok(ProvisionerSettings {
            provision_timeout: Duration::from_secs(self.provision_timeout_secs),
            delete_timeout: Duration::from_secs(self.delete_timeout_secs),
        })
    }

    /// Delay between status polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Builds a configuration equivalent to the given lifecycle settings.
    ///
    /// Durations are rounded up to whole seconds, so a sub-second budget
    /// never collapses to zero.
    #[must_use]
    pub const fn from_settings(settings: ProvisionerSettings, poll_interval: Duration) -> Self {
        Self {
            provision_timeout_secs: ceil_secs(settings.provision_timeout),
            delete_timeout_secs: ceil_secs(settings.delete_timeout),
            poll_interval_secs: ceil_secs(poll_interval),
        }
    }
}

const fn ceil_secs(duration: Duration) -> u64 {
    if duration.subsec_nanos() > 0 {
        duration.as_secs().saturating_add(1)
    } else {
        duration.as_secs()
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a field holds a value outside its accepted range.
    #[error("invalid configuration value: {0}")]
    InvalidValue(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn scaleway() -> ScalewayConfig {
        ScalewayConfig {
            access_key: None,
            secret_key: String::from("secret"),
            default_project_id: String::from("project"),
            api_url: String::from("https://api.scaleway.com"),
        }
    }

    #[rstest]
    fn valid_scaleway_config_passes(scaleway: ScalewayConfig) {
        assert_eq!(scaleway.validate(), Ok(()));
    }

    #[rstest]
    #[case("SCW_SECRET_KEY", "secret_key")]
    #[case("SCW_DEFAULT_PROJECT_ID", "default_project_id")]
    #[case("SCW_API_URL", "api_url")]
    fn blank_fields_produce_actionable_errors(
        scaleway: ScalewayConfig,
        #[case] env_var: &str,
        #[case] toml_key: &str,
    ) {
        let cfg = match toml_key {
            "secret_key" => ScalewayConfig {
                secret_key: String::from("  "),
                ..scaleway
            },
            "default_project_id" => ScalewayConfig {
                default_project_id: String::new(),
                ..scaleway
            },
            _ => ScalewayConfig {
                api_url: String::new(),
                ..scaleway
            },
        };
        let message = cfg.validate().expect_err("should fail").to_string();
        assert!(message.contains(env_var), "{message}");
        assert!(message.contains(toml_key), "{message}");
        assert!(message.contains("diskprov.toml"), "{message}");
    }

    fn default_provisioner_config() -> ProvisionerConfig {
        ProvisionerConfig::from_settings(ProvisionerSettings::default(), Duration::from_secs(5))
    }

    #[rstest]
    fn default_provisioner_config_matches_lifecycle_defaults() {
        let cfg = default_provisioner_config();
        let settings = cfg.settings().expect("defaults are valid");
        assert_eq!(settings, ProvisionerSettings::default());
        assert_eq!(cfg.poll_interval(), Duration::from_secs(5));
    }

    #[rstest]
    fn sub_second_durations_round_up_to_whole_seconds() {
        let cfg = ProvisionerConfig::from_settings(
            ProvisionerSettings {
                provision_timeout: Duration::from_millis(1500),
                delete_timeout: Duration::from_secs(30),
            },
            Duration::from_millis(500),
        );
        assert_eq!(cfg.provision_timeout_secs, 2);
        assert_eq!(cfg.delete_timeout_secs, 30);
        assert_eq!(cfg.poll_interval(), Duration::from_secs(1));
        assert!(cfg.settings().is_ok(), "rounded config should validate");
    }

    #[rstest]
    fn zero_durations_are_rejected() {
        let cfg = ProvisionerConfig {
            delete_timeout_secs: 0,
            ..default_provisioner_config()
        };
        let err = cfg.settings().expect_err("zero timeout is invalid");
        assert!(matches!(err, ConfigError::InvalidValue(ref msg) if msg.contains("DISKPROV_DELETE_TIMEOUT_SECS")));
    }
}
