//! Configuration loading via `ortho-config`.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Known OVH API endpoint aliases and their base URLs.
const ENDPOINTS: &[(&str, &str)] = &[
    ("ovh-eu", "https://eu.api.ovh.com/1.0"),
    ("ovh-ca", "https://ca.api.ovh.com/1.0"),
    ("ovh-us", "https://api.us.ovhcloud.com/1.0"),
    ("kimsufi-eu", "https://eu.api.kimsufi.com/1.0"),
    ("kimsufi-ca", "https://ca.api.kimsufi.com/1.0"),
    ("soyoustart-eu", "https://eu.api.soyoustart.com/1.0"),
    ("soyoustart-ca", "https://ca.api.soyoustart.com/1.0"),
];

/// OVHcloud provider configuration derived from environment variables,
/// configuration files, and CLI flags.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "OVH")]
pub struct OvhConfig {
    /// API endpoint alias (for example `ovh-eu`) or a full base URL.
    #[ortho_config(default = "ovh-eu".to_owned())]
    pub endpoint: String,
    /// Application key identifying the API application.
    pub application_key: String,
    /// Application secret used to sign requests.
    pub application_secret: String,
    /// Consumer key granting the application access to the account.
    pub consumer_key: String,
    /// Public Cloud project identifier (the `serviceName` in API paths).
    pub service_id: String,
    /// Region in which the pool lives (for example `GRA7`).
    pub region: String,
    /// Pool name. New instances use it verbatim and listings keep only
    /// instances whose name starts with it.
    pub name: String,
    /// Flavor name for new instances (for example `b2-7`).
    pub flavor: String,
    /// Snapshot name used as the boot image.
    pub snapshot: String,
    /// Name of the SSH key installed on new instances.
    pub ssh_key: String,
    /// Optional cap on non-terminating instances in the project.
    pub max_running_instances: Option<u32>,
    /// Port the pool's workload listens on.
    pub instance_port: Option<u16>,
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

    fn guidance(&self) -> String {
        format!(
            "missing {}: set {} or add {} to [ovh] in ovhcloud.toml",
            self.description, self.env_var, self.toml_key
        )
    }
}

impl OvhConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(metadata.guidance()));
        }
        Ok(())
    }

    /// Loads configuration using the `ortho-config` derive. Values merge
    /// defaults, configuration files, environment variables, and CLI flags in
    /// that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the loader fails to merge sources.
    pub fn load_from_sources() -> Result<Self, ConfigError> {
        Self::load().map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("ovhcloud-provider")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Resolves the endpoint alias or URL to the API base URL, without a
    /// trailing slash.
    #[must_use]
    pub fn api_base_url(&self) -> Option<String> {
        let endpoint = self.endpoint.trim();
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return Some(endpoint.trim_end_matches('/').to_owned());
        }
        ENDPOINTS
            .iter()
            .find(|(alias, _)| *alias == endpoint)
            .map(|(_, url)| (*url).to_owned())
    }

    /// Returns the validated workload port.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when no port is configured and
    /// [`ConfigError::InvalidField`] when it is zero.
    pub fn port(&self) -> Result<u16, ConfigError> {
        match self.instance_port {
            None => Err(ConfigError::MissingField(
                FieldMetadata::new("instance port", "OVH_INSTANCE_PORT", "instance_port")
                    .guidance(),
            )),
            Some(0) => Err(ConfigError::InvalidField {
                field: String::from("instance_port"),
                reason: String::from("must be a positive TCP port"),
            }),
            Some(port) => Ok(port),
        }
    }

    /// Performs semantic validation on required fields. Error messages include
    /// guidance on how to provide missing values via environment variables or
    /// configuration files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty and
    /// [`ConfigError::InvalidField`] when the endpoint or port is unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            (
                &self.application_key,
                FieldMetadata::new(
                    "OVH application key",
                    "OVH_APPLICATION_KEY",
                    "application_key",
                ),
            ),
            (
                &self.application_secret,
                FieldMetadata::new(
                    "OVH application secret",
                    "OVH_APPLICATION_SECRET",
                    "application_secret",
                ),
            ),
            (
                &self.consumer_key,
                FieldMetadata::new("OVH consumer key", "OVH_CONSUMER_KEY", "consumer_key"),
            ),
            (
                &self.service_id,
                FieldMetadata::new("Public Cloud project ID", "OVH_SERVICE_ID", "service_id"),
            ),
            (
                &self.region,
                FieldMetadata::new("region", "OVH_REGION", "region"),
            ),
            (
                &self.name,
                FieldMetadata::new("pool name", "OVH_NAME", "name"),
            ),
            (
                &self.flavor,
                FieldMetadata::new("flavor name", "OVH_FLAVOR", "flavor"),
            ),
            (
                &self.snapshot,
                FieldMetadata::new("snapshot name", "OVH_SNAPSHOT", "snapshot"),
            ),
            (
                &self.ssh_key,
                FieldMetadata::new("SSH key name", "OVH_SSH_KEY", "ssh_key"),
            ),
        ];
        for (value, metadata) in &required {
            Self::require_field(value, metadata)?;
        }

        if self.api_base_url().is_none() {
            return Err(ConfigError::InvalidField {
                field: String::from("endpoint"),
                reason: format!(
                    "'{}' is neither a known endpoint alias nor an http(s) URL",
                    self.endpoint
                ),
            });
        }

        self.port()?;
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a configuration field holds an unusable value.
    #[error("invalid configuration field {field}: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
