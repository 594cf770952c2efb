//! Configuration types shared across crates.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Directory holding the `keys/`, `drop/` and `serve/` trees.
    #[serde(default = "default_content_root")]
    pub content_root: PathBuf,
    /// Allow listing the files of a serve directory.
    /// When false the listing endpoint always answers 403.
    #[serde(default)]
    pub browse_files: bool,
    /// Maximum accepted upload request body in bytes (0 = unlimited).
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Enable the /metrics endpoint for Prometheus scraping.
    #[serde(default)]
    pub metrics_enabled: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_content_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_max_upload_bytes() -> u64 {
    1024 * 1024 * 1024 // 1 GiB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            content_root: default_content_root(),
            browse_files: false,
            max_upload_bytes: default_max_upload_bytes(),
            metrics_enabled: false,
        }
    }
}

impl ServerConfig {
    /// Upload body limit, or `None` when uploads are unbounded.
    pub fn upload_limit(&self) -> Option<usize> {
        match self.max_upload_bytes {
            0 => None,
            n => Some(usize::try_from(n).unwrap_or(usize::MAX)),
        }
    }
}

/// Upload notification configuration.
///
/// Immutable after startup. When `enabled` is false every other field is
/// ignored and no mail server is ever contacted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Send periodic upload summaries.
    #[serde(default)]
    pub enabled: bool,
    /// Seconds between two delivery attempts (default: 3 minutes).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// SMTP server host name.
    pub server_address: Option<String>,
    /// SMTP server port.
    #[serde(default)]
    pub server_port: u16,
    /// Connect with implicit TLS. When false STARTTLS is used if offered.
    #[serde(default)]
    pub use_tls: bool,
    /// SMTP username. Must be set together with `password`.
    #[serde(default, deserialize_with = "lenient::option_string")]
    pub username: Option<String>,
    /// SMTP password.
    /// WARNING: Prefer PARCEL_NOTIFICATIONS__PASSWORD over storing it in a file.
    /// Environment values are parsed, so quote one that has leading zeros:
    /// `PARCEL_NOTIFICATIONS__PASSWORD='"007"'`.
    #[serde(default, deserialize_with = "lenient::option_string")]
    pub password: Option<String>,
    /// Envelope and header sender address.
    pub sender_email: Option<String>,
    /// Display name used for the sender.
    #[serde(
        default = "default_sender_name",
        deserialize_with = "lenient::string"
    )]
    pub sender_name: String,
    /// Semicolon separated recipient list.
    pub recipients: Option<String>,
    /// Put entries of a failed delivery back so the next tick retries them.
    #[serde(default = "default_requeue_on_failure")]
    pub requeue_on_failure: bool,
}

fn default_interval_secs() -> u64 {
    180
}

fn default_sender_name() -> String {
    "Secure File Exchange".to_string()
}

fn default_requeue_on_failure() -> bool {
    true
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_interval_secs(),
            server_address: None,
            server_port: 0,
            use_tls: false,
            username: None,
            password: None,
            sender_email: None,
            sender_name: default_sender_name(),
            recipients: None,
            requeue_on_failure: default_requeue_on_failure(),
        }
    }
}

impl NotificationConfig {
    /// Get the delivery interval as a Duration.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Split the recipient list on `;`, dropping blanks.
    pub fn recipient_list(&self) -> Vec<String> {
        self.recipients
            .as_deref()
            .unwrap_or_default()
            .split(';')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Credentials pair, present only when both halves are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }

    /// Validate the enabled-notification invariants.
    pub fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        if is_blank(self.server_address.as_deref()) {
            return Err("notifications.server_address is required when enabled".to_string());
        }

        if self.server_port == 0 {
            return Err("notifications.server_port is required when enabled".to_string());
        }

        if is_blank(self.sender_email.as_deref()) {
            return Err("notifications.sender_email is required when enabled".to_string());
        }

        if self.recipient_list().is_empty() {
            return Err(
                "notifications.recipients must name at least one address when enabled"
                    .to_string(),
            );
        }

        match (self.username.as_ref(), self.password.as_ref()) {
            (Some(_), Some(_)) | (None, None) => {}
            _ => {
                return Err(
                    "notifications requires both username and password when either is set"
                        .to_string(),
                );
            }
        }

        if self.interval_secs == 0 {
            return Err("notifications.interval_secs cannot be 0".to_string());
        }

        Ok(())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upload notification configuration.
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl AppConfig {
    /// Create a test configuration rooted at `content_root`.
    ///
    /// **For testing only.** Notifications are disabled.
    pub fn for_testing(content_root: impl Into<PathBuf>) -> Self {
        Self {
            server: ServerConfig {
                content_root: content_root.into(),
                ..Default::default()
            },
            notifications: NotificationConfig::default(),
        }
    }

    /// Validate every section, returning the first violation.
    pub fn validate(&self) -> crate::Result<()> {
        self.notifications
            .validate()
            .map_err(crate::Error::InvalidConfig)
    }
}

/// String fields that may arrive as numbers or booleans.
///
/// The environment provider types `12345` as an integer, which a plain
/// `String` field would reject.
mod lenient {
    use super::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Str(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Bool(bool),
    }

    impl From<Scalar> for String {
        fn from(value: Scalar) -> Self {
            match value {
                Scalar::Str(s) => s,
                Scalar::Unsigned(n) => n.to_string(),
                Scalar::Signed(n) => n.to_string(),
                Scalar::Float(n) => n.to_string(),
                Scalar::Bool(b) => b.to_string(),
            }
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Scalar::deserialize(deserializer).map(String::from)
    }

    pub fn option_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
    }
}
