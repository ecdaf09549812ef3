//! Configuration: static defaults merged with an optional YAML override file,
//! plus the API secrets read from the environment.

use crate::error::{Error, Result};
use chrono::{Duration, NaiveTime, Timelike};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the Business API endpoint
pub const ENV_API_URL: &str = "WHATSAPP_API_URL";
/// Environment variable holding the bearer token
pub const ENV_API_TOKEN: &str = "WHATSAPP_API_TOKEN";
/// Environment variable holding the sender phone ID
pub const ENV_SENDER_ID: &str = "SENDER_PHONE_ID";

/// Minutes ahead of "now" used for the default fallback send time
pub const DEFAULT_SEND_DELAY_MINUTES: i64 = 2;

/// Effective configuration for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub use_api: bool,
    pub default_message_file: PathBuf,
    pub default_contacts_file: PathBuf,
    pub log_file: PathBuf,
    /// Seconds WhatsApp Web is given to load before sending
    pub wait_time: u64,
    pub send_hour: u32,
    pub send_minute: u32,
    /// Destination hint for alerts; not delivered to yet
    pub alert_email: String,
    pub request_timeout_secs: u64,
    /// Program used to open the WhatsApp Web URL
    pub browser_command: String,
    /// Program + args run once the page has loaded, e.g. `["xdotool", "key", "Return"]`
    pub submit_command: Option<Vec<String>>,
}

/// User overrides as read from the YAML file. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigOverrides {
    pub use_api: Option<bool>,
    pub default_message_file: Option<PathBuf>,
    pub default_contacts_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub wait_time: Option<u64>,
    pub send_hour: Option<u32>,
    pub send_minute: Option<u32>,
    pub alert_email: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub browser_command: Option<String>,
    pub submit_command: Option<Vec<String>>,
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(PathBuf),
    /// Override file was absent
    Defaults(PathBuf),
}

/// Default fallback send time: `now` plus two minutes, wrapping past midnight.
pub fn default_send_time(now: NaiveTime) -> (u32, u32) {
    let at = now + Duration::minutes(DEFAULT_SEND_DELAY_MINUTES);
    (at.hour(), at.minute())
}

fn default_browser_command() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    }
}

impl Config {
    /// Static defaults. Every key is populated.
    pub fn defaults(now: NaiveTime) -> Self {
        let (send_hour, send_minute) = default_send_time(now);
        Self {
            use_api: true,
            default_message_file: PathBuf::from("message.txt"),
            default_contacts_file: PathBuf::from("contacts.txt"),
            log_file: PathBuf::from("logs/send.log"),
            wait_time: 15,
            send_hour,
            send_minute,
            alert_email: "admin@example.com".to_string(),
            request_timeout_secs: 30,
            browser_command: default_browser_command().to_string(),
            submit_command: None,
        }
    }

    /// Create config for testing with all paths under `temp_dir`
    pub fn for_test(temp_dir: &Path) -> Self {
        Self {
            default_message_file: temp_dir.join("message.txt"),
            default_contacts_file: temp_dir.join("contacts.txt"),
            log_file: temp_dir.join("logs/send.log"),
            ..Self::defaults(NaiveTime::MIN)
        }
    }

    /// Apply user overrides key by key; absent keys keep their default.
    pub fn merge(self, o: ConfigOverrides) -> Self {
        Self {
            use_api: o.use_api.unwrap_or(self.use_api),
            default_message_file: o.default_message_file.unwrap_or(self.default_message_file),
            default_contacts_file: o
                .default_contacts_file
                .unwrap_or(self.default_contacts_file),
            log_file: o.log_file.unwrap_or(self.log_file),
            wait_time: o.wait_time.unwrap_or(self.wait_time),
            send_hour: o.send_hour.unwrap_or(self.send_hour),
            send_minute: o.send_minute.unwrap_or(self.send_minute),
            alert_email: o.alert_email.unwrap_or(self.alert_email),
            request_timeout_secs: o.request_timeout_secs.unwrap_or(self.request_timeout_secs),
            browser_command: o.browser_command.unwrap_or(self.browser_command),
            submit_command: o.submit_command.or(self.submit_command),
        }
    }

    /// Parse a YAML override document and merge it over the defaults
    pub fn from_yaml_str(content: &str, now: NaiveTime) -> Result<Self> {
        let overrides = if content.trim().is_empty() {
            ConfigOverrides::default()
        } else {
            serde_yaml::from_str::<Option<ConfigOverrides>>(content)?.unwrap_or_default()
        };

        let config = Self::defaults(now).merge(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`. A missing file is not an error:
    /// the defaults are returned and the source says so.
    pub fn load(path: &Path, now: NaiveTime) -> Result<(Self, ConfigSource)> {
        if !path.exists() {
            return Ok((Self::defaults(now), ConfigSource::Defaults(path.to_path_buf())));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content, now)?;
        Ok((config, ConfigSource::File(path.to_path_buf())))
    }

    fn validate(&self) -> Result<()> {
        if self.send_hour > 23 {
            return Err(Error::Config(format!(
                "send_hour must be 0-23, got {}",
                self.send_hour
            )));
        }
        if self.send_minute > 59 {
            return Err(Error::Config(format!(
                "send_minute must be 0-59, got {}",
                self.send_minute
            )));
        }
        if self.browser_command.trim().is_empty() {
            return Err(Error::Config("browser_command is empty".to_string()));
        }
        if matches!(&self.submit_command, Some(cmd) if cmd.is_empty()) {
            return Err(Error::Config("submit_command is empty".to_string()));
        }
        Ok(())
    }
}

/// Business API secrets, resolved at call time
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCredentials {
    pub url: String,
    pub token: String,
    pub sender_id: String,
}

impl ApiCredentials {
    /// Read the three required variables from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve through `lookup`; empty values count as missing
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let url = get(ENV_API_URL);
        let token = get(ENV_API_TOKEN);
        let sender_id = get(ENV_SENDER_ID);

        match (url, token, sender_id) {
            (Some(url), Some(token), Some(sender_id)) => Ok(Self {
                url,
                token,
                sender_id,
            }),
            (url, token, sender_id) => {
                let missing = [
                    (ENV_API_URL, url.is_none()),
                    (ENV_API_TOKEN, token.is_none()),
                    (ENV_SENDER_ID, sender_id.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(Error::MissingEnv(missing))
            }
        }
    }
}
