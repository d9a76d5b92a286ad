use std::{env, time::Duration};

use eyre::{Result, WrapErr};

pub const DEFAULT_FROM_NAME: &str = "TutorBook";

#[derive(Debug, Clone, PartialEq)]
pub struct MailConfig {
    pub api_url: String,
    pub username: String,
    pub password: String,
    pub from_name: String,
    pub queue_capacity: usize,
    pub max_in_flight: usize,
    pub timeout: Duration,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            username: String::new(),
            password: String::new(),
            from_name: DEFAULT_FROM_NAME.to_string(),
            queue_capacity: 100,
            max_in_flight: 4,
            timeout: Duration::from_secs(10),
        }
    }
}

impl MailConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let queue_capacity = match lookup("MAIL_QUEUE_CAPACITY") {
            Some(value) => value.parse().wrap_err("MAIL_QUEUE_CAPACITY must be a number")?,
            None => defaults.queue_capacity,
        };
        let max_in_flight = match lookup("MAIL_MAX_IN_FLIGHT") {
            Some(value) => value.parse().wrap_err("MAIL_MAX_IN_FLIGHT must be a number")?,
            None => defaults.max_in_flight,
        };
        let timeout = match lookup("MAIL_TIMEOUT_SECONDS") {
            Some(value) => Duration::from_secs(
                value.parse().wrap_err("MAIL_TIMEOUT_SECONDS must be a number")?,
            ),
            None => defaults.timeout,
        };

        Ok(Self {
            api_url: lookup("MAIL_API_URL").unwrap_or_default(),
            username: lookup("MAIL_USERNAME").unwrap_or_default(),
            password: lookup("MAIL_PASSWORD").unwrap_or_default(),
            from_name: lookup("MAIL_FROM_NAME").unwrap_or(defaults.from_name),
            queue_capacity: queue_capacity.max(1),
            max_in_flight: max_in_flight.max(1),
            timeout,
        })
    }

    /// Mail is only sent when the endpoint and both credentials are present.
    pub fn is_configured(&self) -> bool {
        !self.api_url.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }

    pub fn sender(&self) -> String {
        format!("{} <{}>", self.from_name, self.username)
    }
}
