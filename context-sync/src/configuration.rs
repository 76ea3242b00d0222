use serde::Deserialize;
use std::fs::read_to_string;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Configuration {
	/// Origin the gallery page is served from, the event stream lives on the same host.
	#[serde(with = "origin_deserializer")]
	pub page_origin: Url,
	#[serde(default = "default_event_stream_path")]
	pub event_stream_path: String,
	pub log_filters: String,
	pub database_url: String,
	#[serde(with = "non_zero_duration_deserializer", default = "default_push_interval")]
	pub push_interval: Duration,
	#[serde(with = "non_zero_duration_deserializer", default = "default_reconnect_delay")]
	pub reconnect_delay: Duration,
}

impl Configuration {
	pub fn from_file(path: impl AsRef<Path>) -> Result<Configuration, ConfigurationError> {
		let text = read_to_string(path)?;

		Ok(Configuration::try_from(text.as_str())?)
	}
}

impl TryFrom<&str> for Configuration {
	type Error = toml::de::Error;

	fn try_from(text: &str) -> Result<Self, Self::Error> {
		toml::from_str(text)
	}
}

fn default_event_stream_path() -> String {
	crate::endpoint::DEFAULT_EVENT_STREAM_PATH.to_string()
}

fn default_push_interval() -> Duration {
	Duration::from_secs(5 * 60)
}

fn default_reconnect_delay() -> Duration {
	Duration::from_secs(1)
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
	#[error("Failed to deserialize with error: {0}")]
	DeserializationError(#[from] toml::de::Error),
	#[error("IO operation failed: {0}")]
	IoError(#[from] std::io::Error),
}

mod origin_deserializer {
	use serde::{self, Deserialize, Deserializer};
	use url::Url;

	pub fn deserialize<'deserializer, D>(deserializer: D) -> Result<Url, D::Error>
	where
		D: Deserializer<'deserializer>,
	{
		let string = String::deserialize(deserializer)?;
		let origin = Url::parse(&string).map_err(serde::de::Error::custom)?;
		match origin.scheme() {
			"http" | "https" if origin.has_host() => Ok(origin),
			"http" | "https" => Err(serde::de::Error::custom(format!("page origin '{origin}' has no host"))),
			scheme => Err(serde::de::Error::custom(format!(
				"page origin must be an http or https url, got scheme '{scheme}'"
			))),
		}
	}
}

/// Timer periods must not be zero, intervals can't tick and reconnects would spin.
mod non_zero_duration_deserializer {
	use serde::{self, Deserializer};
	use std::time::Duration;

	pub fn deserialize<'deserializer, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: Deserializer<'deserializer>,
	{
		let duration: Duration = humantime_serde::deserialize(deserializer)?;
		if duration == Duration::ZERO {
			return Err(serde::de::Error::custom("duration must be greater than zero"));
		}
		Ok(duration)
	}
}
