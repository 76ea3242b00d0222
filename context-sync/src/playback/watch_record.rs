use crate::client_context::played_for::parse_played_for;
use chrono::{DateTime, Utc};
use serde::de::{IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Formatter;

/// Watch progress of a single media item.
///
/// `viewed_at` is only set once playback actually produced a progress event, so a record
/// with `played_for == 0.0` and `viewed_at == None` means "never played", not "played at 0".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchRecord {
	#[serde(default)]
	pub name: String,
	/// Playback offset in seconds.
	#[serde(default, deserialize_with = "deserialize_played_for")]
	pub played_for: f64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub viewed_at: Option<DateTime<Utc>>,
}

impl WatchRecord {
	pub fn progress(played_for: f64, viewed_at: DateTime<Utc>) -> Self {
		Self {
			name: String::new(),
			played_for,
			viewed_at: Some(viewed_at),
		}
	}

	pub fn has_been_viewed(&self) -> bool {
		self.viewed_at.is_some()
	}
}

/// Older clients wrote the offset back as a string, sometimes already formatted for display.
/// Numbers, numeric strings and display strings like `1 minute 5 seconds` are read back into
/// seconds. Everything else reads as zero.
fn deserialize_played_for<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
	D: Deserializer<'de>,
{
	deserializer.deserialize_any(PlayedForVisitor)
}

struct PlayedForVisitor;

impl<'de> Visitor<'de> for PlayedForVisitor {
	type Value = f64;

	fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
		formatter.write_str("a number of seconds")
	}

	#[allow(clippy::cast_precision_loss)]
	fn visit_i64<E>(self, number: i64) -> Result<Self::Value, E>
	where
		E: serde::de::Error,
	{
		Ok(number.max(0) as f64)
	}

	#[allow(clippy::cast_precision_loss)]
	fn visit_u64<E>(self, number: u64) -> Result<Self::Value, E>
	where
		E: serde::de::Error,
	{
		Ok(number as f64)
	}

	fn visit_f64<E>(self, number: f64) -> Result<Self::Value, E>
	where
		E: serde::de::Error,
	{
		Ok(if number.is_finite() { number.max(0.0) } else { 0.0 })
	}

	fn visit_str<E>(self, text: &str) -> Result<Self::Value, E>
	where
		E: serde::de::Error,
	{
		Ok(text
			.trim()
			.parse::<f64>()
			.ok()
			.filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
			.or_else(|| parse_played_for(text))
			.unwrap_or_default())
	}

	fn visit_bool<E>(self, _value: bool) -> Result<Self::Value, E>
	where
		E: serde::de::Error,
	{
		Ok(0.0)
	}

	fn visit_unit<E>(self) -> Result<Self::Value, E>
	where
		E: serde::de::Error,
	{
		Ok(0.0)
	}

	fn visit_seq<A>(self, mut sequence: A) -> Result<Self::Value, A::Error>
	where
		A: SeqAccess<'de>,
	{
		while sequence.next_element::<IgnoredAny>()?.is_some() {}
		Ok(0.0)
	}

	fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
	where
		A: MapAccess<'de>,
	{
		while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
		Ok(0.0)
	}
}
