use serde::{Deserialize, Serialize};

/// Identifier of a media item as handed out by the catalog listing.
#[derive(
	derive_more::From,
	derive_more::Into,
	derive_more::Deref,
	derive_more::Display,
	Debug,
	Clone,
	PartialEq,
	Eq,
	Hash,
	PartialOrd,
	Ord,
	Serialize,
	Deserialize,
)]
#[serde(transparent)]
pub struct MediaId(String);

impl From<&str> for MediaId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

impl AsRef<str> for MediaId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
