use crate::playback::media_id::MediaId;
use serde::Deserialize;

/// Item of the server's catalog listing. Only the fields needed to name watch records are read.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct CatalogItem {
	#[serde(rename = "ID")]
	pub id: MediaId,
	#[serde(rename = "Name")]
	pub name: String,
	#[serde(rename = "MIMEType", default)]
	pub mime_type: String,
}

impl CatalogItem {
	pub fn is_video(&self) -> bool {
		self.mime_type.contains("video")
	}
}

pub fn parse_catalog(json: &str) -> Result<Vec<CatalogItem>, serde_json::Error> {
	serde_json::from_str(json)
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn should_parse_catalog_listing() {
		let json = r#"[
			{"ID": "abc", "Path": "/media/a.mp4", "Name": "A Movie", "MIMEType": "video/mp4", "Metadata": null},
			{"ID": "def", "Path": "/media/cover.jpg", "Name": "Cover", "MIMEType": "image/jpeg"}
		]"#;

		let items = parse_catalog(json).expect("Failed to parse catalog");

		assert_eq!(2, items.len());
		assert_eq!(MediaId::from("abc"), items[0].id);
		assert_eq!("A Movie", items[0].name);
		assert!(items[0].is_video());
		assert!(!items[1].is_video());
	}

	#[test]
	fn should_reject_catalog_without_ids() {
		parse_catalog(r#"[{"Name": "Nameless"}]"#).expect_err("Parsed catalog item without ID although it shouldn't");
	}
}
