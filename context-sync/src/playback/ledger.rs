use crate::playback::media_id::MediaId;
use crate::playback::watch_record::WatchRecord;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Formatter;

/// All watch records, kept in the order their ids were first written.
///
/// Serializes as a JSON object `{ "<id>": WatchRecord }`. The ledger is bounded by the size of
/// the catalog, so lookups are linear.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ledger {
	entries: Vec<(MediaId, WatchRecord)>,
}

impl Ledger {
	pub fn get(&self, id: &MediaId) -> Option<&WatchRecord> {
		self.entries
			.iter()
			.find(|(entry_id, _)| entry_id == id)
			.map(|(_, record)| record)
	}

	/// Overwrites the record for `id`, keeping its position if it already existed.
	pub fn insert(&mut self, id: MediaId, record: WatchRecord) {
		*self.entry(id) = record;
	}

	/// Returns the record for `id`, appending a default record if there is none yet.
	pub fn entry(&mut self, id: MediaId) -> &mut WatchRecord {
		let index = match self.entries.iter().position(|(entry_id, _)| *entry_id == id) {
			Some(index) => index,
			None => {
				self.entries.push((id, WatchRecord::default()));
				self.entries.len() - 1
			}
		};
		&mut self.entries[index].1
	}

	pub fn iter(&self) -> impl Iterator<Item = (&MediaId, &WatchRecord)> {
		self.entries.iter().map(|(id, record)| (id, record))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl IntoIterator for Ledger {
	type Item = (MediaId, WatchRecord);
	type IntoIter = std::vec::IntoIter<(MediaId, WatchRecord)>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}

impl Serialize for Ledger {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut map = serializer.serialize_map(Some(self.entries.len()))?;
		for (id, record) in &self.entries {
			map.serialize_entry(id, record)?;
		}
		map.end()
	}
}

impl<'de> Deserialize<'de> for Ledger {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserializer.deserialize_map(LedgerVisitor)
	}
}

struct LedgerVisitor;

impl<'de> Visitor<'de> for LedgerVisitor {
	type Value = Ledger;

	fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
		formatter.write_str("a map from media id to watch record")
	}

	fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
	where
		A: MapAccess<'de>,
	{
		let mut ledger = Ledger::default();
		while let Some((id, record)) = map.next_entry::<MediaId, WatchRecord>()? {
			ledger.insert(id, record);
		}
		Ok(ledger)
	}
}
