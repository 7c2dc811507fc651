use std::collections::HashMap;

use chrono::{DateTime, Utc};



pub type ChannelId = u64;
pub type ShowId = u64;
pub type ChannelKey = String;
pub type ChannelList = Vec<Channel>;
pub type ShowList = Vec<Show>;
pub type CapabilityList = Vec<LivestreamCapability>;
pub type CapabilityMap = HashMap<ChannelKey, CapabilityList>;

#[derive(Clone)]
#[derive(Debug, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct Channel {
	pub id: ChannelId,
	pub key: ChannelKey,
	pub name: String,
	#[serde(default)]
	pub description: String,
}

#[derive(Clone)]
#[derive(Debug, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Show {
	pub id: ShowId,
	pub channel_id: ChannelId,
	pub title: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub genre: Option<String>,
}

/// One livestream type a channel is allowed to broadcast.
#[derive(Clone)]
#[derive(Debug, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivestreamCapability {
	#[serde(rename = "type")]
	pub kind: String,
	pub label: String,
	/// Overrides the default playback locator for this type.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stream_url: Option<String>,
}

/// Wire view of the global livestream slot.
///
/// `channel_id`, `kind` and `started_at` are either all set (live) or all `None` (idle);
/// only `LivestreamController` builds these, so the pairing always holds.
#[derive(Clone)]
#[derive(Debug, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivestreamState {
	pub is_live: bool,
	pub channel_id: Option<ChannelId>,
	#[serde(rename = "type")]
	pub kind: Option<String>,
	pub started_at: Option<DateTime<Utc>>,
	pub stream_url: String,
}
