use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context};

use crate::common::CapabilityMap;
use crate::common::Channel;
use crate::common::ChannelId;
use crate::common::ChannelList;
use crate::common::LivestreamCapability;
use crate::common::Show;
use crate::common::ShowList;


/// Static channel, show and livestream-capability data.
///
/// Loaded once at startup and never mutated afterwards; handlers share it through an `Arc`.
#[derive(Clone)]
#[derive(Debug)]
#[derive(Serialize, Deserialize)]
pub struct Catalog {
	channels: ChannelList,
	#[serde(default)]
	shows: ShowList,
	/// Keyed by `Channel::key`. Channels without an entry support no livestreams.
	#[serde(default)]
	livestreams: CapabilityMap,
}

impl Catalog {
	pub fn new(channels: ChannelList, shows: ShowList, livestreams: CapabilityMap) -> anyhow::Result<Self> {
		let catalog = Catalog { channels, shows, livestreams };
		catalog.validate()?;
		Ok(catalog)
	}

	/// The built-in demo lineup.
	pub fn demo() -> Self {
		let channels = vec![
			channel(1, "ct", "Česká televize", "Veřejnoprávní TV"),
			channel(2, "prima", "Prima", "Komerční TV"),
			channel(3, "nova", "Nova", "Komerční TV"),
			channel(4, "cn", "Cartoon Network", "Animovaný program"),
			channel(5, "discovery", "Discovery", "Dokumenty"),
		];

		let shows = vec![
			show(101, 1, "Události", "News"),
			show(102, 1, "168 hodin", "News Magazine"),
			show(201, 2, "Show Jana Krause", "Talk Show"),
			show(301, 3, "Ulice", "Drama"),
			show(401, 4, "Gumball", "Animation"),
			show(501, 5, "MythBusters", "Documentary"),
		];

		let news = || capability("news", "News Livestream");
		let sports = || capability("sports", "Sports Livestream");
		let fun = || capability("fun", "Fun Livestream");

		let livestreams = CapabilityMap::from([
			("ct".to_string(), vec![news(), sports()]),
			("prima".to_string(), vec![news()]),
			("nova".to_string(), vec![news(), fun()]),
			("cn".to_string(), vec![fun()]),
			("discovery".to_string(), vec![]),
		]);

		Catalog { channels, shows, livestreams }
	}

	pub fn from_yaml_file(path: &Path) -> anyhow::Result<Self> {
		let file = File::open(path)
			.with_context(|| format!("Failed to open catalog file {}", path.display()))?;
		let catalog: Catalog = serde_yaml::from_reader(BufReader::new(file))
			.with_context(|| format!("Failed to parse catalog file {}", path.display()))?;
		catalog.validate()
			.with_context(|| format!("Invalid catalog file {}", path.display()))?;
		Ok(catalog)
	}

	pub fn validate(&self) -> anyhow::Result<()> {
		let mut ids = HashSet::new();
		let mut keys = HashSet::new();
		for channel in &self.channels {
			if !ids.insert(channel.id) {
				bail!("duplicate channel id {}", channel.id);
			}
			if !keys.insert(channel.key.as_str()) {
				bail!("duplicate channel key '{}'", channel.key);
			}
		}

		for show in &self.shows {
			if !ids.contains(&show.channel_id) {
				bail!("show {} references unknown channel {}", show.id, show.channel_id);
			}
		}

		for (key, capabilities) in &self.livestreams {
			let mut kinds = HashSet::new();
			for capability in capabilities {
				if capability.kind.trim().is_empty() {
					bail!("channel '{}' declares a livestream with an empty type", key);
				}
				if !kinds.insert(capability.kind.as_str()) {
					bail!("channel '{}' declares livestream type '{}' twice", key, capability.kind);
				}
			}
		}

		Ok(())
	}

	pub fn channels(&self) -> &[Channel] {
		&self.channels
	}

	pub fn find_channel_by_id(&self, id: ChannelId) -> Option<&Channel> {
		self.channels.iter().find(|channel| channel.id == id)
	}

	pub fn get_capabilities(&self, channel_key: &str) -> &[LivestreamCapability] {
		self.livestreams
			.get(channel_key)
			.map(|capabilities| capabilities.as_slice())
			.unwrap_or(&[])
	}

	pub fn shows_for_channel(&self, id: ChannelId) -> ShowList {
		self.shows
			.iter()
			.filter(|show| show.channel_id == id)
			.cloned()
			.collect()
	}

	pub fn show_count(&self) -> usize {
		self.shows.len()
	}
}

fn channel(id: ChannelId, key: &str, name: &str, description: &str) -> Channel {
	Channel {
		id,
		key: key.to_string(),
		name: name.to_string(),
		description: description.to_string(),
	}
}

fn show(id: u64, channel_id: ChannelId, title: &str, genre: &str) -> Show {
	Show {
		id,
		channel_id,
		title: title.to_string(),
		genre: Some(genre.to_string()),
	}
}

fn capability(kind: &str, label: &str) -> LivestreamCapability {
	LivestreamCapability {
		kind: kind.to_string(),
		label: label.to_string(),
		stream_url: None,
	}
}
