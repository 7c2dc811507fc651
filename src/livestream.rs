use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::catalog::Catalog;
use crate::common::ChannelId;
use crate::common::LivestreamState;


pub const DEFAULT_STREAM_URL: &str = "sample-video.mp4";

#[derive(Debug, PartialEq, Eq, Error)]
pub enum LivestreamError {
	#[error("channelId and type are required")]
	InvalidRequest,

	#[error("Channel not found")]
	NotFound,

	#[error("This channel does not provide the requested livestream type")]
	UnsupportedCapability,
}

/// Body of a start request. Both fields are optional here so that a missing one is
/// reported as `InvalidRequest` rather than as a deserialization failure.
#[derive(Clone)]
#[derive(Debug, Default)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
	pub channel_id: Option<ChannelId>,
	#[serde(rename = "type")]
	pub kind: Option<String>,
}

impl StartRequest {
	pub fn new(channel_id: ChannelId, kind: impl Into<String>) -> Self {
		StartRequest {
			channel_id: Some(channel_id),
			kind: Some(kind.into()),
		}
	}
}

#[derive(Clone)]
#[derive(Debug, PartialEq)]
enum Broadcast {
	Idle,
	Live {
		channel_id: ChannelId,
		kind: String,
		started_at: DateTime<Utc>,
		stream_url: String,
	},
}

/// Owner of the single process-wide livestream slot.
///
/// Starting a stream replaces whatever was live before; there is no queue and no
/// "already live" error.
pub struct LivestreamController {
	catalog: Arc<Catalog>,
	default_stream_url: String,
	// Whole-value replacement under the write lock keeps readers from seeing a mix of two starts.
	broadcast: RwLock<Broadcast>,
}

impl LivestreamController {
	pub fn new(catalog: Arc<Catalog>, default_stream_url: impl Into<String>) -> Self {
		LivestreamController {
			catalog,
			default_stream_url: default_stream_url.into(),
			broadcast: RwLock::new(Broadcast::Idle),
		}
	}

	pub async fn status(&self) -> LivestreamState {
		let broadcast = self.broadcast.read().await;
		self.snapshot(&broadcast)
	}

	pub async fn start(&self, request: StartRequest) -> Result<LivestreamState, LivestreamError> {
		let (channel_id, kind, stream_url) = self.validate(request).map_err(|err| {
			warn!("Rejected livestream start: {}", err);
			err
		})?;

		let mut broadcast = self.broadcast.write().await;
		*broadcast = Broadcast::Live {
			channel_id,
			kind,
			started_at: Utc::now(),
			stream_url,
		};
		let state = self.snapshot(&broadcast);
		info!("Livestream started on channel {} ({})", channel_id, state.kind.as_deref().unwrap_or_default());
		Ok(state)
	}

	pub async fn stop(&self) -> LivestreamState {
		let mut broadcast = self.broadcast.write().await;
		if *broadcast != Broadcast::Idle {
			info!("Livestream stopped");
		}
		*broadcast = Broadcast::Idle;
		self.snapshot(&broadcast)
	}

	/// Checks presence, channel existence and capability, in that order.
	/// Only reads the immutable catalog, so it runs outside the lock.
	fn validate(&self, request: StartRequest) -> Result<(ChannelId, String, String), LivestreamError> {
		let (channel_id, kind) = match (request.channel_id, request.kind) {
			(Some(channel_id), Some(kind)) if !kind.trim().is_empty() => (channel_id, kind),
			_ => return Err(LivestreamError::InvalidRequest),
		};

		let channel = self.catalog
			.find_channel_by_id(channel_id)
			.ok_or(LivestreamError::NotFound)?;

		let capability = self.catalog
			.get_capabilities(&channel.key)
			.iter()
			.find(|capability| capability.kind == kind)
			.ok_or(LivestreamError::UnsupportedCapability)?;

		let stream_url = capability.stream_url
			.clone()
			.unwrap_or_else(|| self.default_stream_url.clone());

		Ok((channel_id, kind, stream_url))
	}

	fn snapshot(&self, broadcast: &Broadcast) -> LivestreamState {
		match broadcast {
			Broadcast::Idle => LivestreamState {
				is_live: false,
				channel_id: None,
				kind: None,
				started_at: None,
				stream_url: self.default_stream_url.clone(),
			},
			Broadcast::Live { channel_id, kind, started_at, stream_url } => LivestreamState {
				is_live: true,
				channel_id: Some(*channel_id),
				kind: Some(kind.clone()),
				started_at: Some(*started_at),
				stream_url: stream_url.clone(),
			},
		}
	}
}
