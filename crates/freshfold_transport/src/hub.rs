#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::Arc;

use freshfold_domain::RoomId;
use freshfold_domain::model::Message;
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

/// Per-room hub that fans live messages out to every joined subscriber.
///
/// Subscriber queues are bounded; when one overflows the hub drops the item
/// for that subscriber and delivers a [`HubItem::Lagged`] marker as soon as
/// the queue has room again, so a slow viewer learns its projection is
/// incomplete instead of silently missing messages.
#[derive(Debug, Clone)]
pub struct RoomHub {
	inner: Arc<Mutex<Inner>>,
	cfg: RoomHubConfig,
}

/// Configuration for `RoomHub`.
#[derive(Debug, Clone)]
pub struct RoomHubConfig {
	/// Maximum number of queued items per subscriber.
	pub subscriber_queue_capacity: usize,

	pub debug_logs: bool,
}

impl Default for RoomHubConfig {
	fn default() -> Self {
		Self {
			subscriber_queue_capacity: 256,
			debug_logs: false,
		}
	}
}

/// Items emitted on a subscriber stream.
#[derive(Debug, Clone)]
pub enum HubItem {
	/// Authoritative copy of a newly stored message.
	Message(Box<Message>),

	/// The subscriber lagged and items were dropped.
	Lagged { dropped: u64 },
}

#[derive(Debug, Default)]
struct Inner {
	rooms: HashMap<RoomId, Vec<Subscriber>>,
}

#[derive(Debug)]
struct Subscriber {
	tx: mpsc::Sender<HubItem>,

	/// Items dropped for this subscriber since its last successful
	/// delivery; flushed as a `Lagged` marker when possible.
	pending_lag: u64,
}

impl RoomHub {
	pub fn new(cfg: RoomHubConfig) -> Self {
		Self {
			inner: Arc::new(Mutex::new(Inner::default())),
			cfg,
		}
	}

	/// Join a room and receive its live items.
	pub async fn subscribe_room(&self, room: RoomId) -> mpsc::Receiver<HubItem> {
		let (tx, rx) = mpsc::channel(self.cfg.subscriber_queue_capacity);

		let mut inner = self.inner.lock().await;
		let subs = inner.rooms.entry(room.clone()).or_default();

		subs.retain(|s| !s.tx.is_closed());
		subs.push(Subscriber { tx, pending_lag: 0 });

		if self.cfg.debug_logs {
			debug!(room = %room, subs = subs.len(), "room hub: subscribed");
		}

		rx
	}

	/// Drop closed subscribers for a room; removes the room entry once
	/// nobody is left.
	pub async fn prune_room(&self, room: &RoomId) {
		let mut inner = self.inner.lock().await;
		if let Some(subs) = inner.rooms.get_mut(room) {
			subs.retain(|s| !s.tx.is_closed());
			if subs.is_empty() {
				inner.rooms.remove(room);
			}
		}
	}

	/// Publish a stored message to subscribers of its room.
	pub async fn publish_message(&self, message: Message) {
		let room = message.chat_room_id.clone();
		self.publish_to_room(room, HubItem::Message(Box::new(message))).await;
	}

	pub(crate) async fn publish_to_room(&self, room: RoomId, item: HubItem) {
		let mut inner = self.inner.lock().await;
		let Some(subs) = inner.rooms.get_mut(&room) else {
			return;
		};

		subs.retain(|s| !s.tx.is_closed());
		if subs.is_empty() {
			inner.rooms.remove(&room);
			return;
		}

		metrics::counter!("freshfold_hub_published_total").increment(1);

		let mut dropped_total: u64 = 0;

		for sub in subs.iter_mut() {
			match sub.tx.try_send(item.clone()) {
				Ok(()) => {
					if sub.pending_lag > 0
						&& sub.tx.try_send(HubItem::Lagged { dropped: sub.pending_lag }).is_ok()
					{
						sub.pending_lag = 0;
					}
				}
				Err(mpsc::error::TrySendError::Full(_)) => {
					dropped_total += 1;
					sub.pending_lag = sub.pending_lag.saturating_add(1);
				}
				Err(mpsc::error::TrySendError::Closed(_)) => {}
			}
		}

		subs.retain(|s| !s.tx.is_closed());
		if subs.is_empty() {
			inner.rooms.remove(&room);
		}

		if dropped_total > 0 {
			metrics::counter!("freshfold_hub_dropped_total").increment(dropped_total);

			if self.cfg.debug_logs {
				debug!(
					room = %room,
					dropped = dropped_total,
					"room hub: dropped due to full subscriber queues"
				);
			}
		}
	}

	/// Snapshot of live subscriber counts per room.
	pub async fn room_subscriber_counts(&self) -> HashMap<RoomId, usize> {
		let inner = self.inner.lock().await;
		inner
			.rooms
			.iter()
			.map(|(k, v)| (k.clone(), v.iter().filter(|s| !s.tx.is_closed()).count()))
			.collect()
	}
}
