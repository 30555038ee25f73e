#![forbid(unsafe_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use freshfold_domain::model::Message;
use freshfold_domain::{MessageId, RoomId, Session, Viewer};
use freshfold_store::StoreClient;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::hub::{HubItem, RoomHub};
use crate::TransportError;

/// Delivery confidence of a live channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
	/// Joined and, as far as the channel knows, complete.
	Joined,

	/// A send failed or the subscription lagged; outgoing messages may be
	/// unsent and the local projection may be missing items.
	Uncertain,
}

/// Events surfaced to the conversation view.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
	/// Authoritative copy of a new message (local or remote sender).
	Message(Message),

	/// The subscription dropped items; the view should re-fetch history.
	Lagged { dropped: u64 },
}

/// A send that has been emitted but not yet confirmed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
	pub seq: u64,
	pub content: String,
}

/// Per-view live connection to one room: join on entry, fire-and-forget
/// sends, receipt-ordered delivery with duplicate suppression, release on
/// leave or drop.
pub struct LiveChannel {
	room_id: RoomId,
	viewer: Viewer,
	store: StoreClient,
	hub: RoomHub,
	rx: mpsc::Receiver<HubItem>,

	seen: HashSet<MessageId>,

	next_seq: AtomicU64,
	pending: Arc<Mutex<BTreeMap<u64, PendingSend>>>,
	uncertain: Arc<AtomicBool>,
}

impl std::fmt::Debug for LiveChannel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LiveChannel")
			.field("room_id", &self.room_id)
			.field("viewer", &self.viewer)
			.finish_non_exhaustive()
	}
}

impl LiveChannel {
	/// Authenticate with the session credential and join a room.
	pub async fn join(hub: RoomHub, store: StoreClient, session: &Session, room_id: RoomId) -> Result<Self, TransportError> {
		if session.credential.expose().trim().is_empty() {
			return Err(TransportError::Unauthorized);
		}

		let rx = hub.subscribe_room(room_id.clone()).await;

		debug!(room = %room_id, viewer = %session.viewer.id, "live channel: joined");

		Ok(Self {
			room_id,
			viewer: session.viewer.clone(),
			store,
			hub,
			rx,
			seen: HashSet::new(),
			next_seq: AtomicU64::new(1),
			pending: Arc::new(Mutex::new(BTreeMap::new())),
			uncertain: Arc::new(AtomicBool::new(false)),
		})
	}

	pub fn room_id(&self) -> &RoomId {
		&self.room_id
	}

	/// Current delivery confidence. `Uncertain` sticks until the view is
	/// re-entered with a fresh channel.
	pub fn delivery(&self) -> Delivery {
		if self.uncertain.load(Ordering::SeqCst) {
			Delivery::Uncertain
		} else {
			Delivery::Joined
		}
	}

	/// Sends emitted but not yet confirmed. After a failure these remain
	/// here as unsent rather than disappearing.
	pub fn unsent(&self) -> Vec<PendingSend> {
		self.pending.lock().expect("pending lock").values().cloned().collect()
	}

	/// Suppress future delivery of already-rendered messages (the history
	/// fetched on view entry).
	pub fn suppress<I>(&mut self, ids: I)
	where
		I: IntoIterator<Item = MessageId>,
	{
		self.seen.extend(ids);
	}

	/// Fire-and-forget send. Returns the local sequence number of the
	/// pending entry; the authoritative copy (server id and timestamp)
	/// arrives through [`Self::recv`] like any remote message.
	pub fn send(&self, content: &str) -> Result<u64, TransportError> {
		let trimmed = content.trim();
		if trimmed.is_empty() {
			return Err(TransportError::EmptyContent);
		}

		let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
		self.pending.lock().expect("pending lock").insert(
			seq,
			PendingSend {
				seq,
				content: trimmed.to_string(),
			},
		);

		let store = self.store.clone();
		let hub = self.hub.clone();
		let room_id = self.room_id.clone();
		let viewer = self.viewer.clone();
		let content = trimmed.to_string();
		let pending = Arc::clone(&self.pending);
		let uncertain = Arc::clone(&self.uncertain);

		tokio::spawn(async move {
			match store.append_message(&room_id, viewer.role, &viewer.id, &content).await {
				Ok(message) => {
					hub.publish_message(message).await;
					pending.lock().expect("pending lock").remove(&seq);
				}
				Err(e) => {
					// Entry stays pending so the view can show it as
					// unsent instead of dropping it silently.
					uncertain.store(true, Ordering::SeqCst);
					warn!(room = %room_id, seq, error = %e, "live channel: send failed; delivery uncertain");
				}
			}
		});

		Ok(seq)
	}

	/// Next event in receipt order. A message id seen twice is discarded.
	/// Returns `None` once the hub side is gone.
	pub async fn recv(&mut self) -> Option<ChannelEvent> {
		while let Some(item) = self.rx.recv().await {
			match item {
				HubItem::Message(message) => {
					if !self.seen.insert(message.id) {
						continue;
					}
					return Some(ChannelEvent::Message(*message));
				}
				HubItem::Lagged { dropped } => {
					self.uncertain.store(true, Ordering::SeqCst);
					return Some(ChannelEvent::Lagged { dropped });
				}
			}
		}
		None
	}

	/// Non-blocking variant of [`Self::recv`].
	pub fn try_recv(&mut self) -> Option<ChannelEvent> {
		while let Ok(item) = self.rx.try_recv() {
			match item {
				HubItem::Message(message) => {
					if !self.seen.insert(message.id) {
						continue;
					}
					return Some(ChannelEvent::Message(*message));
				}
				HubItem::Lagged { dropped } => {
					self.uncertain.store(true, Ordering::SeqCst);
					return Some(ChannelEvent::Lagged { dropped });
				}
			}
		}
		None
	}

	/// Release the subscription. Dropping the channel releases it as well;
	/// this variant also prunes the hub entry eagerly.
	pub async fn leave(self) {
		let hub = self.hub.clone();
		let room_id = self.room_id.clone();

		drop(self);
		hub.prune_room(&room_id).await;
	}
}
