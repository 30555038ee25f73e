#![forbid(unsafe_code)]

use freshfold_domain::label::display_label;
use freshfold_domain::model::Message;
use freshfold_domain::{RoomId, Session, Viewer};
use freshfold_store::StoreClient;
use freshfold_transport::{ChannelEvent, Delivery, LiveChannel, PendingSend, RoomHub};
use tracing::{debug, warn};

use crate::ChatError;
use crate::receipts::ReadReceiptTracker;

/// One open conversation view: the fetched history plus everything delivered
/// live while the view is mounted.
///
/// The local message vector is a read-through projection of the store, safe
/// to discard at any time; the store and hub remain the only shared truth
/// between simultaneous viewers of the same room. Dropping the value (or the
/// future returned by [`Conversation::open`]) tears everything down,
/// including the live subscription.
pub struct Conversation {
	room_id: RoomId,
	viewer: Viewer,
	messages: Vec<Message>,
	channel: LiveChannel,
}

impl std::fmt::Debug for Conversation {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Conversation")
			.field("room_id", &self.room_id)
			.field("viewer", &self.viewer)
			.field("messages", &self.messages)
			.finish_non_exhaustive()
	}
}

impl Conversation {
	/// Enter a conversation: join the live channel, fetch history (oldest
	/// first), and mark the room read.
	///
	/// The channel is joined before the history fetch so nothing published
	/// in between is missed; messages present in both are delivered once.
	/// The mark-as-read is best-effort and never blocks entry.
	pub async fn open(store: StoreClient, hub: RoomHub, session: &Session, room_id: RoomId) -> Result<Self, ChatError> {
		Self::open_with_limit(store, hub, session, room_id, None).await
	}

	/// Like [`Self::open`] but fetching only the most recent `limit`
	/// messages, for long-lived rooms. A failed page fetch degrades to an
	/// empty view like the unbounded path.
	pub async fn open_with_limit(
		store: StoreClient,
		hub: RoomHub,
		session: &Session,
		room_id: RoomId,
		limit: Option<usize>,
	) -> Result<Self, ChatError> {
		let mut channel = LiveChannel::join(hub, store.clone(), session, room_id.clone()).await?;

		let mut messages = match limit {
			None => store.fetch_history(&room_id).await,
			Some(limit) => match store.fetch_history_page(&room_id, limit, None).await {
				Ok(messages) => messages,
				Err(e) => {
					warn!(room = %room_id, error = %e, "history page unavailable; opening empty view");
					Vec::new()
				}
			},
		};
		messages.sort_by_key(|m| m.timestamp);
		channel.suppress(messages.iter().map(|m| m.id));

		ReadReceiptTracker::new(store)
			.mark_as_read_best_effort(&room_id, &session.viewer)
			.await;

		debug!(room = %room_id, viewer = %session.viewer.id, history = messages.len(), "conversation opened");

		Ok(Self {
			room_id,
			viewer: session.viewer.clone(),
			messages,
			channel,
		})
	}

	pub fn room_id(&self) -> &RoomId {
		&self.room_id
	}

	/// The rendered sequence: fetched history in timestamp order, then
	/// live messages in receipt order.
	pub fn messages(&self) -> &[Message] {
		&self.messages
	}

	/// Label for a message relative to this view's viewer.
	pub fn label_for(&self, message: &Message) -> &'static str {
		display_label(message.sender_type, self.viewer.role)
	}

	/// Optimistic send; see [`LiveChannel::send`]. The authoritative copy
	/// lands through [`Self::recv_live`].
	pub fn send(&self, content: &str) -> Result<u64, ChatError> {
		Ok(self.channel.send(content)?)
	}

	/// Await the next live event, appending any message after the already
	/// rendered content regardless of its timestamp. Returns `None` when
	/// the hub side is gone.
	pub async fn recv_live(&mut self) -> Option<ChannelEvent> {
		let event = self.channel.recv().await?;
		if let ChannelEvent::Message(m) = &event {
			self.messages.push(m.clone());
		}
		Some(event)
	}

	/// Drain whatever is already queued without waiting; returns how many
	/// messages were appended.
	pub fn drain_live(&mut self) -> usize {
		let mut appended = 0;
		while let Some(event) = self.channel.try_recv() {
			if let ChannelEvent::Message(m) = event {
				self.messages.push(m);
				appended += 1;
			}
		}
		appended
	}

	/// Current delivery confidence of the live channel.
	pub fn delivery(&self) -> Delivery {
		self.channel.delivery()
	}

	/// Error form of [`Self::delivery`] for view chrome that renders the
	/// non-blocking "messages may be unsent" warning.
	pub fn ensure_delivery(&self) -> Result<(), ChatError> {
		match self.channel.delivery() {
			Delivery::Joined => Ok(()),
			Delivery::Uncertain => Err(ChatError::DeliveryUncertain),
		}
	}

	/// Sends still awaiting confirmation (unsent after a failure).
	pub fn unsent(&self) -> Vec<PendingSend> {
		self.channel.unsent()
	}

	/// Leave the view, releasing the live subscription eagerly.
	pub async fn close(self) {
		let room_id = self.room_id.clone();
		self.channel.leave().await;
		debug!(room = %room_id, "conversation closed");
	}
}
