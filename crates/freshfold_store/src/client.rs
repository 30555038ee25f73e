#![forbid(unsafe_code)]

use std::sync::Arc;

use freshfold_domain::model::{ChatRoom, Message};
use freshfold_domain::{Role, RoomId, RoomKey, UserId, Viewer};
use tracing::{debug, warn};

use crate::backend::{ConversationBackend, HistoryQuery};
use crate::StoreError;

/// Client over the persistence seam. Validates before any backend call and
/// degrades history reads so conversation views render "no messages yet"
/// instead of erroring.
#[derive(Clone)]
pub struct StoreClient {
	backend: Arc<dyn ConversationBackend>,
}

impl StoreClient {
	pub fn new(backend: Arc<dyn ConversationBackend>) -> Self {
		Self { backend }
	}

	/// Find-or-create the unique room for a logical conversation.
	pub async fn find_or_create_room(
		&self,
		key: &RoomKey,
		counterpart_id: Option<&UserId>,
	) -> Result<ChatRoom, StoreError> {
		self.backend.find_or_create_room(key, counterpart_id).await
	}

	/// Rooms visible to a viewer, most recently updated first.
	pub async fn rooms_for_viewer(&self, viewer: &Viewer) -> Result<Vec<ChatRoom>, StoreError> {
		self.backend.rooms_for_viewer(viewer).await
	}

	/// Full history for a room, oldest first. A nonexistent or unreachable
	/// room yields an empty sequence, never a hard error.
	pub async fn fetch_history(&self, room_id: &RoomId) -> Vec<Message> {
		match self.backend.fetch_history(room_id, HistoryQuery::all()).await {
			Ok(messages) => messages,
			Err(e) => {
				warn!(room = %room_id, error = %e, "history unavailable; treating room as empty");
				Vec::new()
			}
		}
	}

	/// Bounded page of the most recent `limit` messages older than
	/// `before`, still oldest first. Unlike [`Self::fetch_history`] this
	/// propagates failures, so paging surfaces can distinguish "no older
	/// messages" from "store unreachable".
	pub async fn fetch_history_page(
		&self,
		room_id: &RoomId,
		limit: usize,
		before: Option<i64>,
	) -> Result<Vec<Message>, StoreError> {
		self.backend.fetch_history(room_id, HistoryQuery::page(limit, before)).await
	}

	/// Append a message to a room. Content is trimmed; empty or
	/// whitespace-only content is rejected before any backend interaction.
	pub async fn append_message(
		&self,
		room_id: &RoomId,
		sender_type: Role,
		sender_id: &UserId,
		content: &str,
	) -> Result<Message, StoreError> {
		let trimmed = content.trim();
		if trimmed.is_empty() {
			return Err(StoreError::Validation("message content must not be empty".to_string()));
		}

		let message = self.backend.append_message(room_id, sender_type, sender_id, trimmed).await?;

		debug!(room = %room_id, message = %message.id, sender = %sender_id, "appended message");

		Ok(message)
	}

	/// Mark every opposing-role message in the room as read by the viewer.
	/// Idempotent; returns the number of messages newly marked.
	pub async fn mark_read(&self, room_id: &RoomId, viewer: &Viewer) -> Result<u64, StoreError> {
		self.backend.mark_read(room_id, viewer).await
	}

	/// Explicitly (re)assign the provider counterpart of a room.
	pub async fn assign_counterpart(&self, room_id: &RoomId, counterpart_id: &UserId) -> Result<(), StoreError> {
		self.backend.assign_counterpart(room_id, counterpart_id).await
	}
}
