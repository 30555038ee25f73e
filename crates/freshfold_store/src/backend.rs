#![forbid(unsafe_code)]

use async_trait::async_trait;
use freshfold_domain::model::{ChatRoom, Message};
use freshfold_domain::{Role, RoomId, RoomKey, UserId, Viewer};

use crate::StoreError;

/// Bounds for a history fetch.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryQuery {
	/// Maximum number of messages to return (most recent first wins);
	/// `None` means the full history.
	pub limit: Option<usize>,

	/// Only messages strictly older than this unix-ms timestamp.
	pub before: Option<i64>,
}

impl HistoryQuery {
	/// The unbounded query used by small rooms and list scans.
	pub const fn all() -> Self {
		Self {
			limit: None,
			before: None,
		}
	}

	pub const fn page(limit: usize, before: Option<i64>) -> Self {
		Self {
			limit: Some(limit),
			before,
		}
	}
}

/// Request/response seam to the external persistence collaborator.
///
/// Reads are eventually consistent with this session's own writes; `mark_read`
/// is all-or-nothing per call.
#[async_trait]
pub trait ConversationBackend: Send + Sync {
	/// Find the unique room for `key`, creating it when absent.
	///
	/// A repeat call for an existing room must not mutate its
	/// `counterpart_id`; reassignment goes through [`Self::assign_counterpart`].
	async fn find_or_create_room(&self, key: &RoomKey, counterpart_id: Option<&UserId>) -> Result<ChatRoom, StoreError>;

	/// Rooms visible to a viewer: own rooms for customers, assigned rooms
	/// for providers, every room for admins. Most recently updated first.
	async fn rooms_for_viewer(&self, viewer: &Viewer) -> Result<Vec<ChatRoom>, StoreError>;

	/// Message history for a room, ordered by `timestamp` ascending.
	async fn fetch_history(&self, room_id: &RoomId, query: HistoryQuery) -> Result<Vec<Message>, StoreError>;

	/// Append a message; the backend assigns the id and timestamp.
	async fn append_message(
		&self,
		room_id: &RoomId,
		sender_type: Role,
		sender_id: &UserId,
		content: &str,
	) -> Result<Message, StoreError>;

	/// Add `viewer.id` to `read_by` of every message in the room not
	/// authored by the viewer's own role. Idempotent; returns the number
	/// of messages newly marked.
	async fn mark_read(&self, room_id: &RoomId, viewer: &Viewer) -> Result<u64, StoreError>;

	/// Explicitly (re)assign the provider counterpart of a room.
	async fn assign_counterpart(&self, room_id: &RoomId, counterpart_id: &UserId) -> Result<(), StoreError>;
}
