#![forbid(unsafe_code)]

use freshfold_domain::{RoomId, Viewer};
use freshfold_store::StoreClient;
use tracing::warn;

use crate::ChatError;

/// Marks a room's messages as read by a viewer. Invoked on conversation
/// entry and, from list surfaces, on row interaction before navigating in.
#[derive(Clone)]
pub struct ReadReceiptTracker {
	store: StoreClient,
}

impl ReadReceiptTracker {
	pub fn new(store: StoreClient) -> Self {
		Self { store }
	}

	/// Add the viewer to `read_by` of every opposing-role message in the
	/// room. Idempotent; never removes readers, never touches the
	/// viewer's own-role messages. Returns the number newly marked.
	pub async fn mark_as_read(&self, room_id: &RoomId, viewer: &Viewer) -> Result<u64, ChatError> {
		self.store
			.mark_read(room_id, viewer)
			.await
			.map_err(|e| ChatError::ReadMarkFailed(e.to_string()))
	}

	/// Variant for flows that must never block on a failed mark: the
	/// failure is logged and the unread badge stays stale until the next
	/// successful call.
	pub async fn mark_as_read_best_effort(&self, room_id: &RoomId, viewer: &Viewer) {
		if let Err(e) = self.mark_as_read(room_id, viewer).await {
			warn!(room = %room_id, viewer = %viewer.id, error = %e, "mark-as-read failed; badge may be stale");
		}
	}
}
