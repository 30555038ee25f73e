#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{MessageId, OrderId, Role, RoomId, RoomKey, UserId, Viewer};

/// One conversation channel between a customer and a provider/admin context,
/// optionally scoped to a single order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRoom {
	pub id: RoomId,

	/// The customer party. Immutable after creation.
	pub customer_id: UserId,

	/// Assigned provider, when the room is provider-scoped.
	pub counterpart_id: Option<UserId>,

	/// Order scope; absent for the customer's general support room.
	pub order_id: Option<OrderId>,

	pub created_at: i64,
	pub updated_at: i64,
}

impl ChatRoom {
	/// The logical-conversation key this room is the unique holder of.
	pub fn key(&self) -> RoomKey {
		RoomKey::new(self.customer_id.clone(), self.order_id.clone())
	}
}

/// One immutable-content message within exactly one room. Mutated only by
/// read-receipt additions; never edited, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
	pub id: MessageId,
	pub chat_room_id: RoomId,
	pub sender_type: Role,
	pub sender_id: UserId,
	pub content: String,

	/// Creation time (unix ms), non-decreasing within a room.
	pub timestamp: i64,

	/// Viewer identities that have acknowledged reading this message.
	/// Append-only.
	pub read_by: BTreeSet<UserId>,
}

impl Message {
	pub fn is_read_by(&self, viewer_id: &UserId) -> bool {
		self.read_by.contains(viewer_id)
	}

	/// Record a read acknowledgment. Returns false when the viewer had
	/// already acknowledged (the set only grows).
	pub fn mark_read_by(&mut self, viewer_id: UserId) -> bool {
		self.read_by.insert(viewer_id)
	}

	/// A message counts toward a viewer's unread state only when it was
	/// authored by the opposing role-context and the viewer has not yet
	/// acknowledged it.
	pub fn is_unread_for(&self, viewer: &Viewer) -> bool {
		self.sender_type != viewer.role && !self.is_read_by(&viewer.id)
	}
}
