#![forbid(unsafe_code)]

use freshfold_domain::{OrderId, RoomId, RoomKey, UserId};
use freshfold_store::StoreClient;
use tracing::debug;

use crate::ChatError;

/// The one place rooms are resolved. Order rows, dashboard actions, and chat
/// lists all resolve through here, so find-or-create idempotency is enforced
/// once instead of per call site.
#[derive(Clone)]
pub struct RoomResolver {
	store: StoreClient,
}

impl RoomResolver {
	pub fn new(store: StoreClient) -> Self {
		Self { store }
	}

	/// Resolve the unique room for `(customer, order)`, creating it when
	/// absent. Omitting `order_id` resolves the customer's general support
	/// room. Repeat calls return the same id and leave an existing
	/// counterpart assignment untouched.
	pub async fn resolve_room(
		&self,
		customer_id: &UserId,
		counterpart_id: Option<&UserId>,
		order_id: Option<&OrderId>,
	) -> Result<RoomId, ChatError> {
		let key = RoomKey::new(customer_id.clone(), order_id.cloned());

		let room = self
			.store
			.find_or_create_room(&key, counterpart_id)
			.await
			.map_err(ChatError::resolution)?;

		debug!(room = %room.id, key = %key, "resolved room");

		Ok(room.id)
	}

	/// Explicitly (re)assign the provider handling a room, e.g. after an
	/// order is re-dispatched.
	pub async fn assign_counterpart(&self, room_id: &RoomId, counterpart_id: &UserId) -> Result<(), ChatError> {
		self.store
			.assign_counterpart(room_id, counterpart_id)
			.await
			.map_err(ChatError::resolution)
	}
}
