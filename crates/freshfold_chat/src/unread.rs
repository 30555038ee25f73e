#![forbid(unsafe_code)]

use std::collections::HashMap;

use freshfold_domain::model::{ChatRoom, Message};
use freshfold_domain::{RoomId, Viewer};
use freshfold_store::StoreClient;
use futures::future::join_all;

use crate::ChatError;

/// Count the messages in `messages` that are unread for `viewer`: authored
/// by the opposing role-context and not yet acknowledged by the viewer.
///
/// Viewer-relative by design: the same room has independent unread state for
/// its customer side and its provider/admin side.
pub fn unread_count(messages: &[Message], viewer: &Viewer) -> usize {
	messages.iter().filter(|m| m.is_unread_for(viewer)).count()
}

/// Boolean form used by simple badges (order-row chat buttons).
pub fn has_unread(messages: &[Message], viewer: &Viewer) -> bool {
	unread_count(messages, viewer) > 0
}

/// A chat-list row: the room plus the viewer's unread count for it.
#[derive(Debug, Clone)]
pub struct RoomListEntry {
	pub room: ChatRoom,
	pub unread: usize,
}

/// Computes unread state across rooms for list surfaces. Unread is derived
/// from `read_by`, never stored.
#[derive(Clone)]
pub struct UnreadAggregator {
	store: StoreClient,
}

impl UnreadAggregator {
	pub fn new(store: StoreClient) -> Self {
		Self { store }
	}

	/// Unread count for one room. An unreachable or unknown room reads as
	/// empty, so badges degrade to zero instead of erroring.
	pub async fn unread_for_room(&self, room_id: &RoomId, viewer: &Viewer) -> usize {
		let messages = self.store.fetch_history(room_id).await;
		unread_count(&messages, viewer)
	}

	/// Badge form of [`Self::unread_for_room`].
	pub async fn has_unread_for_room(&self, room_id: &RoomId, viewer: &Viewer) -> bool {
		self.unread_for_room(room_id, viewer).await > 0
	}

	/// Unread counts for a set of rooms, keyed by room id. The per-room
	/// fetches run concurrently; the per-room, per-viewer filter is
	/// unchanged by the fan-out.
	pub async fn unread_by_rooms(&self, room_ids: &[RoomId], viewer: &Viewer) -> HashMap<RoomId, usize> {
		let fetches = room_ids
			.iter()
			.map(|room_id| async move { (room_id.clone(), self.unread_for_room(room_id, viewer).await) });

		join_all(fetches).await.into_iter().collect()
	}

	/// The viewer's chat list: visible rooms, most recently updated first,
	/// each with its unread count.
	pub async fn room_list(&self, viewer: &Viewer) -> Result<Vec<RoomListEntry>, ChatError> {
		let rooms = self
			.store
			.rooms_for_viewer(viewer)
			.await
			.map_err(|e| ChatError::HistoryUnavailable(e.to_string()))?;

		let entries = rooms.into_iter().map(|room| async move {
			let unread = self.unread_for_room(&room.id, viewer).await;
			RoomListEntry { room, unread }
		});

		Ok(join_all(entries).await)
	}
}

#[cfg(test)]
mod tests {
	use freshfold_domain::{MessageId, Role, UserId};
	use proptest::prelude::*;

	use super::*;

	fn viewer(id: &str, role: Role) -> Viewer {
		Viewer::new(UserId::new(id).expect("valid UserId"), role)
	}

	fn msg(sender_type: Role, sender: &str, read_by: &[&str]) -> Message {
		Message {
			id: MessageId::new_v4(),
			chat_room_id: RoomId::new("r1").unwrap(),
			sender_type,
			sender_id: UserId::new(sender).unwrap(),
			content: "x".to_string(),
			timestamp: 1,
			read_by: read_by.iter().map(|r| UserId::new(*r).unwrap()).collect(),
		}
	}

	#[test]
	fn counts_only_opposing_unacknowledged_messages() {
		let messages = vec![
			msg(Role::ServiceProvider, "p1", &[]),
			msg(Role::ServiceProvider, "p1", &["c1"]),
			msg(Role::Admin, "a1", &[]),
			msg(Role::Customer, "c1", &[]),
		];

		let customer = viewer("c1", Role::Customer);
		assert_eq!(unread_count(&messages, &customer), 2);
		assert!(has_unread(&messages, &customer));

		// The provider side of the same room has independent state.
		let provider = viewer("p1", Role::ServiceProvider);
		assert_eq!(unread_count(&messages, &provider), 2);

		let other_customer = viewer("c2", Role::Customer);
		assert_eq!(unread_count(&messages, &other_customer), 3);
	}

	#[test]
	fn empty_history_has_no_unread() {
		let customer = viewer("c1", Role::Customer);
		assert_eq!(unread_count(&[], &customer), 0);
		assert!(!has_unread(&[], &customer));
	}

	fn arb_role() -> impl Strategy<Value = Role> {
		prop_oneof![
			Just(Role::Customer),
			Just(Role::ServiceProvider),
			Just(Role::Admin),
		]
	}

	proptest! {
		// Marking read drives the count to zero and never below; a new
		// opposing-role message raises it by exactly one, an own-role
		// message by zero.
		#[test]
		fn unread_is_monotone_under_marking_and_sends(
			senders in prop::collection::vec((arb_role(), any::<bool>()), 0..40),
			new_sender in arb_role(),
		) {
			let customer = viewer("c1", Role::Customer);

			let mut messages: Vec<Message> = senders
				.iter()
				.map(|(role, read)| {
					let read_by: &[&str] = if *read { &["c1"] } else { &[] };
					msg(*role, "s1", read_by)
				})
				.collect();

			let before = unread_count(&messages, &customer);

			for m in &mut messages {
				if m.sender_type != customer.role {
					m.mark_read_by(customer.id.clone());
				}
			}
			let after_mark = unread_count(&messages, &customer);
			prop_assert_eq!(after_mark, 0);
			prop_assert!(after_mark <= before);

			messages.push(msg(new_sender, "s2", &[]));
			let after_send = unread_count(&messages, &customer);
			let expected = if new_sender == customer.role { 0 } else { 1 };
			prop_assert_eq!(after_send, expected);
		}
	}
}
