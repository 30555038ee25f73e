#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use freshfold_domain::model::{ChatRoom, Message};
use freshfold_domain::{MessageId, Role, RoomId, RoomKey, UserId, Viewer, unix_ms_now};
use tokio::sync::Mutex;
use tracing::debug;

use crate::backend::{ConversationBackend, HistoryQuery};
use crate::StoreError;

/// In-process conversation backend used by tests, demos, and as the dev
/// store. All state lives behind one lock, so `mark_read` is trivially
/// all-or-nothing.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
	inner: Arc<Mutex<Inner>>,

	/// Simulates an unreachable persistence collaborator.
	offline: Arc<AtomicBool>,
}

#[derive(Debug, Default)]
struct Inner {
	rooms: HashMap<RoomId, ChatRoom>,
	rooms_by_key: HashMap<RoomKey, RoomId>,
	messages: HashMap<RoomId, Vec<Message>>,
}

impl MemoryBackend {
	pub fn new() -> Self {
		Self::default()
	}

	/// Make every backend call fail with `StoreError::Unavailable` until
	/// re-enabled. Test hook for outage paths.
	pub fn set_offline(&self, offline: bool) {
		self.offline.store(offline, Ordering::SeqCst);
	}

	fn check_online(&self) -> Result<(), StoreError> {
		if self.offline.load(Ordering::SeqCst) {
			return Err(StoreError::Unavailable("memory backend is offline".to_string()));
		}
		Ok(())
	}
}

#[async_trait]
impl ConversationBackend for MemoryBackend {
	async fn find_or_create_room(&self, key: &RoomKey, counterpart_id: Option<&UserId>) -> Result<ChatRoom, StoreError> {
		self.check_online()?;

		let mut inner = self.inner.lock().await;

		if let Some(existing) = inner.rooms_by_key.get(key) {
			let room = inner
				.rooms
				.get(existing)
				.cloned()
				.ok_or_else(|| StoreError::RoomNotFound(existing.clone()))?;
			return Ok(room);
		}

		let now = unix_ms_now();
		let room = ChatRoom {
			id: RoomId::new_v4(),
			customer_id: key.customer_id.clone(),
			counterpart_id: counterpart_id.cloned(),
			order_id: key.order_id.clone(),
			created_at: now,
			updated_at: now,
		};

		debug!(room = %room.id, key = %key, "memory store: created room");

		inner.rooms_by_key.insert(key.clone(), room.id.clone());
		inner.messages.insert(room.id.clone(), Vec::new());
		inner.rooms.insert(room.id.clone(), room.clone());

		Ok(room)
	}

	async fn rooms_for_viewer(&self, viewer: &Viewer) -> Result<Vec<ChatRoom>, StoreError> {
		self.check_online()?;

		let inner = self.inner.lock().await;

		let mut rooms: Vec<ChatRoom> = inner
			.rooms
			.values()
			.filter(|room| match viewer.role {
				Role::Customer => room.customer_id == viewer.id,
				Role::ServiceProvider => room.counterpart_id.as_ref() == Some(&viewer.id),
				Role::Admin => true,
			})
			.cloned()
			.collect();

		rooms.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.as_str().cmp(b.id.as_str())));

		Ok(rooms)
	}

	async fn fetch_history(&self, room_id: &RoomId, query: HistoryQuery) -> Result<Vec<Message>, StoreError> {
		self.check_online()?;

		let inner = self.inner.lock().await;
		let messages = inner
			.messages
			.get(room_id)
			.ok_or_else(|| StoreError::RoomNotFound(room_id.clone()))?;

		// Stored in append order, which the append path keeps
		// timestamp-ascending.
		let mut selected: Vec<&Message> = messages
			.iter()
			.filter(|m| query.before.is_none_or(|before| m.timestamp < before))
			.collect();

		if let Some(limit) = query.limit
			&& selected.len() > limit
		{
			selected = selected.split_off(selected.len() - limit);
		}

		Ok(selected.into_iter().cloned().collect())
	}

	async fn append_message(
		&self,
		room_id: &RoomId,
		sender_type: Role,
		sender_id: &UserId,
		content: &str,
	) -> Result<Message, StoreError> {
		self.check_online()?;

		let mut inner = self.inner.lock().await;
		let inner = &mut *inner;

		if !inner.rooms.contains_key(room_id) {
			return Err(StoreError::RoomNotFound(room_id.clone()));
		}

		let messages = inner.messages.entry(room_id.clone()).or_default();

		// Clamp to the room's last timestamp so ordering within a room
		// never regresses, even across clock adjustments.
		let last_ts = messages.last().map(|m| m.timestamp).unwrap_or(i64::MIN);
		let timestamp = unix_ms_now().max(last_ts);

		let message = Message {
			id: MessageId::new_v4(),
			chat_room_id: room_id.clone(),
			sender_type,
			sender_id: sender_id.clone(),
			content: content.to_string(),
			timestamp,
			read_by: Default::default(),
		};

		messages.push(message.clone());

		if let Some(room) = inner.rooms.get_mut(room_id) {
			room.updated_at = timestamp;
		}

		Ok(message)
	}

	async fn mark_read(&self, room_id: &RoomId, viewer: &Viewer) -> Result<u64, StoreError> {
		self.check_online()?;

		let mut inner = self.inner.lock().await;
		let messages = inner
			.messages
			.get_mut(room_id)
			.ok_or_else(|| StoreError::RoomNotFound(room_id.clone()))?;

		let mut newly_marked = 0u64;
		for message in messages.iter_mut() {
			if message.sender_type == viewer.role {
				continue;
			}
			if message.mark_read_by(viewer.id.clone()) {
				newly_marked += 1;
			}
		}

		if newly_marked > 0 {
			debug!(room = %room_id, viewer = %viewer.id, newly_marked, "memory store: marked read");
		}

		Ok(newly_marked)
	}

	async fn assign_counterpart(&self, room_id: &RoomId, counterpart_id: &UserId) -> Result<(), StoreError> {
		self.check_online()?;

		let mut inner = self.inner.lock().await;
		let room = inner
			.rooms
			.get_mut(room_id)
			.ok_or_else(|| StoreError::RoomNotFound(room_id.clone()))?;

		room.counterpart_id = Some(counterpart_id.clone());
		room.updated_at = unix_ms_now();

		Ok(())
	}
}
