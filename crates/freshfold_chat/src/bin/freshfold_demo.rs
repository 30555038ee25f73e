#![forbid(unsafe_code)]

//! End-to-end walkthrough of the chat core against the in-process backend:
//! a provider messages a customer about an order, the customer reads and
//! replies. Useful for eyeballing logs and badge transitions.

use std::sync::Arc;

use freshfold_chat::{Conversation, ReadReceiptTracker, RoomResolver, UnreadAggregator, load_chat_config};
use freshfold_domain::{OrderId, Role, SecretString, Session, UserId, Viewer};
use freshfold_store::{MemoryBackend, StoreClient};
use freshfold_transport::{ChannelEvent, RoomHub};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing() {
	let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,freshfold_chat=debug".to_string());

	tracing_subscriber::registry()
		.with(tracing_subscriber::EnvFilter::new(filter))
		.with(tracing_subscriber::fmt::layer().with_target(false))
		.init();
}

fn session(id: &str, role: Role) -> Session {
	Session::new(
		Viewer::new(UserId::new(id).expect("valid UserId"), role),
		SecretString::new("demo-credential"),
	)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	init_tracing();

	let cfg = load_chat_config()?;
	info!(
		queue_capacity = cfg.subscriber_queue_capacity,
		history_limit = cfg.history_limit,
		"freshfold chat demo starting"
	);

	let store = StoreClient::new(Arc::new(MemoryBackend::new()));
	let hub = RoomHub::new(cfg.hub_config());

	let resolver = RoomResolver::new(store.clone());
	let aggregator = UnreadAggregator::new(store.clone());
	let receipts = ReadReceiptTracker::new(store.clone());

	let customer = session("c1", Role::Customer);
	let provider = session("p1", Role::ServiceProvider);
	let order = OrderId::new("o1")?;

	let room_id = resolver
		.resolve_room(&customer.viewer.id, Some(&provider.viewer.id), Some(&order))
		.await?;
	info!(room = %room_id, "resolved order room");

	let mut provider_view = Conversation::open_with_limit(
		store.clone(),
		hub.clone(),
		&provider,
		room_id.clone(),
		Some(cfg.history_limit),
	)
	.await?;

	provider_view.send("On my way")?;
	while let Some(event) = provider_view.recv_live().await {
		if matches!(event, ChannelEvent::Message(_)) {
			break;
		}
	}

	let unread = aggregator.unread_for_room(&room_id, &customer.viewer).await;
	info!(unread, "customer badge after provider message");

	let mut customer_view = Conversation::open(store.clone(), hub.clone(), &customer, room_id.clone()).await?;
	for message in customer_view.messages() {
		info!(label = customer_view.label_for(message), content = %message.content, "customer view");
	}

	let unread = aggregator.unread_for_room(&room_id, &customer.viewer).await;
	info!(unread, "customer badge after opening the room");

	customer_view.send("Thanks")?;
	while let Some(event) = customer_view.recv_live().await {
		if matches!(event, ChannelEvent::Message(_)) {
			break;
		}
	}

	provider_view.drain_live();
	let unread = aggregator.unread_for_room(&room_id, &provider.viewer).await;
	info!(unread, "provider badge after customer reply");

	receipts.mark_as_read_best_effort(&room_id, &provider.viewer).await;
	let entries = aggregator.room_list(&provider.viewer).await?;
	for entry in &entries {
		info!(room = %entry.room.id, unread = entry.unread, "provider chat list");
	}

	customer_view.close().await;
	provider_view.close().await;

	Ok(())
}
