#![forbid(unsafe_code)]

use std::sync::Arc;

use freshfold_domain::{OrderId, Role, RoomId, RoomKey, UserId, Viewer};

use crate::{MemoryBackend, StoreClient, StoreError};

fn client() -> (StoreClient, MemoryBackend) {
	let backend = MemoryBackend::new();
	(StoreClient::new(Arc::new(backend.clone())), backend)
}

fn key(customer: &str, order: Option<&str>) -> RoomKey {
	RoomKey::new(
		UserId::new(customer).expect("valid UserId"),
		order.map(|o| OrderId::new(o).expect("valid OrderId")),
	)
}

fn viewer(id: &str, role: Role) -> Viewer {
	Viewer::new(UserId::new(id).expect("valid UserId"), role)
}

#[tokio::test]
async fn find_or_create_is_idempotent_per_key() {
	let (client, _) = client();

	let k = key("c1", Some("o1"));
	let first = client.find_or_create_room(&k, None).await.expect("create");
	let second = client.find_or_create_room(&k, None).await.expect("find");

	assert_eq!(first.id, second.id, "same logical conversation must resolve to one room");

	let support = client.find_or_create_room(&key("c1", None), None).await.expect("create");
	assert_ne!(first.id, support.id, "order room and support room are distinct conversations");
}

#[tokio::test]
async fn repeat_resolution_does_not_clobber_counterpart() {
	let (client, _) = client();

	let k = key("c1", Some("o1"));
	let p1 = UserId::new("p1").unwrap();

	let created = client.find_or_create_room(&k, Some(&p1)).await.expect("create");
	assert_eq!(created.counterpart_id.as_ref(), Some(&p1));

	// A later surface resolving the same room without counterpart info
	// must not drop the assignment.
	let found = client.find_or_create_room(&k, None).await.expect("find");
	assert_eq!(found.counterpart_id.as_ref(), Some(&p1));

	let p2 = UserId::new("p2").unwrap();
	client.assign_counterpart(&created.id, &p2).await.expect("reassign");
	let found = client.find_or_create_room(&k, None).await.expect("find");
	assert_eq!(found.counterpart_id.as_ref(), Some(&p2));
}

#[tokio::test]
async fn concurrent_resolution_converges_on_one_room() {
	let (client, _) = client();
	let k = key("c1", Some("o1"));

	let a = client.clone();
	let b = client.clone();
	let ka = k.clone();
	let kb = k.clone();

	let (ra, rb) = tokio::join!(
		tokio::spawn(async move { a.find_or_create_room(&ka, None).await }),
		tokio::spawn(async move { b.find_or_create_room(&kb, None).await }),
	);

	let ra = ra.expect("join").expect("resolve");
	let rb = rb.expect("join").expect("resolve");
	assert_eq!(ra.id, rb.id);
}

#[tokio::test]
async fn append_rejects_empty_and_whitespace_content() {
	let (client, _) = client();
	let room = client.find_or_create_room(&key("c1", None), None).await.expect("create");
	let c1 = UserId::new("c1").unwrap();

	for content in ["", "   ", "\n\t"] {
		let err = client
			.append_message(&room.id, Role::Customer, &c1, content)
			.await
			.expect_err("empty content must be rejected");
		assert!(matches!(err, StoreError::Validation(_)), "got {err:?}");
	}

	assert!(client.fetch_history(&room.id).await.is_empty(), "no message may be stored");
}

#[tokio::test]
async fn append_trims_content_and_orders_history() {
	let (client, _) = client();
	let room = client.find_or_create_room(&key("c1", None), None).await.expect("create");
	let c1 = UserId::new("c1").unwrap();

	let first = client
		.append_message(&room.id, Role::Customer, &c1, "  hello  ")
		.await
		.expect("append");
	assert_eq!(first.content, "hello");

	let second = client
		.append_message(&room.id, Role::Customer, &c1, "again")
		.await
		.expect("append");
	assert!(second.timestamp >= first.timestamp);

	let history = client.fetch_history(&room.id).await;
	let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
	assert_eq!(contents, ["hello", "again"]);
}

#[tokio::test]
async fn history_degrades_to_empty_for_unknown_room_and_outage() {
	let (client, backend) = client();

	let ghost = RoomId::new("no-such-room").unwrap();
	assert!(client.fetch_history(&ghost).await.is_empty());

	let room = client.find_or_create_room(&key("c1", None), None).await.expect("create");
	let c1 = UserId::new("c1").unwrap();
	client
		.append_message(&room.id, Role::Customer, &c1, "hi")
		.await
		.expect("append");

	backend.set_offline(true);
	assert!(client.fetch_history(&room.id).await.is_empty());

	// Paging keeps the failure visible instead of masking it.
	let err = client.fetch_history_page(&room.id, 10, None).await.expect_err("offline");
	assert!(matches!(err, StoreError::Unavailable(_)));

	backend.set_offline(false);
	assert_eq!(client.fetch_history(&room.id).await.len(), 1);
}

#[tokio::test]
async fn history_pages_return_most_recent_window_oldest_first() {
	let (client, _) = client();
	let room = client.find_or_create_room(&key("c1", None), None).await.expect("create");
	let c1 = UserId::new("c1").unwrap();

	for n in 0..5 {
		client
			.append_message(&room.id, Role::Customer, &c1, &format!("m{n}"))
			.await
			.expect("append");
	}

	let page = client.fetch_history_page(&room.id, 2, None).await.expect("page");
	let contents: Vec<&str> = page.iter().map(|m| m.content.as_str()).collect();
	assert_eq!(contents, ["m3", "m4"]);

	let older = client
		.fetch_history_page(&room.id, 10, Some(page[0].timestamp))
		.await
		.expect("older page");
	assert!(older.iter().all(|m| m.timestamp < page[0].timestamp));
}

#[tokio::test]
async fn mark_read_is_idempotent_and_skips_own_role() {
	let (client, _) = client();
	let room = client.find_or_create_room(&key("c1", Some("o1")), None).await.expect("create");

	let c1 = UserId::new("c1").unwrap();
	let p1 = UserId::new("p1").unwrap();
	let customer = viewer("c1", Role::Customer);

	client
		.append_message(&room.id, Role::ServiceProvider, &p1, "On my way")
		.await
		.expect("append");
	client
		.append_message(&room.id, Role::Customer, &c1, "Thanks")
		.await
		.expect("append");

	let first = client.mark_read(&room.id, &customer).await.expect("mark read");
	assert_eq!(first, 1, "only the provider message counts for the customer");

	let second = client.mark_read(&room.id, &customer).await.expect("mark read");
	assert_eq!(second, 0, "second call is a no-op");

	let history = client.fetch_history(&room.id).await;
	assert!(history[0].is_read_by(&c1));
	assert!(!history[1].is_read_by(&c1), "own-role messages are never marked");
}

#[tokio::test]
async fn rooms_for_viewer_is_role_scoped() {
	let (client, _) = client();
	let p1 = UserId::new("p1").unwrap();

	let r1 = client
		.find_or_create_room(&key("c1", Some("o1")), Some(&p1))
		.await
		.expect("create");
	let _r2 = client.find_or_create_room(&key("c2", Some("o2")), None).await.expect("create");

	let customer_rooms = client.rooms_for_viewer(&viewer("c1", Role::Customer)).await.expect("rooms");
	assert_eq!(customer_rooms.len(), 1);
	assert_eq!(customer_rooms[0].id, r1.id);

	let provider_rooms = client
		.rooms_for_viewer(&viewer("p1", Role::ServiceProvider))
		.await
		.expect("rooms");
	assert_eq!(provider_rooms.len(), 1);
	assert_eq!(provider_rooms[0].id, r1.id);

	let admin_rooms = client.rooms_for_viewer(&viewer("a1", Role::Admin)).await.expect("rooms");
	assert_eq!(admin_rooms.len(), 2);
}
