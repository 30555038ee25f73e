#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, anyhow};
use freshfold_domain::SecretString;
use freshfold_transport::RoomHubConfig;
use serde::Deserialize;
use tracing::info;

/// Default config path: `~/.freshfold/config.toml`.
pub fn default_config_path() -> anyhow::Result<PathBuf> {
	let home = dirs::home_dir().ok_or_else(|| anyhow!("could not determine home directory"))?;
	Ok(home.join(".freshfold").join("config.toml"))
}

/// Load the chat config from TOML and env overrides.
pub fn load_chat_config() -> anyhow::Result<ChatConfig> {
	let path = default_config_path()?;
	load_chat_config_from_path(&path)
}

/// Same as `load_chat_config` but with an explicit config path.
pub fn load_chat_config_from_path(path: &Path) -> anyhow::Result<ChatConfig> {
	let file_cfg = read_toml_if_exists(path)
		.with_context(|| format!("read config from {}", path.display()))?
		.unwrap_or_default();

	let mut cfg = ChatConfig::from_file(file_cfg);

	apply_env_overrides(&mut cfg);

	Ok(cfg)
}

/// Chat core configuration.
#[derive(Debug, Clone)]
pub struct ChatConfig {
	/// Maximum number of queued live items per room subscriber.
	pub subscriber_queue_capacity: usize,

	/// Page size for bounded history fetches on view entry.
	pub history_limit: usize,

	/// Verbose hub logging.
	pub debug_logs: bool,

	/// Access token presented to the persistence collaborator.
	pub store_access_token: Option<SecretString>,
}

impl Default for ChatConfig {
	fn default() -> Self {
		Self {
			subscriber_queue_capacity: 256,
			history_limit: 200,
			debug_logs: false,
			store_access_token: None,
		}
	}
}

impl ChatConfig {
	/// Hub configuration derived from this config.
	pub fn hub_config(&self) -> RoomHubConfig {
		RoomHubConfig {
			subscriber_queue_capacity: self.subscriber_queue_capacity,
			debug_logs: self.debug_logs,
		}
	}

	fn from_file(file: FileConfig) -> Self {
		let defaults = Self::default();
		Self {
			subscriber_queue_capacity: file
				.chat
				.subscriber_queue_capacity
				.filter(|v| *v > 0)
				.unwrap_or(defaults.subscriber_queue_capacity),
			history_limit: file.chat.history_limit.filter(|v| *v > 0).unwrap_or(defaults.history_limit),
			debug_logs: file.chat.debug_logs.unwrap_or(false),
			store_access_token: file
				.store
				.access_token
				.filter(|s| !s.trim().is_empty())
				.map(SecretString::new),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
struct FileConfig {
	#[serde(default)]
	chat: FileChatSettings,

	#[serde(default)]
	store: FileStoreSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct FileChatSettings {
	subscriber_queue_capacity: Option<usize>,
	history_limit: Option<usize>,
	debug_logs: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct FileStoreSettings {
	access_token: Option<String>,
}

fn parse_env_bool(v: &str) -> Option<bool> {
	match v.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" => Some(false),
		_ => None,
	}
}

fn read_toml_if_exists(path: &Path) -> anyhow::Result<Option<FileConfig>> {
	match fs::read_to_string(path) {
		Ok(s) => {
			let cfg: FileConfig = toml::from_str(&s).context("parse TOML")?;
			Ok(Some(cfg))
		}
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
		Err(e) => Err(anyhow!(e).context("read config file")),
	}
}

fn apply_env_overrides(cfg: &mut ChatConfig) {
	if let Ok(v) = std::env::var("FRESHFOLD_SUBSCRIBER_QUEUE_CAPACITY")
		&& let Ok(capacity) = v.trim().parse::<usize>()
		&& capacity > 0
	{
		cfg.subscriber_queue_capacity = capacity;
		info!(capacity, "chat config: subscriber_queue_capacity overridden by env");
	}

	if let Ok(v) = std::env::var("FRESHFOLD_HISTORY_LIMIT")
		&& let Ok(limit) = v.trim().parse::<usize>()
		&& limit > 0
	{
		cfg.history_limit = limit;
		info!(limit, "chat config: history_limit overridden by env");
	}

	if let Ok(v) = std::env::var("FRESHFOLD_DEBUG_LOGS")
		&& let Some(debug_logs) = parse_env_bool(&v)
	{
		cfg.debug_logs = debug_logs;
		info!(debug_logs, "chat config: debug_logs overridden by env");
	}

	if let Ok(v) = std::env::var("FRESHFOLD_STORE_ACCESS_TOKEN") {
		let v = v.trim().to_string();
		if !v.is_empty() {
			cfg.store_access_token = Some(SecretString::new(v));
			info!("chat config: store_access_token overridden by env");
		}
	}
}
