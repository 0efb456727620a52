//! Test helpers for integration tests
//!
//! Builds pre-populated stores and paces message creation for tests that
//! depend on creation timestamps.

use std::thread;
use std::time::Duration;

use anyhow::Result;
use chat_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use chat_core::{Group, MessageId};
use chat_store::ChatStore;
use chrono::{DateTime, Utc};

use crate::fixtures::Cast;

/// Gap that guarantees two creations get distinct timestamps
pub const TICK: Duration = Duration::from_millis(5);

/// Install a subscriber for the configured environment once; later calls are no-ops
pub fn init_test_tracing() {
    let config = test_config().map_or_else(|_| TracingConfig::default(), |c| c.tracing_config());
    let _ = try_init_tracing_with_config(&config);
}

/// Configuration built from defaults only, ignoring the process environment
pub fn test_config() -> Result<AppConfig> {
    AppConfig::from_lookup(|_| None).map_err(|e| anyhow::anyhow!("Config error: {e}"))
}

/// A store with the cast registered
pub fn store_with_cast(cast: &Cast) -> Result<ChatStore> {
    init_test_tracing();

    let store = ChatStore::with_config(test_config()?.store);
    for user in cast.all() {
        store.create_user(&user.name, &user.mobile)?;
    }
    Ok(store)
}

/// A store with the cast registered and "Group 1" holding all three, Alice as admin
pub fn store_with_group(cast: &Cast) -> Result<(ChatStore, Group)> {
    let store = store_with_cast(cast)?;
    let group = store.create_chat(&cast.alice.mobile, &[&cast.bob.mobile, &cast.carol.mobile])?;
    Ok((store, group))
}

/// Current time, then a pause so the next creation is strictly later
pub fn mark() -> DateTime<Utc> {
    thread::sleep(TICK);
    let now = Utc::now();
    thread::sleep(TICK);
    now
}

/// Create and route one message, pausing afterwards so creation times stay distinct
pub fn send(store: &ChatStore, content: &str, sender: &str, group: &str) -> Result<MessageId> {
    let id = store.create_message(content);
    store.send_message(id, sender, group)?;
    thread::sleep(TICK);
    Ok(id)
}
