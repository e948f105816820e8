//! Shared JSON fixtures and helpers for CLI integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use serde_json::{Value, json};
use wiremock::MockServer;

/// A vidra command pointed at a mock server and a temp home.
pub fn vidra_cmd(home: &Path, server: &MockServer) -> Command {
    let mut cmd = Command::cargo_bin("vidra").unwrap();
    cmd.env("VIDRA_HOME", home)
        .env("VIDRA_BASE_URL", server.uri());
    cmd
}

/// Writes a persisted session with the given token into `home`.
pub fn seed_session(home: &Path, token: &str) {
    std::fs::create_dir_all(home).unwrap();
    std::fs::write(
        home.join("session.json"),
        json!({"access_token": token}).to_string(),
    )
    .unwrap();
}

/// Reads the persisted session file, if any.
pub fn read_session(home: &Path) -> Option<Value> {
    let path = home.join("session.json");
    if !path.exists() {
        return None;
    }
    Some(serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap())
}

pub fn token_json(token: &str) -> Value {
    json!({"access_token": token, "expires_in": 900, "token_type": "Bearer"})
}

pub fn stream_json(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "",
        "status": "published",
        "owner_id": "owner-1",
        "visibility": "public",
        "tags": null,
        "metadata": {},
        "storage": {},
        "created_at": "2026-08-01T00:00:00Z",
        "updated_at": "2026-08-01T00:00:00Z",
        "published_at": null
    })
}

pub fn page_json(ids: &[&str], total: u64, limit: u64, offset: u64) -> Value {
    json!({
        "items": ids
            .iter()
            .map(|id| stream_json(id, &format!("Stream {id}")))
            .collect::<Vec<_>>(),
        "total": total,
        "limit": limit,
        "offset": offset
    })
}
