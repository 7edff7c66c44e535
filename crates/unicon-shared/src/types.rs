use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The remote operation a queued action replays.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Post,
    Message,
    Sync,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Message => "message",
            Self::Sync => "sync",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user action captured while it could not be completed live.
///
/// Persisted as one element of the JSON array under the `offlineActions`
/// store key, and POSTed verbatim to the sync endpoint on replay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueuedAction {
    /// Client-generated id: millisecond epoch as a decimal string.
    pub id: String,
    /// Which remote operation to replay.
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Action-specific content (post body, message body + recipient, ...).
    pub payload: serde_json::Value,
    /// When the action was enqueued.
    pub created_at: DateTime<Utc>,
    /// The acting user, when known, for attribution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl QueuedAction {
    /// Build an action with a fresh id and timestamp.
    pub fn new(kind: ActionKind, payload: serde_json::Value) -> Self {
        Self {
            id: epoch_millis_id(),
            kind,
            payload,
            created_at: Utc::now(),
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Millisecond-epoch id (e.g. `"1700000000000"`).
pub fn epoch_millis_id() -> String {
    Utc::now().timestamp_millis().to_string()
}

/// Content of a forum post before it is submitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub body: String,
    /// Target community, or the campus-wide feed when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_id: Option<String>,
}

impl PostDraft {
    /// Payload form stored in a [`QueuedAction`], shaped like the wire body.
    pub fn into_payload(self) -> serde_json::Value {
        let mut payload = serde_json::json!({ "body": self.body });
        if let Some(community_id) = self.community_id {
            payload["communityId"] = community_id.into();
        }
        payload
    }
}

/// Content of a direct message before it is sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageDraft {
    pub body: String,
    pub recipient_id: String,
}

impl MessageDraft {
    /// Payload form stored in a [`QueuedAction`], shaped like the wire body.
    pub fn into_payload(self) -> serde_json::Value {
        serde_json::json!({
            "body": self.body,
            "recipientId": self.recipient_id,
        })
    }
}

/// Coarse OS/browser-level link signal. Can be wrong in both directions
/// (captive portals, VPNs), so it is never trusted alone.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LinkState {
    Up,
    Down,
}

impl LinkState {
    pub fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }
}

/// Result of a single active health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Ok,
    Failed,
}

impl ProbeOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// The system's current belief about network reachability.
///
/// Derived from the link signal and the probe outcome; never set directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityState {
    pub is_online: bool,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl Default for ConnectivityState {
    fn default() -> Self {
        // Assume online at boot; the silent startup probe corrects this
        // without flashing a false offline banner.
        Self {
            is_online: true,
            last_checked_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_wire_field_names() {
        let action = QueuedAction {
            id: "1700000000000".into(),
            kind: ActionKind::Post,
            payload: serde_json::json!({ "body": "hello" }),
            created_at: "2024-01-01T00:00:00Z".parse().unwrap(),
            user_id: Some("u-42".into()),
        };

        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["type"], "post");
        let created = value["createdAt"].as_str().unwrap();
        assert!(created.starts_with("2024-01-01T00:00:00"));
        assert_eq!(value["userId"], "u-42");
    }

    #[test]
    fn user_id_omitted_when_absent() {
        let action = QueuedAction::new(ActionKind::Sync, serde_json::json!({}));
        let value = serde_json::to_value(&action).unwrap();
        assert!(value.get("userId").is_none());
    }

    #[test]
    fn epoch_id_is_decimal_millis() {
        let id = epoch_millis_id();
        let millis: i64 = id.parse().expect("id should parse as i64");
        assert!(millis > 1_600_000_000_000);
    }
}
