//! JSON envelopes exchanged over the websocket (and reused by the HTTP api).
use serde::{Deserialize, Serialize};

use crate::{dice::RollMode, history::Snapshot};

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Inbound {
    Roll {
        #[serde(alias = "prompt")]
        expression: String,
        #[serde(default)]
        mode: RollMode,
    },
    History,
    ClearHistory,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum Outbound {
    #[serde(rename = "rollResult")]
    RollResult { text: String },
    /// `seq` orders snapshots; a client keeps the highest it has seen.
    #[serde(rename = "history")]
    History { seq: u64, entries: Vec<String> },
    #[serde(rename = "error")]
    Error { message: String },
    #[serde(rename = "ok")]
    Ok { message: String },
}

impl Outbound {
    pub fn error(e: impl ToString) -> Self {
        Outbound::Error { message: e.to_string() }
    }

    pub fn to_json(&self) -> String {
        // plain strings and string lists only, serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<Snapshot> for Outbound {
    fn from(s: Snapshot) -> Self {
        Outbound::History { seq: s.seq, entries: s.entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn inbound_kinds() {
        let m: Inbound = serde_json::from_str(r#"{"kind":"roll","expression":"1d20"}"#).unwrap();
        assert_eq!(m, Inbound::Roll { expression: "1d20".into(), mode: RollMode::Normal });

        let m: Inbound =
            serde_json::from_str(r#"{"kind":"roll","prompt":"2d20","mode":"fortune"}"#).unwrap();
        assert_eq!(m, Inbound::Roll { expression: "2d20".into(), mode: RollMode::Advantage });

        let m: Inbound = serde_json::from_str(r#"{"kind":"history"}"#).unwrap();
        assert_eq!(m, Inbound::History);
        let m: Inbound = serde_json::from_str(r#"{"kind":"clear-history"}"#).unwrap();
        assert_eq!(m, Inbound::ClearHistory);
    }

    #[test]
    fn unknown_kind_or_mode_is_rejected() {
        assert!(serde_json::from_str::<Inbound>(r#"{"kind":"shout"}"#).is_err());
        assert!(serde_json::from_str::<Inbound>(r#"{"kind":"roll","expression":"d6","mode":"lucky"}"#).is_err());
        assert!(serde_json::from_str::<Inbound>("not json").is_err());
    }

    #[test]
    fn outbound_shapes() {
        let v: Value = serde_json::from_str(&Outbound::RollResult { text: "4 = 4".into() }.to_json()).unwrap();
        assert_eq!(v, json!({"kind": "rollResult", "text": "4 = 4"}));

        let snap = Snapshot { seq: 3, entries: vec!["a".into()] };
        let v: Value = serde_json::from_str(&Outbound::from(snap).to_json()).unwrap();
        assert_eq!(v, json!({"kind": "history", "seq": 3, "entries": ["a"]}));

        let v: Value = serde_json::from_str(&Outbound::error("nope").to_json()).unwrap();
        assert_eq!(v, json!({"kind": "error", "message": "nope"}));

        let v: Value = serde_json::from_str(&Outbound::Ok { message: "done".into() }.to_json()).unwrap();
        assert_eq!(v, json!({"kind": "ok", "message": "done"}));
    }
}
