use serde::{Deserialize, Serialize};

use crate::task::TaskStatus;

/// Frame type for task status pushes.
pub const FRAME_TASK_STATUS: &str = "task.status";
/// Frame type for wallet/points balance pushes.
pub const FRAME_WALLET_POINTS: &str = "wallet.points";

/// One JSON text frame from the notify stream.
///
/// The envelope is `{ "type": ..., "payload": ... }`. The payload stays an
/// untyped value here; [`StreamFrame::classify`] decodes it once the type is
/// recognized. Unknown types or undecodable payloads classify to `None` so
/// the channel never dies over a single bad frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamFrame {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Payload of a `task.status` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusPayload {
    pub task_id: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Payload of a `wallet.points` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletPointsPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub points: f64,
}

/// A recognized, decoded push event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    TaskStatus(TaskStatusPayload),
    WalletPoints(WalletPointsPayload),
}

impl StreamFrame {
    /// Parse a raw text frame into the envelope.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Decode the payload for known frame types.
    ///
    /// Returns `None` for unknown types and for known types whose payload
    /// fails to decode; the caller decides whether to log.
    pub fn classify(&self) -> Option<StreamEvent> {
        match self.kind.as_str() {
            FRAME_TASK_STATUS => serde_json::from_value(self.payload.clone())
                .ok()
                .map(StreamEvent::TaskStatus),
            FRAME_WALLET_POINTS => serde_json::from_value(self.payload.clone())
                .ok()
                .map(StreamEvent::WalletPoints),
            _ => None,
        }
    }
}
