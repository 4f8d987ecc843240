//! Chat wire messages.
//!
//! The server sends JSON frames of the form `{"messages": [...]}`, each
//! message tagged by `type` and carrying a millisecond Unix timestamp.
//! Outgoing packets are single tagged objects.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// One incoming websocket frame.
#[derive(Debug, Deserialize)]
pub struct ServerFrame {
    pub messages: Vec<ServerMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Broadcast from the server itself.
    #[serde(rename = "serverMessage")]
    System { timestamp: i64, message: String },
    /// The user was moved to another channel.
    #[serde(rename = "switchedChannel")]
    ChannelSwitched { timestamp: i64, channel: String },
    /// A chat message from some user on the current channel.
    #[serde(rename = "userMessage")]
    User {
        timestamp: i64,
        sender: String,
        message: String,
    },
}

/// Outgoing packets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ClientPacket {
    #[serde(rename = "sendMessage")]
    SendMessage { data: String },
    #[serde(rename = "switchChannel")]
    SwitchChannel { data: String },
}

/// Render a server message as one transcript line.
pub fn display_line(message: &ServerMessage) -> String {
    match message {
        ServerMessage::System { timestamp, message } => {
            format!("[{}] SYSTEM: {}\n", format_timestamp(*timestamp), message)
        }
        ServerMessage::ChannelSwitched { timestamp, channel } => {
            format!(
                "[{}] Switched to channel #{}\n",
                format_timestamp(*timestamp),
                channel
            )
        }
        ServerMessage::User {
            timestamp,
            sender,
            message,
        } => {
            format!(
                "[{}] <{}>: {}\n",
                format_timestamp(*timestamp),
                sender,
                message
            )
        }
    }
}

/// Format a millisecond Unix timestamp for display: `HH:mm` for today,
/// `DD-MMM HH:mm` otherwise.
pub fn format_timestamp(millis: i64) -> String {
    format_timestamp_at(millis, Local::now())
}

fn format_timestamp_at(millis: i64, now: DateTime<Local>) -> String {
    let Some(when) = Local.timestamp_millis_opt(millis).single() else {
        return String::from("??:??");
    };
    if when.date_naive() == now.date_naive() {
        when.format("%H:%M").to_string()
    } else {
        when.format("%d-%b %H:%M").to_string()
    }
}
