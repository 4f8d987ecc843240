//! Chat input handling: slash commands, channel switching, plain messages.

use crate::commands::chat::connection::ChatConnection;
use crate::commands::chat::message::ClientPacket;

const HELP_TEXT: &str = "\
Available inputs:
  /help          show this help
  /exit          leave the chat
  #channel       switch to a channel
  anything else  send the text to the current channel
";

/// What a line of chat input means, before any network effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedInput {
    Command { name: String },
    SwitchChannel(String),
    DirectMessage { recipient: String },
    Message(String),
}

pub fn parse_input(input: &str) -> ParsedInput {
    match input.chars().next() {
        Some('/') => {
            let name = input[1..].split(' ').next().unwrap_or("").to_string();
            ParsedInput::Command { name }
        }
        Some('#') => {
            let channel = input[1..].split(' ').next().unwrap_or("").to_string();
            ParsedInput::SwitchChannel(channel)
        }
        Some('@') => {
            let recipient = input[1..].split(' ').next().unwrap_or("").to_string();
            ParsedInput::DirectMessage { recipient }
        }
        _ => ParsedInput::Message(input.to_string()),
    }
}

/// Result of handling one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// A packet went out (or a local command succeeded silently).
    Sent,
    /// The user asked to leave.
    Exit,
    /// Something to show the user.
    Print(String),
}

pub async fn handle_input(conn: &ChatConnection, input: &str) -> InputOutcome {
    match parse_input(input) {
        ParsedInput::Command { name } => match name.as_str() {
            "help" => InputOutcome::Print(HELP_TEXT.to_string()),
            "exit" => InputOutcome::Exit,
            other => InputOutcome::Print(format!("Unknown command: {other}\n")),
        },
        ParsedInput::SwitchChannel(channel) => {
            send(conn, &ClientPacket::SwitchChannel { data: channel }).await
        }
        ParsedInput::DirectMessage { .. } => {
            InputOutcome::Print("Direct messages are not supported yet.\n".to_string())
        }
        ParsedInput::Message(text) => send(conn, &ClientPacket::SendMessage { data: text }).await,
    }
}

async fn send(conn: &ChatConnection, packet: &ClientPacket) -> InputOutcome {
    match conn.send(packet).await {
        Ok(()) => InputOutcome::Sent,
        Err(err) => InputOutcome::Print(format!("{err}\n")),
    }
}
