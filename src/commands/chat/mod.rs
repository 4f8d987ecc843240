//! # Chat Program
//!
//! Websocket chat client: log in over HTTP, connect over wss, then loop a
//! removable prompt while a background reader prints incoming messages
//! above it. The screen engine's `print_before_active_prompt` behavior is
//! what keeps server traffic from ever appearing below the live input
//! line.

mod connection;
mod input;
mod message;

pub use connection::{ChatConnection, ChatError, LoginInfo, connect, login};
pub use input::{InputOutcome, ParsedInput, handle_input, parse_input};
pub use message::{ClientPacket, ServerFrame, ServerMessage, display_line};

use async_trait::async_trait;
use log::warn;

use crate::core::shell::{Command, CommandContext, CommandError};
use crate::screen::{Cancelled, PromptOptions, Screen, delay};

const WELCOME: &str = "\
Welcome to simple websocket chat program.

Messages are sent in raw text.
Type '/help' to know how to use this program.
Type '/exit' to exit this program.

";

pub struct ChatCommand;

#[async_trait]
impl Command for ChatCommand {
    fn name(&self) -> &'static str {
        "chat"
    }

    fn summary(&self) -> &'static str {
        "Talk to other users over the chat server"
    }

    async fn run(&self, ctx: &CommandContext, _args: &[String]) -> Result<(), CommandError> {
        let screen = &ctx.screen;
        screen.print(WELCOME).await;

        let auth_base = format!("https://{}", ctx.config.chat_server_host);
        let ws_url = format!("wss://{}/ws", ctx.config.chat_server_host);
        let client = reqwest::Client::new();

        let info = loop {
            screen.print("Enter your name: ").await;
            let mut name = match screen.prompt("").await {
                Ok(name) => name,
                // User backed out of the login; just leave the program.
                Err(Cancelled) => return Ok(()),
            };
            if name.is_empty() {
                name = String::from("Anonymous");
            }
            if let Some(info) = attempt_login(screen, &client, &auth_base, &name).await {
                break info;
            }
        };

        let Some(conn) = attempt_connect(screen, &ws_url, &info.token).await else {
            return Ok(());
        };

        let mut should_exit = false;
        while !should_exit && !conn.is_closed() {
            let read = screen.prompt_with(
                &format!("\n{}> ", info.username),
                PromptOptions {
                    remove_after: true,
                    ..PromptOptions::default()
                },
            );
            match read.await {
                Ok(line) => match handle_input(&conn, &line).await {
                    InputOutcome::Exit => should_exit = true,
                    InputOutcome::Print(text) => screen.print(&text).await,
                    InputOutcome::Sent => {}
                },
                // Cancelled either by the user or by the reader noticing a
                // closed socket; the loop condition sorts out which.
                Err(Cancelled) => {}
            }
        }

        conn.close().await;
        screen.print("Bye!\n").await;
        Ok(())
    }
}

/// Run the login request while ticking dots, then report OK/Failed.
async fn attempt_login(
    screen: &Screen,
    client: &reqwest::Client,
    auth_base: &str,
    username: &str,
) -> Option<LoginInfo> {
    let task = tokio::spawn({
        let client = client.clone();
        let auth_base = auth_base.to_string();
        let username = username.to_string();
        async move { login(&client, &auth_base, &username).await }
    });

    screen.print("Logging in...").await;
    while !task.is_finished() {
        delay(1000).await;
        screen.print(".").await;
    }

    match task.await {
        Ok(Ok(info)) => {
            screen.print(" OK\n").await;
            Some(info)
        }
        Ok(Err(err)) => {
            screen.print(" Failed\n").await;
            screen.print(&format!("{err}\n")).await;
            None
        }
        Err(join_err) => {
            warn!("Login task failed: {join_err}");
            screen.print(" Failed\n").await;
            None
        }
    }
}

/// Connect (muted) while ticking dots; unmute once the session is up.
async fn attempt_connect(screen: &Screen, ws_url: &str, token: &str) -> Option<ChatConnection> {
    let task = tokio::spawn({
        let ws_url = ws_url.to_string();
        let token = token.to_string();
        let screen = screen.clone();
        async move { connect(&ws_url, &token, screen, false).await }
    });

    screen.print("Connecting to server...").await;
    while !task.is_finished() {
        delay(1000).await;
        screen.print(".").await;
    }

    match task.await {
        Ok(Ok(conn)) => {
            screen.print(" OK\n").await;
            conn.set_print_server_messages(true);
            Some(conn)
        }
        Ok(Err(err)) => {
            warn!("Chat connect failed: {err}");
            screen.print(" Failed\n").await;
            screen
                .print("Failed to connect to server. Please try again later.\n")
                .await;
            None
        }
        Err(join_err) => {
            warn!("Connect task failed: {join_err}");
            screen.print(" Failed\n").await;
            None
        }
    }
}
