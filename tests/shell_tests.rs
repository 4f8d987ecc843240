//! Shell end-to-end: boot, dispatch, completion and history, driven by
//! synthetic key events against a real screen.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use oldnet::commands::default_commands;
use oldnet::core::config::ResolvedConfig;
use oldnet::core::shell::Shell;
use oldnet::screen::{Key, KeyPress, Screen, Segment};

fn test_config(dir: &Path) -> ResolvedConfig {
    ResolvedConfig {
        print_delay_ms: 0,
        skip_boot: true,
        chat_server_host: "localhost".to_string(),
        history_path: dir.join("history.json"),
    }
}

fn type_str(screen: &Screen, text: &str) {
    for c in text.chars() {
        screen.handle_key(KeyPress::char(c));
    }
}

fn submit_line(screen: &Screen, text: &str) {
    type_str(screen, text);
    screen.handle_key(KeyPress::plain(Key::Enter));
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

async fn wait_for_prompt(screen: &Screen) {
    let screen = screen.clone();
    wait_until(move || screen.has_active_prompt()).await;
}

/// Text of the currently active prompt's editor.
fn active_text(screen: &Screen) -> Option<String> {
    screen.with_log(|log| {
        log.iter()
            .filter_map(Segment::as_input)
            .find(|region| region.is_active())
            .map(|region| region.editor.text().to_string())
    })
}

#[tokio::test]
async fn test_help_then_exit() {
    let dir = tempfile::tempdir().unwrap();
    let screen = Screen::with_print_delay(0);
    let shell = Shell::new(
        screen.clone(),
        default_commands(),
        Arc::new(test_config(dir.path())),
    );
    let task = tokio::spawn(shell.run());

    wait_for_prompt(&screen).await;
    submit_line(&screen, "help");
    {
        let screen = screen.clone();
        wait_until(move || screen.transcript().contains("Available commands:")).await;
    }
    assert!(screen.transcript().contains("dungeon-crawler"));

    wait_for_prompt(&screen).await;
    submit_line(&screen, "exit");
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("shell did not exit")
        .unwrap();
    assert!(screen.transcript().contains("Goodbye!"));
}

#[tokio::test]
async fn test_unknown_command_reports_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let screen = Screen::with_print_delay(0);
    let shell = Shell::new(
        screen.clone(),
        default_commands(),
        Arc::new(test_config(dir.path())),
    );
    let _task = tokio::spawn(shell.run());

    wait_for_prompt(&screen).await;
    submit_line(&screen, "frobnicate now");
    {
        let screen = screen.clone();
        wait_until(move || screen.transcript().contains("Command not found: frobnicate")).await;
    }
}

#[tokio::test]
async fn test_tab_completion_at_the_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let screen = Screen::with_print_delay(0);
    let shell = Shell::new(
        screen.clone(),
        default_commands(),
        Arc::new(test_config(dir.path())),
    );
    let _task = tokio::spawn(shell.run());

    wait_for_prompt(&screen).await;
    type_str(&screen, "hi");
    screen.handle_key(KeyPress::plain(Key::Tab));
    assert_eq!(active_text(&screen).as_deref(), Some("history"));
}

#[tokio::test]
async fn test_history_navigation_restores_draft() {
    let dir = tempfile::tempdir().unwrap();
    let screen = Screen::with_print_delay(0);
    let shell = Shell::new(
        screen.clone(),
        default_commands(),
        Arc::new(test_config(dir.path())),
    );
    let _task = tokio::spawn(shell.run());

    wait_for_prompt(&screen).await;
    submit_line(&screen, "help");

    wait_for_prompt(&screen).await;
    type_str(&screen, "dra");
    screen.handle_key(KeyPress::plain(Key::Up));
    assert_eq!(active_text(&screen).as_deref(), Some("help"));
    screen.handle_key(KeyPress::plain(Key::Down));
    assert_eq!(active_text(&screen).as_deref(), Some("dra"));
}

#[tokio::test]
async fn test_history_persists_across_shells() {
    let dir = tempfile::tempdir().unwrap();
    let config = Arc::new(test_config(dir.path()));

    let screen = Screen::with_print_delay(0);
    let shell = Shell::new(screen.clone(), default_commands(), Arc::clone(&config));
    let task = tokio::spawn(shell.run());
    wait_for_prompt(&screen).await;
    submit_line(&screen, "help");
    wait_for_prompt(&screen).await;
    submit_line(&screen, "exit");
    task.await.unwrap();

    // A fresh shell against the same config sees the earlier entry.
    let screen = Screen::with_print_delay(0);
    let shell = Shell::new(screen.clone(), default_commands(), config);
    let _task = tokio::spawn(shell.run());
    wait_for_prompt(&screen).await;
    screen.handle_key(KeyPress::plain(Key::Up));
    assert_eq!(active_text(&screen).as_deref(), Some("help"));
}

#[tokio::test]
async fn test_cancelled_prompt_reprompts() {
    let dir = tempfile::tempdir().unwrap();
    let screen = Screen::with_print_delay(0);
    let shell = Shell::new(
        screen.clone(),
        default_commands(),
        Arc::new(test_config(dir.path())),
    );
    let _task = tokio::spawn(shell.run());

    wait_for_prompt(&screen).await;
    type_str(&screen, "half typed");
    screen.handle_key(KeyPress::ctrl('c'));
    // The shell swallows the cancellation and prompts again.
    wait_for_prompt(&screen).await;
    assert_eq!(active_text(&screen).as_deref(), Some(""));
}
