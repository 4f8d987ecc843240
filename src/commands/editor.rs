//! # Text Editor Program
//!
//! One multi-line prompt is the whole editor. Escape finishes the buffer
//! (the prompt hook's custom submit), after which the user may save it to
//! a file on disk.

use async_trait::async_trait;

use crate::core::shell::{Command, CommandContext, CommandError};
use crate::screen::{HookAction, Key, PromptOptions};

const INTRO: &str = "\
Hi! This is the most basic and useless text editor that no one should use.

You can type text and delete them. And navigate around the text (whaaaaaaaaaaaaaat!!).
Press Escape to exit and save it as file.

Continue? (Y/n) ";

pub struct TextEditorCommand;

#[async_trait]
impl Command for TextEditorCommand {
    fn name(&self) -> &'static str {
        "texteditor"
    }

    fn summary(&self) -> &'static str {
        "Write some text and save it as a file"
    }

    async fn run(&self, ctx: &CommandContext, _args: &[String]) -> Result<(), CommandError> {
        let screen = &ctx.screen;

        screen.print(INTRO).await;
        let Ok(answer) = screen.prompt("").await else {
            return Ok(());
        };
        if !answered_yes(&answer) {
            return Ok(());
        }

        screen.clear();
        let read = screen.prompt_with(
            "",
            PromptOptions {
                multi_line: true,
                on_key: Some(Box::new(|key, _editor| {
                    if key.code == Key::Esc {
                        HookAction::Finish
                    } else {
                        HookAction::Pass
                    }
                })),
                ..PromptOptions::default()
            },
        );
        let Ok(content) = read.await else {
            return Ok(());
        };
        screen.clear();

        screen.print("Do you want to save the file? (Y/n) ").await;
        let Ok(save) = screen.prompt("").await else {
            return Ok(());
        };
        if answered_yes(&save) {
            screen.print("Save as: ").await;
            let Ok(mut file_name) = screen.prompt("").await else {
                return Ok(());
            };
            if file_name.is_empty() {
                file_name = String::from("untitled");
            }

            screen.print(&format!("Saving as {file_name}...")).await;
            tokio::fs::write(&file_name, &content).await?;
            screen.print(" OK\n").await;
        }

        Ok(())
    }
}

/// Empty input counts as yes, matching the `(Y/n)` default.
fn answered_yes(answer: &str) -> bool {
    let answer = answer.to_lowercase();
    answer.is_empty() || answer == "y"
}
