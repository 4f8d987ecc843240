//! # Dungeon Crawler
//!
//! A tiny embedded text adventure. Room text goes out through instant
//! prints, in the style of a program piping its output into the shell.

use async_trait::async_trait;
use textwrap::fill;

use crate::core::shell::{Command, CommandContext, CommandError};
use crate::screen::{PrintOptions, Screen};

const WRAP_COLUMNS: usize = 70;

struct Room {
    name: &'static str,
    description: &'static str,
    /// (direction, target room index)
    exits: &'static [(&'static str, usize)],
    item: Option<&'static str>,
}

const CELL: usize = 0;
const CORRIDOR: usize = 1;
const ARMORY: usize = 2;
const GATE: usize = 3;
const FIELD: usize = 4;

const ROOMS: &[Room] = &[
    Room {
        name: "Damp Cell",
        description: "You wake on a cold stone floor. The cell door hangs open, \
            its hinges long rusted through. A corridor lies to the north.",
        exits: &[("north", CORRIDOR)],
        item: None,
    },
    Room {
        name: "Torchlit Corridor",
        description: "Guttering torches line the walls. Your cell is back south. \
            A doorway opens east, and a heavy gate blocks the passage north.",
        exits: &[("south", CELL), ("east", ARMORY), ("north", GATE)],
        item: None,
    },
    Room {
        name: "Abandoned Armory",
        description: "Racks of broken weapons gather dust. Something glints on a \
            workbench. The corridor is back west.",
        exits: &[("west", CORRIDOR)],
        item: Some("rusty key"),
    },
    Room {
        name: "Moonlit Gate",
        description: "Moonlight spills through the bars of a great gate to the \
            north. Its lock is ancient but intact. The corridor runs back south.",
        exits: &[("south", CORRIDOR), ("north", FIELD)],
        item: None,
    },
    Room {
        name: "Open Field",
        description: "Grass. Sky. Freedom.",
        exits: &[],
        item: None,
    },
];

pub struct DungeonCrawlerCommand;

#[async_trait]
impl Command for DungeonCrawlerCommand {
    fn name(&self) -> &'static str {
        "dungeon-crawler"
    }

    fn summary(&self) -> &'static str {
        "Crawl your way out of a tiny dungeon"
    }

    async fn run(&self, ctx: &CommandContext, _args: &[String]) -> Result<(), CommandError> {
        let screen = &ctx.screen;
        screen.print("Loading...\n").await;
        screen.clear();

        let mut here = CELL;
        let mut inventory: Vec<&'static str> = Vec::new();
        let mut taken = [false; ROOMS.len()];

        print_room(screen, here).await;

        loop {
            let Ok(line) = screen.prompt("? ").await else {
                break;
            };
            let input = line.to_lowercase();
            let mut words = input.split_whitespace();
            let verb = words.next().unwrap_or("");
            // "go north" and bare "north" both work.
            let direction = if verb == "go" { words.next().unwrap_or("") } else { verb };

            match verb {
                "quit" => break,
                "help" => {
                    game_print(
                        screen,
                        "Try: north/south/east/west, look, take, inventory, quit.",
                    )
                    .await;
                }
                "look" => print_room(screen, here).await,
                "inventory" | "inv" => {
                    if inventory.is_empty() {
                        game_print(screen, "You carry nothing.").await;
                    } else {
                        game_print(screen, &format!("You carry: {}.", inventory.join(", "))).await;
                    }
                }
                "take" => match ROOMS[here].item {
                    Some(item) if !taken[here] => {
                        taken[here] = true;
                        inventory.push(item);
                        game_print(screen, &format!("You take the {item}.")).await;
                    }
                    _ => game_print(screen, "There is nothing here to take.").await,
                },
                _ => {
                    let Some(&(_, target)) =
                        ROOMS[here].exits.iter().find(|(dir, _)| *dir == direction)
                    else {
                        game_print(screen, "You can't go that way.").await;
                        continue;
                    };
                    if here == GATE && target == FIELD && !inventory.contains(&"rusty key") {
                        game_print(screen, "The gate is locked. Its keyhole looks rusty.").await;
                        continue;
                    }
                    here = target;
                    if here == FIELD {
                        print_room(screen, here).await;
                        game_print(screen, "The rusty key grinds, the gate swings wide. You escaped!")
                            .await;
                        break;
                    }
                    print_room(screen, here).await;
                }
            }
        }

        screen.print("\nThanks for playing.\n").await;
        Ok(())
    }
}

async fn print_room(screen: &Screen, index: usize) {
    let room = &ROOMS[index];
    game_print(screen, &format!("== {} ==", room.name)).await;
    game_print(screen, room.description).await;
}

async fn game_print(screen: &Screen, text: &str) {
    screen
        .print_with(&format!("{}\n", fill(text, WRAP_COLUMNS)), PrintOptions::instant())
        .await;
}
