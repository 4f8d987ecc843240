use std::fs::File;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use oldnet::core::config::{self, CliOverrides};

#[derive(Parser)]
#[command(name = "oldnet", about = "Retro fake-terminal shell")]
struct Args {
    /// Print text instantly instead of animating it character by character
    #[arg(long)]
    fast: bool,

    /// Skip the boot sequence
    #[arg(long)]
    skip_boot: bool,

    /// Chat server host to use instead of the configured one
    #[arg(long)]
    chat_server: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to oldnet.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("oldnet.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(file_config) => file_config,
        Err(err) => {
            log::warn!("Falling back to default config: {err}");
            Default::default()
        }
    };
    let resolved = config::resolve(
        file_config,
        CliOverrides {
            fast: args.fast,
            skip_boot: args.skip_boot,
            chat_server: args.chat_server,
        },
    );

    log::info!("oldnet starting up");

    oldnet::tui::run(resolved)
}
