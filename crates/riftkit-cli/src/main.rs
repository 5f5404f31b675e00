use anyhow::Result;
use clap::Parser;
use riftkit::{Config, TranscodeOptions};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod commands;
mod input;

use app::App;
use cli::{Args, Command};

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "riftkit=debug" } else { "riftkit=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load_or_default(args.config.as_deref())?;
    debug!("Config: {:?}", config);
    info!("riftkit {}", env!("CARGO_PKG_VERSION"));
    let app = App::new(config);

    match args.command {
        Command::Status { action } => commands::status::run(&app, action),
        Command::Friends { action } => commands::friends::run(&app, action),
        Command::Loot { action } => commands::loot::run(&app, action),
        Command::Ranked { record } => commands::ranked::run(&app, record),
        Command::Replay { action } => commands::replay::run(&app, action),
        Command::Mail { action } => commands::mail::run(&app, action),
        Command::Currency { action } => commands::currency::run(&app, action),
        Command::Media {
            input,
            output,
            preset,
            video_codec,
            audio_codec,
            extra,
        } => {
            let options = TranscodeOptions {
                preset,
                video_codec,
                audio_codec,
                extra_args: extra,
            };
            commands::media::run(&app, &input, &output, &options)
        }
        Command::Image {
            input,
            output,
            format,
        } => commands::image::run(&input, &output, format.as_deref()),
        Command::Creds => commands::creds::run(&app),
    }
}
