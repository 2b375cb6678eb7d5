use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::time::Duration;

use stemsplit::player::{AdvanceMode, PlayerEvent};
use stemsplit::separation::{self, Instrument, SplitRequest};
use stemsplit::utils::{self, Config};

/// StemSplit - split a track into stems (demo) and preview one of them
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Audio file to "separate"
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Instruments to extract, comma separated (default: vocals,drums,bass,other)
    #[arg(short, long, value_delimiter = ',')]
    instruments: Vec<Instrument>,

    /// Stem to preview after the split
    #[arg(short, long)]
    stem: Option<Instrument>,

    /// Initial volume (0-100)
    #[arg(short, long, value_name = "VOLUME")]
    volume: Option<i32>,

    /// How many seconds of wall time to preview
    #[arg(long, default_value = "3")]
    seconds: u64,

    /// Advance the simulated clock by elapsed time instead of a fixed step
    #[arg(long)]
    wall_clock: bool,

    /// Configuration file to use instead of the user config
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if args.wall_clock {
        config.player.advance_mode = AdvanceMode::WallClock;
    }

    // Initialize logging
    let log_level = if args.debug { "debug" } else { config.general.log_level.as_str() };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("Starting StemSplit v{}", env!("CARGO_PKG_VERSION"));

    let request = SplitRequest::from_file(&args.file, args.instruments.clone())?;
    let result = match separation::split_new_job(&request, &config.separation) {
        Ok(result) => result,
        Err(e) => {
            error!("Split failed: {}", e);
            return Err(e.into());
        }
    };
    println!("{}", serde_json::to_string_pretty(&result)?);

    let Some((instrument, stem)) = (match args.stem {
        Some(instrument) => result.track(instrument).map(|stem| (instrument, stem)),
        None => result.tracks.iter().next().map(|(i, stem)| (*i, stem)),
    }) else {
        return Err(anyhow::anyhow!("Requested stem was not part of the split"));
    };

    let mut player = stem.player(instrument, &config.player);
    player.subscribe(Box::new(|event: &PlayerEvent| match event {
        PlayerEvent::PositionChanged { position } => {
            log::debug!("Position: {:.1}s", position);
        }
        PlayerEvent::VolumeChanged { volume } => info!("Volume: {}%", volume),
        PlayerEvent::PlaybackEnded => info!("End of track reached"),
        _ => {}
    }));

    if let Some(volume) = args.volume {
        player.set_volume(volume);
    }

    info!("Previewing {} ({})", instrument.display_name(), stem.url);
    player.toggle_play();

    let mut rng = rand::thread_rng();
    let mut redraw = tokio::time::interval(Duration::from_millis(250));
    let preview = tokio::time::sleep(Duration::from_secs(args.seconds));
    tokio::pin!(preview);

    loop {
        tokio::select! {
            _ = &mut preview => break,
            _ = redraw.tick() => {
                let snapshot = player.snapshot();
                println!(
                    "{} / {} [{:?}] {}",
                    utils::format_time(snapshot.current_time),
                    utils::format_time(snapshot.duration),
                    snapshot.volume_level(),
                    player.waveform(&mut rng).to_ascii(50),
                );
                if !snapshot.is_playing() {
                    break;
                }
            }
        }
    }

    let snapshot = player.dispose().await;
    info!(
        "Stopped at {} of {}",
        utils::format_time(snapshot.current_time),
        utils::format_time(snapshot.duration)
    );

    Ok(())
}
