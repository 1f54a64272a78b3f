use abcplay::playback::generate_playback_data;
use abcplay::{AbcError, PlaybackConfig};
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// The resolved song: header and flattened voices
    Song,
    /// Timed MIDI notes and lyric events
    Playback,
}

#[derive(Parser, Debug)]
#[command(name = "abcplay")]
#[command(about = "Resolve ABC music notation into voices and playback data", long_about = None)]
struct Args {
    /// Path to the ABC file
    input: PathBuf,

    /// YAML playback configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// What to print
    #[arg(short, long, value_enum, default_value = "song")]
    emit: Emit,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);

    let source = match fs::read_to_string(&args.input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let config = match &args.config {
        Some(path) => match PlaybackConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => PlaybackConfig::default(),
    };

    let song = match abcplay::parse(&source) {
        Ok(song) => song,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            process::exit(1);
        }
    };
    info!(
        "Parsed '{}' with {} voice(s)",
        song.header().title,
        song.body().len()
    );

    let json = match args.emit {
        Emit::Song => serde_json::to_string_pretty(&song).map_err(AbcError::from),
        Emit::Playback => generate_playback_data(&song, &config)
            .and_then(|data| Ok(serde_json::to_string_pretty(&data)?)),
    };
    let json = match json {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error rendering output: {}", e);
            process::exit(1);
        }
    };

    match &args.output {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing to '{}': {}", path.display(), e);
                process::exit(1);
            }
            eprintln!("Wrote JSON to {}", path.display());
        }
        None => {
            println!("{}", json);
        }
    }
}
