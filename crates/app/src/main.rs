mod backends;
mod replay;

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand};
use gesture_engine_core::{
    DisplaySession, EngineConfig, FrameOutput, Overlay, PaintSession, PointerSession, Report,
    Session, VolumeSession,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::{
    backends::MixerChoice,
    replay::{FrameRecord, Source},
};

fn main() -> gesture_engine_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli.global)?;

    match cli.command {
        Commands::Gestures { input } => {
            let session = Session::Display(DisplaySession::new(&config)?);
            run_session(session, Source::from_arg(input), &config, &cli.global)?;
        }
        Commands::Pointer { input } => {
            let session = Session::Pointer(PointerSession::new(&config, backends::pointer_backend())?);
            run_session(session, Source::from_arg(input), &config, &cli.global)?;
        }
        Commands::Paint { input, output } => {
            let session = Session::Paint(PaintSession::new(&config)?);
            let session = run_session(session, Source::from_arg(input), &config, &cli.global)?;
            if let (Some(output), Session::Paint(paint)) = (output, &session) {
                write_canvas(paint, &output)?;
            }
        }
        Commands::Volume { input, mixer } => {
            let session = Session::Volume(VolumeSession::new(&config, backends::audio_backend(mixer))?);
            run_session(session, Source::from_arg(input), &config, &cli.global)?;
        }
    }
    Ok(())
}

fn load_config(opts: &GlobalOpts) -> gesture_engine_core::Result<EngineConfig> {
    let mut config = match &opts.config {
        Some(path) => {
            tracing::info!(?path, "loading configuration");
            EngineConfig::load(path)?
        }
        None => EngineConfig::default(),
    };
    if let Some(width) = opts.screen_width {
        config.cursor.screen_width = width;
    }
    if let Some(height) = opts.screen_height {
        config.cursor.screen_height = height;
    }
    config.validate()?;
    Ok(config)
}

/// Drains the recording through `session` and hands the session back so the
/// caller can read its final state.
fn run_session(
    mut session: Session,
    source: Source,
    config: &EngineConfig,
    opts: &GlobalOpts,
) -> gesture_engine_core::Result<Session> {
    let kind = session.kind();
    let detector = kind.resolve_detector(config);
    tracing::info!(
        session = %kind,
        max_hands = detector.max_hands,
        detection_confidence = detector.detection_confidence,
        tracking_confidence = detector.tracking_confidence,
        "starting session"
    );

    let (frames, reader) = replay::spawn_reader(source)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let processed = drive(&mut session, frames, &mut out, opts.overlay)?;
    replay::join(reader)?;
    out.flush()?;
    tracing::info!(session = %kind, frames = processed, "session finished");
    Ok(session)
}

/// Feeds records to `session` in arrival order and writes one JSON line per
/// processed frame. Timestamps are rebased to the first frame; a frame older
/// than its predecessor is dropped. Returns the number of frames processed.
fn drive(
    session: &mut Session,
    records: impl IntoIterator<Item = FrameRecord>,
    out: &mut impl Write,
    overlay: bool,
) -> gesture_engine_core::Result<usize> {
    let mut start = None;
    let mut last = f64::NEG_INFINITY;
    let mut processed = 0usize;

    for record in records {
        if record.clear {
            session.clear();
            continue;
        }
        if record.t < last {
            tracing::warn!(t = record.t, last, "dropping out-of-order frame");
            continue;
        }
        last = record.t;

        let origin = *start.get_or_insert(record.t);
        let output = session.process(&record.into_input(origin));
        emit(&mut *out, &output, overlay)?;
        processed += 1;
    }
    Ok(processed)
}

/// One emitted line: the rebased timestamp, the report, and the overlay when
/// requested.
#[derive(Serialize)]
struct FrameLine<'a> {
    t: f64,
    report: &'a Report,
    #[serde(skip_serializing_if = "Option::is_none")]
    overlay: Option<&'a Overlay>,
}

fn emit(out: &mut impl Write, output: &FrameOutput, overlay: bool) -> gesture_engine_core::Result<()> {
    tracing::debug!(t = output.timestamp, primitives = output.overlay.len(), "frame processed");
    let line = FrameLine {
        t: output.timestamp,
        report: &output.report,
        overlay: overlay.then_some(&output.overlay),
    };
    serde_json::to_writer(&mut *out, &line)?;
    writeln!(out)?;
    Ok(())
}

fn write_canvas(paint: &PaintSession, path: &Path) -> gesture_engine_core::Result<()> {
    let buffer = paint.canvas().buffer();
    tracing::info!(?path, width = buffer.width(), height = buffer.height(), "writing canvas");
    let mut file = BufWriter::new(File::create(path)?);
    buffer.write_ppm(&mut file)?;
    file.flush()?;
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Hand-gesture interaction engine", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// JSON configuration file; missing sections use defaults.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Override the screen width used for cursor mapping.
    #[arg(long, global = true)]
    screen_width: Option<u32>,
    /// Override the screen height used for cursor mapping.
    #[arg(long, global = true)]
    screen_height: Option<u32>,
    /// Include overlay primitives in the emitted frames.
    #[arg(long, global = true)]
    overlay: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Name the gesture shown in each frame.
    Gestures {
        /// JSON-lines landmark recording; stdin when omitted or `-`.
        input: Option<PathBuf>,
    },
    /// Drive the system pointer from the index fingertip.
    Pointer {
        input: Option<PathBuf>,
    },
    /// Paint strokes with the index fingertip.
    Paint {
        input: Option<PathBuf>,
        /// Write the final canvas as a binary PPM image.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Set the output volume from the thumb-to-index pinch.
    Volume {
        input: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = MixerChoice::Auto)]
        mixer: MixerChoice,
    },
}
