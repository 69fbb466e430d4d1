//! JSON-lines landmark recordings and the reader thread that feeds them to
//! the processing loop.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::PathBuf,
    sync::mpsc::{self, Receiver},
    thread,
};

use gesture_engine_core::{FrameInput, LandmarkSet};
use serde::Deserialize;

/// One line of a recording: `{"t": 0.033, "hands": [[[0, 320, 400], ...]]}`.
/// A line with `"clear": true` is a host command rather than a frame.
#[derive(Debug, Clone, Deserialize)]
pub struct FrameRecord {
    pub t: f64,
    #[serde(default)]
    pub hands: Vec<LandmarkSet>,
    #[serde(default)]
    pub clear: bool,
}

impl FrameRecord {
    /// Only the primary (first reported) hand is processed.
    pub fn into_input(self, origin: f64) -> FrameInput {
        let landmarks = self.hands.into_iter().next().unwrap_or_default();
        FrameInput::new(self.t - origin, landmarks)
    }
}

#[derive(Debug, Clone)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) if path.as_os_str() != "-" => Self::File(path),
            _ => Self::Stdin,
        }
    }

    fn open(&self) -> io::Result<Box<dyn BufRead + Send>> {
        Ok(match self {
            Self::Stdin => Box::new(BufReader::new(io::stdin())),
            Self::File(path) => {
                let file = File::open(path).map_err(|err| {
                    io::Error::new(err.kind(), format!("{}: {err}", path.display()))
                })?;
                Box::new(BufReader::new(file))
            }
        })
    }
}

/// Reader thread handle; joins to the first read error, if any.
pub type ReaderHandle = thread::JoinHandle<io::Result<()>>;

/// Opens `source` on the calling thread, so a missing recording fails before
/// any frame is processed, then spawns the reader.
pub fn spawn_reader(source: Source) -> io::Result<(Receiver<FrameRecord>, ReaderHandle)> {
    spawn_lines(source.open()?)
}

/// Spawns a thread parsing `reader` line by line. The channel holds a single
/// record, so a slow session throttles the reader instead of buffering the
/// whole recording.
pub fn spawn_lines<R>(reader: R) -> io::Result<(Receiver<FrameRecord>, ReaderHandle)>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel::<FrameRecord>(1);
    let handle = thread::Builder::new()
        .name("landmark-reader".into())
        .spawn(move || {
            for (number, line) in reader.lines().enumerate() {
                let Some(record) = parse_line(number + 1, &line?) else {
                    continue;
                };
                if tx.send(record).is_err() {
                    break;
                }
            }
            tracing::debug!("reader finished");
            Ok(())
        })?;
    Ok((rx, handle))
}

/// Waits for the reader and surfaces its error. A panicked reader is reported
/// as an IO failure.
pub fn join(handle: ReaderHandle) -> io::Result<()> {
    handle.join().unwrap_or_else(|_| {
        Err(io::Error::new(
            io::ErrorKind::Other,
            "landmark reader thread panicked",
        ))
    })
}

fn parse_line(number: usize, line: &str) -> Option<FrameRecord> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(record) => Some(record),
        Err(err) => {
            tracing::warn!(line = number, %err, "skipping malformed frame");
            None
        }
    }
}
