use std::process::Command;

use crate::error::BackendError;

use super::AudioBackend;

/// Mixer front-ends reachable through a command-line tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixerCommand {
    /// PulseAudio / PipeWire default sink.
    Pactl,
    /// macOS system output volume.
    Osascript,
}

impl MixerCommand {
    /// Mechanisms worth trying on the current platform, in order.
    pub fn candidates() -> &'static [MixerCommand] {
        if cfg!(target_os = "macos") {
            &[MixerCommand::Osascript]
        } else if cfg!(target_os = "linux") {
            &[MixerCommand::Pactl]
        } else {
            &[]
        }
    }

    fn program(&self) -> &'static str {
        match self {
            Self::Pactl => "pactl",
            Self::Osascript => "osascript",
        }
    }

    fn get_args(&self) -> Vec<String> {
        match self {
            Self::Pactl => vec!["get-sink-volume".into(), "@DEFAULT_SINK@".into()],
            Self::Osascript => vec!["-e".into(), "output volume of (get volume settings)".into()],
        }
    }

    fn set_args(&self, percent: u8) -> Vec<String> {
        match self {
            Self::Pactl => vec![
                "set-sink-volume".into(),
                "@DEFAULT_SINK@".into(),
                format!("{percent}%"),
            ],
            Self::Osascript => vec!["-e".into(), format!("set volume output volume {percent}")],
        }
    }

    fn parse_level(&self, stdout: &str) -> Result<u8, BackendError> {
        let token = match self {
            // "Volume: front-left: 32768 /  50% / -18.06 dB, ..."
            Self::Pactl => stdout
                .split_whitespace()
                .find_map(|word| word.strip_suffix('%')),
            Self::Osascript => stdout.split_whitespace().next(),
        };
        token
            .and_then(|value| value.parse::<u32>().ok())
            .map(|value| value.min(100) as u8)
            .ok_or_else(|| BackendError::Parse(stdout.trim().to_string()))
    }
}

/// Audio backend that drives the system mixer through an external process.
#[derive(Debug, Clone)]
pub struct ProcessMixer {
    command: MixerCommand,
}

impl ProcessMixer {
    pub fn new(command: MixerCommand) -> Self {
        Self { command }
    }

    /// Returns the first mechanism that answers a level query.
    pub fn detect() -> Option<Self> {
        MixerCommand::candidates().iter().find_map(|command| {
            let mut mixer = Self::new(*command);
            match mixer.get_level() {
                Ok(level) => {
                    tracing::info!(program = command.program(), level, "mixer found");
                    Some(mixer)
                }
                Err(err) => {
                    tracing::debug!(program = command.program(), %err, "mixer unavailable");
                    None
                }
            }
        })
    }

    fn run(&self, args: &[String]) -> Result<String, BackendError> {
        let program = self.command.program();
        let output = Command::new(program).args(args).output()?;
        if !output.status.success() {
            return Err(BackendError::Command {
                program: program.to_string(),
                status: output.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl AudioBackend for ProcessMixer {
    fn name(&self) -> &str {
        self.command.program()
    }

    fn set_level(&mut self, percent: u8) -> Result<(), BackendError> {
        self.run(&self.command.set_args(percent.min(100))).map(|_| ())
    }

    fn get_level(&mut self) -> Result<u8, BackendError> {
        let stdout = self.run(&self.command.get_args())?;
        self.command.parse_level(&stdout)
    }
}
