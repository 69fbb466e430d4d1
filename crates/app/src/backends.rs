//! Host-side backend selection.

use clap::ValueEnum;
use gesture_engine_core::{
    volume::{MixerCommand, ProcessMixer},
    AudioBackend, PointerBackend,
};

/// How the volume session reaches the system mixer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MixerChoice {
    /// Try the platform mixers and use the first that answers.
    Auto,
    /// Use the platform's command-line mixer without probing.
    Process,
    /// Simulation only.
    None,
}

pub fn audio_backend(choice: MixerChoice) -> Option<Box<dyn AudioBackend>> {
    match choice {
        MixerChoice::Auto => ProcessMixer::detect().map(|mixer| Box::new(mixer) as Box<dyn AudioBackend>),
        MixerChoice::Process => MixerCommand::candidates()
            .first()
            .map(|command| Box::new(ProcessMixer::new(*command)) as Box<dyn AudioBackend>),
        MixerChoice::None => None,
    }
}

#[cfg(feature = "enigo")]
pub fn pointer_backend() -> Option<Box<dyn PointerBackend>> {
    match native::EnigoPointer::new() {
        Ok(pointer) => Some(Box::new(pointer)),
        Err(err) => {
            tracing::warn!(%err, "input injection unavailable");
            None
        }
    }
}

#[cfg(not(feature = "enigo"))]
pub fn pointer_backend() -> Option<Box<dyn PointerBackend>> {
    tracing::info!("built without the `enigo` feature, pointer output is display-only");
    None
}

#[cfg(feature = "enigo")]
mod native {
    use std::fmt;

    use enigo::{Axis, Button, Coordinate, Direction, Enigo, Mouse, Settings};
    use gesture_engine_core::{BackendError, MouseButton, PointerBackend};

    pub struct EnigoPointer {
        enigo: Enigo,
    }

    impl EnigoPointer {
        pub fn new() -> Result<Self, BackendError> {
            let enigo = Enigo::new(&Settings::default())
                .map_err(|e| BackendError::unavailable(format!("{e:?}")))?;
            Ok(Self { enigo })
        }
    }

    impl fmt::Debug for EnigoPointer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("EnigoPointer").finish_non_exhaustive()
        }
    }

    fn input_error(e: enigo::InputError) -> BackendError {
        BackendError::unavailable(format!("{e:?}"))
    }

    impl PointerBackend for EnigoPointer {
        fn name(&self) -> &str {
            "enigo"
        }

        fn move_to(&mut self, x: i32, y: i32) -> Result<(), BackendError> {
            self.enigo.move_mouse(x, y, Coordinate::Abs).map_err(input_error)
        }

        fn click(&mut self, button: MouseButton) -> Result<(), BackendError> {
            let button = match button {
                MouseButton::Left => Button::Left,
                MouseButton::Right => Button::Right,
            };
            self.enigo.button(button, Direction::Click).map_err(input_error)
        }

        // Positive amounts scroll up; enigo counts downwards.
        fn scroll(&mut self, amount: i32) -> Result<(), BackendError> {
            self.enigo.scroll(-amount, Axis::Vertical).map_err(input_error)
        }
    }
}
