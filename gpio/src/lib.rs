pub mod delay;
pub mod gpiod;
pub mod lcd;
pub mod mock;

use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum GpioError {
    #[error("pin already in use")]
    AlreadyInUse,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),
}

impl From<std::io::Error> for GpioError {
    fn from(err: std::io::Error) -> Self {
        GpioError::Io(err.kind())
    }
}

pub type GpioResult<T> = Result<T, GpioError>;

pub trait GpioDriver: Debug {
    /// Gets the amount of GPIO lines available.
    fn count(&self) -> GpioResult<usize>;

    /// Requests the GPIO line at the given index as an output.
    ///
    /// # Errors
    /// - `GpioError::InvalidArgument` if the index is out of range.
    /// - `GpioError::AlreadyInUse` if the line was already handed out and not dropped yet.
    fn get_output(&self, index: usize) -> GpioResult<Box<dyn GpioOutput + '_>>;
}

pub trait GpioOutput: Debug {
    /// Drives the GPIO line to the given logic level.
    ///
    /// The level is applied before the call returns.
    fn write(&self, value: bool) -> GpioResult<()>;
}

/// Drives a group of lines with the bits of `value`, LSb first.
///
/// `lines[0]` receives bit 0, `lines[1]` bit 1 and so on.
pub fn write_bits(lines: &[&dyn GpioOutput], value: u8) -> GpioResult<()> {
    if lines.len() > 8 {
        return Err(GpioError::InvalidArgument);
    }
    if lines.len() < 8 && value >> lines.len() != 0 {
        return Err(GpioError::InvalidArgument);
    }

    for (i, line) in lines.iter().enumerate() {
        line.write((value & (1 << i)) != 0)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Event, MockOutput, Recorder};

    #[test]
    fn write_bits_is_lsb_first() {
        let recorder = Recorder::new();
        let lines: Vec<MockOutput> = ["d4", "d5", "d6", "d7"]
            .into_iter()
            .map(|name| recorder.output(name))
            .collect();
        let refs: Vec<&dyn GpioOutput> = lines.iter().map(|l| l as &dyn GpioOutput).collect();

        write_bits(&refs, 0b1010).unwrap();

        assert_eq!(
            recorder.events(),
            vec![
                Event::write("d4", false),
                Event::write("d5", true),
                Event::write("d6", false),
                Event::write("d7", true),
            ]
        );
    }

    #[test]
    fn write_bits_rejects_oversized_value() {
        let recorder = Recorder::new();
        let line = recorder.output("d4");
        let refs: [&dyn GpioOutput; 1] = [&line];

        assert_eq!(write_bits(&refs, 0b10), Err(GpioError::InvalidArgument));
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn write_bits_rejects_more_than_eight_lines() {
        let recorder = Recorder::new();
        let lines: Vec<MockOutput> = (0..9).map(|_| recorder.output("d")).collect();
        let refs: Vec<&dyn GpioOutput> = lines.iter().map(|l| l as &dyn GpioOutput).collect();

        assert_eq!(write_bits(&refs, 0xFF), Err(GpioError::InvalidArgument));
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn write_bits_drives_full_byte() {
        let recorder = Recorder::new();
        let lines: Vec<MockOutput> = (0..8).map(|_| recorder.output("d")).collect();
        let refs: Vec<&dyn GpioOutput> = lines.iter().map(|l| l as &dyn GpioOutput).collect();

        write_bits(&refs, 0b1000_0001).unwrap();

        let levels: Vec<Event> = recorder.events();
        assert_eq!(levels.len(), 8);
        assert_eq!(levels[0], Event::write("d", true));
        assert_eq!(levels[7], Event::write("d", true));
        assert!(levels[1..7].iter().all(|e| *e == Event::write("d", false)));
    }

    #[test]
    fn io_errors_keep_their_kind() {
        let err: GpioError = std::io::Error::from(std::io::ErrorKind::PermissionDenied).into();
        assert_eq!(err, GpioError::Io(std::io::ErrorKind::PermissionDenied));
    }
}
