//! Recording mock backend for testing drivers without hardware.
//!
//! Every [MockOutput] and [MockDelay] created from the same [Recorder] appends to one shared
//! event log, so the exact interleaving of line writes and delays can be inspected afterwards.
//! [Recorder::frames] decodes the log back into what a parallel LCD controller would have latched.
use crate::delay::{Delay, secs_to_duration};
use crate::{GpioError, GpioOutput, GpioResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;
use std::time::Duration;

/// Name of the enable line, used by [Recorder::frames] to find falling edges.
pub const LINE_E: &str = "e";
/// Name of the register select line.
pub const LINE_RS: &str = "rs";
/// Names of the data lines, least significant bit first.
pub const LINES_DATA: [&str; 4] = ["d4", "d5", "d6", "d7"];

/// A single recorded action.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    /// A logic level was written to the named line.
    Write { line: &'static str, value: bool },
    /// A delay was requested.
    Delay(Duration),
}

impl Event {
    pub fn write(line: &'static str, value: bool) -> Self {
        Event::Write { line, value }
    }
}

/// What the controller sees on the bus, decoded from the raw [Event] log.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Frame {
    /// A nibble latched on the falling edge of the enable line, with the RS level at that time.
    Latch { rs: bool, nibble: u8 },
    /// A delay at least as long as the threshold passed to [Recorder::frames].
    Delay(Duration),
}

/// Shared event log.
///
/// Line levels reached before [Recorder::clear] are remembered, so decoding after a clear starts
/// from the real state of the lines instead of all low.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<Event>>>,
    cleared_levels: Rc<RefCell<HashMap<&'static str, bool>>>,
}

impl Debug for Recorder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Recorder({} events)", self.events.borrow().len())
    }
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an output line that records into this log.
    pub fn output(&self, name: &'static str) -> MockOutput {
        MockOutput {
            name,
            recorder: self.clone(),
            fail: false,
        }
    }

    /// Creates an output line whose every write fails with [GpioError::Io].
    pub fn failing_output(&self, name: &'static str) -> MockOutput {
        MockOutput {
            name,
            recorder: self.clone(),
            fail: true,
        }
    }

    /// Creates a delay that records into this log instead of sleeping.
    pub fn delay(&self) -> MockDelay {
        MockDelay {
            recorder: self.clone(),
        }
    }

    fn push(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    /// Returns a copy of all recorded events.
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Forgets the events recorded so far, keeping the level each line was left at.
    pub fn clear(&self) {
        let mut events = self.events.borrow_mut();
        let mut levels = self.cleared_levels.borrow_mut();
        for event in events.drain(..) {
            if let Event::Write { line, value } = event {
                levels.insert(line, value);
            }
        }
    }

    /// Last level written to the named line, if any, including writes before [Recorder::clear].
    pub fn level(&self, line: &str) -> Option<bool> {
        self.events
            .borrow()
            .iter()
            .rev()
            .find_map(|event| match event {
                Event::Write { line: l, value } if *l == line => Some(*value),
                _ => None,
            })
            .or_else(|| self.cleared_levels.borrow().get(line).copied())
    }

    /// Decodes the log into latched nibbles and delays of at least `min_delay`.
    ///
    /// A nibble is latched on every high-to-low transition of [LINE_E]. The nibble is assembled
    /// from the last levels of [LINES_DATA], D4 being bit 0. Lines that were never written read as low.
    pub fn frames(&self, min_delay: Duration) -> Vec<Frame> {
        let mut levels: HashMap<&str, bool> = self.cleared_levels.borrow().clone();
        let mut frames = Vec::new();

        for event in self.events.borrow().iter() {
            match *event {
                Event::Write { line, value } => {
                    let previous = levels.insert(line, value).unwrap_or(false);
                    if line == LINE_E && previous && !value {
                        let level = |name: &str| levels.get(name).copied().unwrap_or(false);
                        let nibble = LINES_DATA
                            .iter()
                            .enumerate()
                            .fold(0u8, |acc, (bit, name)| acc | (level(name) as u8) << bit);
                        frames.push(Frame::Latch {
                            rs: level(LINE_RS),
                            nibble,
                        });
                    }
                }
                Event::Delay(duration) => {
                    if duration >= min_delay {
                        frames.push(Frame::Delay(duration));
                    }
                }
            }
        }

        frames
    }

    /// Latched nibbles only, in order.
    pub fn latches(&self) -> Vec<(bool, u8)> {
        self.frames(Duration::MAX)
            .into_iter()
            .filter_map(|frame| match frame {
                Frame::Latch { rs, nibble } => Some((rs, nibble)),
                Frame::Delay(_) => None,
            })
            .collect()
    }

    /// Writes to any line other than [LINE_E] that happened while the enable line was high.
    pub fn writes_while_enabled(&self) -> Vec<Event> {
        let mut enabled = self.cleared_levels.borrow().get(LINE_E).copied().unwrap_or(false);
        let mut offending = Vec::new();

        for event in self.events.borrow().iter() {
            if let Event::Write { line, value } = *event {
                if line == LINE_E {
                    enabled = value;
                } else if enabled {
                    offending.push(event.clone());
                }
            }
        }

        offending
    }
}

/// A GPIO output that records its writes into a [Recorder].
pub struct MockOutput {
    name: &'static str,
    recorder: Recorder,
    fail: bool,
}

impl Debug for MockOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockOutput({})", self.name)
    }
}

impl GpioOutput for MockOutput {
    fn write(&self, value: bool) -> GpioResult<()> {
        if self.fail {
            return Err(GpioError::Io(std::io::ErrorKind::BrokenPipe));
        }
        self.recorder.push(Event::write(self.name, value));
        Ok(())
    }
}

/// A [Delay] that records the requested durations into a [Recorder] and returns immediately.
#[derive(Debug)]
pub struct MockDelay {
    recorder: Recorder,
}

impl Delay for MockDelay {
    fn delay_us(&self, us: u32) {
        self.recorder.push(Event::Delay(Duration::from_micros(us as u64)));
    }

    fn delay_ms(&self, ms: u32) {
        self.recorder.push(Event::Delay(Duration::from_millis(ms as u64)));
    }

    fn delay_secs(&self, secs: f32) {
        self.recorder.push(Event::Delay(secs_to_duration(secs)));
    }
}
