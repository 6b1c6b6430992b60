//! Rendering of the companion. The core only hands over a [MoodFrame] per tick; how it is shown
//! is up to the [DisplaySink].

pub mod portraits;

use std::{io::Write, time::Duration};

use ansi_term::Colour;
use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::{companion::selector::MoodBucket, utils::happiness::Happiness};

use portraits::PortraitSet;

/// Everything a display needs to know about one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodFrame {
    pub bucket: MoodBucket,
    pub status: String,
    pub happiness: Happiness,
    pub idle: Duration,
    pub at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
pub trait DisplaySink {
    fn show(&mut self, frame: &MoodFrame) -> Result<()>;
}

/// Draws frames into a terminal, one block per tick.
pub struct TerminalDisplay<W: Write> {
    out: W,
    portraits: PortraitSet,
    colors: bool,
    notice_shown: bool,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W, portraits: PortraitSet, colors: bool) -> Self {
        Self {
            out,
            portraits,
            colors,
            notice_shown: false,
        }
    }

    fn paint(&self, bucket: MoodBucket, text: &str) -> String {
        if !self.colors {
            return text.to_string();
        }
        let colour = match bucket {
            MoodBucket::Happy => Colour::Green,
            MoodBucket::Neutral => Colour::Yellow,
            MoodBucket::Sad => Colour::Blue,
            MoodBucket::VerySad => Colour::Red,
        };
        colour.bold().paint(text).to_string()
    }

    fn write_portrait(&mut self, bucket: MoodBucket) -> Result<()> {
        match &self.portraits {
            PortraitSet::Ready(portraits) => {
                if let Some(portrait) = portraits.get(&bucket) {
                    writeln!(self.out, "{}", portrait.trim_end())?;
                }
            }
            // Without portraits the notice is shown once, after that only text is drawn.
            PortraitSet::DegradedFallback(reason) if !self.notice_shown => {
                writeln!(self.out, "Pet portraits not found ({reason})")?;
                writeln!(self.out, "Required files:")?;
                writeln!(self.out, "{}", PortraitSet::required_files().join(", "))?;
                self.notice_shown = true;
            }
            PortraitSet::DegradedFallback(_) => {}
        }
        Ok(())
    }
}

impl<W: Write> DisplaySink for TerminalDisplay<W> {
    fn show(&mut self, frame: &MoodFrame) -> Result<()> {
        writeln!(self.out)?;
        self.write_portrait(frame.bucket)?;
        let status = self.paint(frame.bucket, &frame.status);
        writeln!(self.out, "{status}")?;
        writeln!(
            self.out,
            "Happiness: {}  (idle {}s, {})",
            frame.happiness,
            frame.idle.as_secs(),
            frame.at.format("%H:%M:%S"),
        )?;
        self.out.flush()?;
        Ok(())
    }
}
