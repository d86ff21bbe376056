//! Event log in the task's comma-separated format.
//!
//! One line per event with the columns
//! `trial_number,trial_type,event_code,absolute_time,response_time,response,result`.
//! Absent values are written as `NA`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

pub const HEADER: &str =
    "trial_number,trial_type,event_code,absolute_time,response_time,response,result";

const NA: &str = "NA";

/// Numeric event codes understood by downstream analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCode {
    /// Reserved; the instruction screens are not part of this crate.
    InstructOnset,
    TaskOnset,
    TrialOnset,
    PlanningOnset,
    ResponseOnset,
    AnimationOnset,
    FixationOnset,
    Response,
    Feedback,
    Outcome,
    /// Reserved; kept so later codes keep their numbers.
    BreathingLoad,
    ExtendingTime,
    TaskEnd,
}

impl EventCode {
    pub fn code(self) -> u8 {
        match self {
            EventCode::InstructOnset => 1,
            EventCode::TaskOnset => 2,
            EventCode::TrialOnset => 3,
            EventCode::PlanningOnset => 4,
            EventCode::ResponseOnset => 5,
            EventCode::AnimationOnset => 6,
            EventCode::FixationOnset => 7,
            EventCode::Response => 8,
            EventCode::Feedback => 9,
            EventCode::Outcome => 10,
            EventCode::BreathingLoad => 11,
            EventCode::ExtendingTime => 12,
            EventCode::TaskEnd => 13,
        }
    }
}

/// A single row of the event log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub trial: Option<u32>,
    pub trial_type: Option<String>,
    pub code: EventCode,
    pub timestamp: Option<Duration>,
    /// Seconds; for `EXTENDING_TIME` this is the raw trial duration.
    pub response_time: Option<Duration>,
    pub response: Option<i32>,
    pub result: Option<String>,
}

impl EventRecord {
    /// Record with only the code and timestamp filled in.
    pub fn new(code: EventCode, timestamp: Duration) -> Self {
        Self {
            trial: None,
            trial_type: None,
            code,
            timestamp: Some(timestamp),
            response_time: None,
            response: None,
            result: None,
        }
    }

    pub fn for_trial(mut self, trial: u32, trial_type: impl Into<String>) -> Self {
        self.trial = Some(trial);
        self.trial_type = Some(trial_type.into());
        self
    }

    pub fn with_response(mut self, response_time: Duration, response: Option<i32>) -> Self {
        self.response_time = Some(response_time);
        self.response = response;
        self
    }

    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }

    /// Render as one log line (no trailing newline).
    pub fn to_line(&self) -> String {
        let fields = [
            opt(self.trial.map(|trial| trial.to_string())),
            opt(self.trial_type.as_deref().map(escape)),
            self.code.code().to_string(),
            opt(self.timestamp.map(seconds)),
            opt(self.response_time.map(seconds)),
            opt(self.response.map(|response| response.to_string())),
            opt(self.result.as_deref().map(escape)),
        ];
        fields.join(",")
    }
}

fn opt(value: Option<String>) -> String {
    value.unwrap_or_else(|| NA.to_string())
}

fn seconds(value: Duration) -> String {
    format!("{:.6}", value.as_secs_f64())
}

/// Commas would shift columns; replace them rather than quote.
fn escape(value: &str) -> String {
    value.replace(',', ";")
}

/// Buffered writer that emits the header once, then one line per record.
pub struct EventLogWriter<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> EventLogWriter<W> {
    pub fn new(mut out: W) -> Result<Self> {
        writeln!(out, "{HEADER}").context("write event log header")?;
        Ok(Self { out, written: 0 })
    }

    pub fn write(&mut self, record: &EventRecord) -> Result<()> {
        writeln!(self.out, "{}", record.to_line()).context("write event record")?;
        self.written += 1;
        Ok(())
    }

    pub fn write_all<'a>(
        &mut self,
        records: impl IntoIterator<Item = &'a EventRecord>,
    ) -> Result<()> {
        for record in records {
            self.write(record)?;
        }
        Ok(())
    }

    /// Number of records written (header excluded).
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> Result<W> {
        self.out.flush().context("flush event log")?;
        Ok(self.out)
    }
}

impl EventLogWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        Self::new(BufWriter::new(file))
    }
}
