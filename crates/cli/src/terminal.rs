use anyhow::Result;
use chrono::NaiveDateTime;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};

use chime_core::{AlarmRecord, NextAlarm, TriggerEvent};

use crate::format;

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const ACTIVE: Color = Color::Green;
    const INACTIVE: Color = Color::Red;
    const ALARM_NAME: Color = Color::Cyan;
    const BELL: Color = Color::Yellow;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Magenta;
}

/// Renders alarms, history and status lines to stdout.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    fn header(&self, title: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("{title}\n")),
            ResetColor,
        )?;
        Ok(())
    }

    /// One line per alarm: status, id, time, name, days.
    pub fn print_alarms(&self, records: &[AlarmRecord]) -> Result<()> {
        self.header("Alarms")?;
        if records.is_empty() {
            return self.print_info("No alarms configured. Create one with `chime add`.");
        }

        let mut stdout = io::stdout();
        for record in records {
            let alarm = match record.parse() {
                Ok(alarm) => alarm,
                Err(e) => {
                    execute!(
                        stdout,
                        SetForegroundColor(Colors::ERROR),
                        Print(format!("  ! #{} {} ({e})\n", record.id, record.name)),
                        ResetColor,
                    )?;
                    continue;
                }
            };
            let (marker, color) = if alarm.is_active {
                ("on ", Colors::ACTIVE)
            } else {
                ("off", Colors::INACTIVE)
            };
            execute!(
                stdout,
                SetForegroundColor(color),
                Print(format!("  [{marker}] ")),
                ResetColor,
                Print(format!("#{:<4} {}  ", alarm.id, alarm.time)),
                SetForegroundColor(Colors::ALARM_NAME),
                Print(&alarm.name),
                ResetColor,
                SetForegroundColor(Colors::DIM),
                Print(format!("  {}\n", alarm.days)),
                ResetColor,
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn print_next(&self, next: Option<&NextAlarm>) -> Result<()> {
        self.header("Next alarm")?;
        let Some(next) = next else {
            return self.print_info("No active alarms");
        };
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("  "),
            SetForegroundColor(Colors::ALARM_NAME),
            Print(&next.alarm.name),
            ResetColor,
            Print(format!("  {}\n", format::occurrence(next.at))),
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_history(&self, events: &[TriggerEvent], now: NaiveDateTime) -> Result<()> {
        self.header("Recent history")?;
        if events.is_empty() {
            return self.print_info("No alarms have fired yet");
        }
        let mut stdout = io::stdout();
        for event in events {
            execute!(
                stdout,
                SetForegroundColor(Colors::BELL),
                Print("  * "),
                ResetColor,
                SetForegroundColor(Colors::ALARM_NAME),
                Print(&event.alarm_name),
                ResetColor,
                Print(format!(" rang {}\n", format::time_ago(event.triggered_at, now))),
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    /// Print an informational message.
    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("  {msg}\n")),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print an error message.
    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stderr = io::stderr();
        execute!(
            stderr,
            SetForegroundColor(Colors::ERROR),
            Print(format!("error: {msg}\n")),
            ResetColor,
        )?;
        stderr.flush()?;
        Ok(())
    }
}
