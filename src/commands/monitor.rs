//! Live monitor command handler.
//!
//! Redraws a snapshot every interval until Ctrl+C or the tick limit.

use anyhow::Result;

use crate::core::{ConsoleSettings, Session, StopSignal};
use crate::ui::{self, clear_screen, render_snapshot};

/// Execute the monitor command
pub fn execute(session: &mut Session, settings: &ConsoleSettings, stop: &StopSignal) -> Result<()> {
    let json = settings.json;
    stop.reset();

    if !json {
        ui::info(&format!(
            "Starting live monitor (every {}s). Press Ctrl+C to stop.",
            settings.interval.as_duration().as_secs()
        ));
    }

    let stats = session.monitor(settings.interval, stop, settings.max_ticks, |snapshot| {
        if json {
            // One JSON document per line, for scripting
            println!("{}", serde_json::to_string(snapshot)?);
        } else {
            clear_screen()?;
            print!("{}", render_snapshot(snapshot));
            println!();
            ui::dimmed("Press Ctrl+C to stop monitoring.");
        }
        Ok(())
    });

    // Leave the signal clear for the next action
    stop.reset();

    if !json {
        ui::info(&format!("Monitor stopped after {} tick(s).", stats.ticks));
        if stats.failures > 0 {
            ui::warn(&format!(
                "{} tick(s) failed; run with --verbose for details.",
                stats.failures
            ));
        }
    }
    Ok(())
}
