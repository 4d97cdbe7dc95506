use anyhow::Result;

use crate::core::{ConsoleSettings, Session};
use crate::ui::{self, render_snapshot};

/// Show one snapshot of host and GPU state
pub fn execute(session: &mut Session, settings: &ConsoleSettings) -> Result<()> {
    let snapshot = session.snapshot();

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!();
    print!("{}", render_snapshot(&snapshot));
    report_gpu_status(session);
    Ok(())
}

/// Tell the operator, once, why GPU features are missing
pub fn report_gpu_status(session: &Session) {
    if let Some(reason) = session.gpu_unavailable_reason() {
        ui::warn(&format!("GPU features unavailable: {}", reason));
        ui::dimmed("Host metrics remain available.");
    }
}
