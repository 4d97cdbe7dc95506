//! Interactive operator menu.

use anyhow::Result;

use crate::commands::{configure, info, monitor};
use crate::core::{ConsoleSettings, PollInterval, Session, StopSignal};
use crate::ui::{self, input_number, select_action, MenuAction};

/// Run the menu until the operator exits. Failed actions are reported and
/// the menu is shown again.
pub fn execute(session: &mut Session, settings: &ConsoleSettings, stop: &StopSignal) -> Result<()> {
    // Menu output is always human-readable
    let mut settings = settings.clone().with_json(false);

    info::report_gpu_status(session);

    loop {
        println!();
        let action = match select_action() {
            Ok(action) => action,
            Err(e) => {
                ui::warn(&format!("Menu closed: {}", e));
                break;
            }
        };

        let outcome = match action {
            MenuAction::ShowInfo => info::execute(session, &settings),
            MenuAction::MonitorLoop => match ask_interval(&settings) {
                Ok(interval) => {
                    settings.interval = interval;
                    monitor::execute(session, &settings, stop)
                }
                Err(e) => Err(e),
            },
            MenuAction::Configure => configure::run_interactive(session),
            MenuAction::Exit => break,
        };

        if let Err(e) = outcome {
            ui::error(&format!("Error: {:#}", e));
        }
    }

    Ok(())
}

fn ask_interval(settings: &ConsoleSettings) -> Result<PollInterval> {
    let secs = input_number::<u64>(
        "Refresh interval in seconds",
        settings.interval.as_duration().as_secs(),
    )?;
    Ok(PollInterval::from_secs(secs)?)
}
