use std::fmt;

use crate::error::Result;
use crate::ui::prompts::select_one;

/// Operator actions offered by the interactive menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ShowInfo,
    MonitorLoop,
    Configure,
    Exit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 4] = [
        MenuAction::ShowInfo,
        MenuAction::MonitorLoop,
        MenuAction::Configure,
        MenuAction::Exit,
    ];
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuAction::ShowInfo => "Show system info",
            MenuAction::MonitorLoop => "Live monitor (Ctrl+C to stop)",
            MenuAction::Configure => "Configure GPUs",
            MenuAction::Exit => "Exit",
        };
        f.write_str(label)
    }
}

/// Show the menu and return the chosen action
pub fn select_action() -> Result<MenuAction> {
    let labels: Vec<String> = MenuAction::ALL.iter().map(|a| a.to_string()).collect();
    let choice = select_one("What do you want to do?", &labels)?;
    Ok(MenuAction::ALL[choice])
}
