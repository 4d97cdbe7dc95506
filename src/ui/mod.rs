// UI and formatting module

pub mod formatters;
pub mod menu;
pub mod prompts;
pub mod render;

// Re-export commonly used items for cleaner imports
pub use formatters::{format_bytes, format_timestamp, format_usage, format_watts};
pub use menu::{select_action, MenuAction};
pub use prompts::{confirm, dimmed, error, info, input_number, select_many, success, warn};
pub use render::{clear_screen, device_labels, render_host_info, render_results, render_snapshot};
