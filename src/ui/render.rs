//! Text rendering of snapshots and configuration results.

use std::io::{self, Write};

use colored::*;
use crossterm::{cursor, execute, terminal};

use crate::core::types::{ConfigResult, GpuDevice, HostInfo, Snapshot, UNKNOWN};
use crate::ui::formatters::{format_bytes, format_timestamp, format_usage, format_watts};

const RULE_WIDTH: usize = 72;

pub fn render_host_info(host: &HostInfo) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "SYSTEM INFORMATION".bold().bright_cyan()));
    out.push_str(&format!("{}\n", "=".repeat(RULE_WIDTH)));

    let rows = [
        ("OS", format!("{} {}", host.os_name, host.os_version)),
        (
            "Kernel",
            host.kernel_version
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
        ),
        ("Architecture", host.architecture.clone()),
        ("CPU", host.cpu_model.clone()),
        ("Cores", host.cpu_cores.to_string()),
        ("Threads", host.cpu_threads.to_string()),
        ("RAM (Total)", format_bytes(host.total_memory_bytes)),
    ];
    for (label, value) in rows {
        out.push_str(&format!("  {:<14} {}\n", format!("{}:", label).bold(), value));
    }
    out
}

pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut out = render_host_info(&snapshot.host);

    out.push('\n');
    out.push_str(&format!(
        "{} {}\n",
        "RESOURCE USAGE".bold().bright_cyan(),
        format!("({})", format_timestamp(snapshot.live.timestamp)).dimmed()
    ));
    out.push_str(&format!("{}\n", "=".repeat(RULE_WIDTH)));
    out.push_str(&format!(
        "  {:<14} {}\n",
        "CPU Usage:".bold(),
        colorize_percent(snapshot.live.cpu_percent)
    ));
    out.push_str(&format!(
        "  {:<14} {}\n",
        "RAM Usage:".bold(),
        format_usage(
            snapshot.live.memory_used_bytes,
            snapshot.live.memory_total_bytes
        )
    ));

    out.push('\n');
    out.push_str(&format!("{}\n", "GPUS".bold().bright_cyan()));
    out.push_str(&format!("{}\n", "=".repeat(RULE_WIDTH)));
    if snapshot.gpus.is_empty() {
        out.push_str(&format!("  {}\n", "No GPUs available".dimmed()));
    } else {
        for gpu in &snapshot.gpus {
            out.push_str(&render_gpu_line(gpu));
        }
        out.push_str(&format!(
            "  {} {}\n",
            "Total GPU Power:".bold(),
            format_watts(Some(snapshot.total_power_draw_w()))
        ));
    }
    out
}

fn render_gpu_line(gpu: &GpuDevice) -> String {
    format!(
        "  GPU {} {}\n      temp {}°C | util {:.0}% | mem clock {} MHz | power {} (limit {} W, range {}-{} W)\n",
        gpu.index,
        gpu.name.bold(),
        gpu.temperature_c,
        gpu.utilization_percent,
        gpu.memory_clock_mhz,
        format_watts(gpu.power_draw_w),
        gpu.power_limit_w,
        gpu.power_limit_min_w,
        gpu.power_limit_max_w
    )
}

/// One line per device, for selection prompts
pub fn device_labels(devices: &[GpuDevice]) -> Vec<String> {
    devices
        .iter()
        .map(|gpu| {
            let memory = gpu
                .memory_total_bytes
                .map(format_bytes)
                .unwrap_or_else(|| "N/A".to_string());
            format!(
                "GPU {}: {} (Memory: {}, Power Limit: {} W, range {}-{} W)",
                gpu.index,
                gpu.name,
                memory,
                gpu.power_limit_w,
                gpu.power_limit_min_w,
                gpu.power_limit_max_w
            )
        })
        .collect()
}

pub fn render_results(results: &[ConfigResult]) -> String {
    let mut out = String::new();
    for result in results {
        if result.applied {
            out.push_str(&format!(
                "  {} GPU {}: applied\n",
                "✓".green().bold(),
                result.device_index
            ));
        } else {
            out.push_str(&format!(
                "  {} GPU {}: {}\n",
                "✗".red().bold(),
                result.device_index,
                result.error.as_deref().unwrap_or("not applied").red()
            ));
        }
    }

    let applied = results.iter().filter(|r| r.applied).count();
    out.push_str(&format!(
        "\n{} of {} device(s) configured\n",
        applied,
        results.len()
    ));
    out
}

fn colorize_percent(percent: f32) -> ColoredString {
    let text = format!("{:.1}%", percent);
    if percent >= 90.0 {
        text.red().bold()
    } else if percent >= 70.0 {
        text.yellow()
    } else {
        text.green()
    }
}

/// Clear the terminal and move the cursor home, between polling ticks
pub fn clear_screen() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(0, 0)
    )?;
    stdout.flush()
}
