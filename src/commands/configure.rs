//! GPU configuration command handlers: interactive prompts and flag-driven
//! one-shot apply.

use anyhow::{bail, Context, Result};
use colored::Colorize;

use crate::core::{ConfigRequest, ConfigResult, Session};
use crate::ui::{self, confirm, device_labels, input_number, render_results, select_many};

/// Settings given on the command line
#[derive(Debug, Clone)]
pub struct ConfigureArgs {
    /// Target indices; empty means every enumerated GPU
    pub gpus: Vec<u32>,
    pub power_limit_w: u32,
    pub memory_clock_offset_mhz: i32,
    pub assume_yes: bool,
    pub json: bool,
}

/// Apply the same settings to the selected GPUs without prompting for values
pub fn execute(session: &mut Session, args: &ConfigureArgs) -> Result<()> {
    check_args(args)?;

    let targets = if args.gpus.is_empty() {
        session
            .list_devices()
            .context("Cannot enumerate GPUs")?
            .iter()
            .map(|d| d.index)
            .collect()
    } else {
        args.gpus.clone()
    };

    if targets.is_empty() {
        bail!("No GPUs found");
    }

    let requests: Vec<ConfigRequest> = targets
        .iter()
        .map(|&device_index| ConfigRequest {
            device_index,
            memory_clock_offset_mhz: args.memory_clock_offset_mhz,
            power_limit_w: args.power_limit_w,
        })
        .collect();

    if !args.assume_yes {
        print_plan(&requests);
        if !confirm("Apply these settings?")? {
            ui::dimmed("Cancelled. No changes made.");
            return Ok(());
        }
    }

    let results = session.apply(&requests);
    report(&results, args.json)?;

    let failed = results.iter().filter(|r| !r.applied).count();
    if failed > 0 {
        bail!("{} of {} device(s) not configured", failed, results.len());
    }
    Ok(())
}

/// Prompt for target GPUs and per-GPU values, then apply
pub fn run_interactive(session: &mut Session) -> Result<()> {
    let devices = match session.list_devices() {
        Ok(devices) => devices,
        Err(e) => {
            ui::warn(&e.to_string());
            return Ok(());
        }
    };

    if devices.is_empty() {
        ui::warn("No GPUs found.");
        return Ok(());
    }

    let picked = select_many(
        "Select GPUs to configure (space to toggle, enter to confirm)",
        &device_labels(&devices),
    )?;
    if picked.is_empty() {
        ui::dimmed("No GPUs selected.");
        return Ok(());
    }

    let mut requests = Vec::with_capacity(picked.len());
    for position in picked {
        let gpu = &devices[position];
        println!("\n{}", format!("GPU {}: {}", gpu.index, gpu.name).bold());

        let memory_clock_offset_mhz =
            input_number::<i32>("Memory clock offset in MHz (0 = default clock)", 0)?;
        let power_limit_w = input_number::<u32>(
            &format!(
                "Power limit in W ({}-{})",
                gpu.power_limit_min_w, gpu.power_limit_max_w
            ),
            gpu.power_limit_w,
        )?;

        requests.push(ConfigRequest {
            device_index: gpu.index,
            memory_clock_offset_mhz,
            power_limit_w,
        });
    }

    print_plan(&requests);
    if !confirm("Apply these settings?")? {
        ui::dimmed("Cancelled. No changes made.");
        return Ok(());
    }

    let results = session.apply(&requests);
    report(&results, false)
}

/// JSON output has no room for the plan and the confirmation prompt
fn check_args(args: &ConfigureArgs) -> Result<()> {
    if args.json && !args.assume_yes {
        bail!("--json requires --yes");
    }
    Ok(())
}

fn print_plan(requests: &[ConfigRequest]) {
    println!();
    ui::info("Planned changes:");
    for request in requests {
        println!(
            "  GPU {}: memory clock offset {:+} MHz, power limit {} W",
            request.device_index, request.memory_clock_offset_mhz, request.power_limit_w
        );
    }
    ui::dimmed("Previous values are not saved; note them if you may want to restore them.");
    println!();
}

fn report(results: &[ConfigResult], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    println!();
    print!("{}", render_results(results));
    if results.iter().all(|r| r.applied) {
        ui::success("Configuration complete.");
    }
    Ok(())
}
