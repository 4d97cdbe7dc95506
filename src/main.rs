use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};

use rigmon::commands::{self, ConfigureArgs};
use rigmon::core::{ConsoleSettings, Session, StopSignal};

fn main() -> Result<()> {
    let matches = Command::new("rigmon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Operator console for mining rigs: host/GPU monitoring and GPU configuration")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Show informational log messages (RUST_LOG overrides)")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("sample-ms")
                .long("sample-ms")
                .value_name("MS")
                .help("CPU sampling window in milliseconds (clamped to at most 1000)")
                .value_parser(clap::value_parser!(u64))
                .default_value("500")
                .global(true),
        )
        .subcommand(
            Command::new("info")
                .about("Show host and GPU information once")
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("monitor")
                .about("Live host and GPU monitor (Ctrl+C to stop)")
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("SECONDS")
                        .help("Refresh interval in seconds (minimum 1)")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("2"),
                )
                .arg(
                    Arg::new("count")
                        .short('n')
                        .long("count")
                        .value_name("TICKS")
                        .help("Stop after this many refreshes")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("configure")
                .about("Set power limit and memory clock offset on one or more GPUs")
                .arg(
                    Arg::new("gpu")
                        .short('g')
                        .long("gpu")
                        .value_name("INDEX")
                        .help("GPU index to configure (repeatable; default: all GPUs)")
                        .value_parser(clap::value_parser!(u32))
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("power")
                        .short('p')
                        .long("power")
                        .value_name("WATTS")
                        .help("Power limit in watts")
                        .value_parser(clap::value_parser!(u32))
                        .required(true),
                )
                .arg(
                    Arg::new("mem-offset")
                        .short('m')
                        .long("mem-offset")
                        .value_name("MHZ")
                        .help("Memory clock offset in MHz relative to the default clock")
                        .value_parser(clap::value_parser!(i32))
                        .allow_negative_numbers(true)
                        .default_value("0"),
                )
                .arg(
                    Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .help("Apply without asking for confirmation")
                        .action(ArgAction::SetTrue),
                )
                .arg(json_arg().requires("yes")),
        )
        .subcommand(Command::new("menu").about("Interactive menu (default)"))
        .get_matches();

    rigmon::init_logging(matches.get_flag("verbose"));

    let sample_ms = matches.get_one::<u64>("sample-ms").copied().unwrap_or(500);
    let settings = ConsoleSettings::default().with_sample_window_ms(sample_ms);

    let stop = StopSignal::new();
    stop.install_ctrlc()?;

    let mut session = Session::open(settings.sample_window);

    match matches.subcommand() {
        Some(("info", sub_matches)) => {
            let settings = settings.with_json(sub_matches.get_flag("json"));
            commands::info::execute(&mut session, &settings)
        }
        Some(("monitor", sub_matches)) => {
            let settings = monitor_settings(settings, sub_matches)?;
            commands::monitor::execute(&mut session, &settings, &stop)
        }
        Some(("configure", sub_matches)) => {
            let args = configure_args(sub_matches);
            commands::configure::execute(&mut session, &args)
        }
        _ => commands::menu::execute(&mut session, &settings, &stop),
    }
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Print JSON instead of formatted text")
        .action(ArgAction::SetTrue)
}

fn monitor_settings(settings: ConsoleSettings, matches: &ArgMatches) -> Result<ConsoleSettings> {
    let interval = matches.get_one::<u64>("interval").copied().unwrap_or(2);
    let count = matches.get_one::<u64>("count").copied();

    Ok(settings
        .with_interval_secs(interval)?
        .with_max_ticks(count)
        .with_json(matches.get_flag("json")))
}

fn configure_args(matches: &ArgMatches) -> ConfigureArgs {
    ConfigureArgs {
        gpus: matches
            .get_many::<u32>("gpu")
            .map(|values| values.copied().collect())
            .unwrap_or_default(),
        power_limit_w: matches.get_one::<u32>("power").copied().unwrap_or_default(),
        memory_clock_offset_mhz: matches.get_one::<i32>("mem-offset").copied().unwrap_or(0),
        assume_yes: matches.get_flag("yes"),
        json: matches.get_flag("json"),
    }
}
