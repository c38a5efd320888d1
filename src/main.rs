//! Logsim - Logic Network Simulator
//!
//! Compiles a logic definition file and simulates it for a number of cycles,
//! printing the monitored signals as text waveforms.
//!
//! # Usage
//!
//! ```bash
//! logsim counter.def -n 20 --switch reset=0 --monitor d1.QBAR --vcd counter.vcd
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{info, LevelFilter};
use logsim_core::{
    circuit::validate_circuit,
    dsl,
    error::Result,
    sim::{vcd, waveform},
    Simulator,
};

/// Logic network simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the circuit definition file
    #[arg(value_name = "CIRCUIT_FILE")]
    circuit_file: PathBuf,

    /// Number of cycles to simulate
    #[arg(short = 'n', long, default_value_t = 10)]
    cycles: usize,

    /// Set a switch before running, e.g. `sw1=1`
    #[arg(long = "switch", value_name = "NAME=0|1", value_parser = parse_switch)]
    switches: Vec<(String, bool)>,

    /// Monitor an additional output (`dev` or `dev.PIN`)
    #[arg(long = "monitor", value_name = "SIGNAL")]
    monitors: Vec<String>,

    /// Stop monitoring an output named in the definition file
    #[arg(long = "unmonitor", value_name = "SIGNAL")]
    unmonitors: Vec<String>,

    /// Also write the traces to a VCD file
    #[arg(long, value_name = "PATH")]
    vcd: Option<PathBuf>,

    /// List monitored and unmonitored signals and the switches, then exit
    #[arg(long)]
    list_signals: bool,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_switch(arg: &str) -> std::result::Result<(String, bool), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=0|1, got '{}'", arg))?;
    let on = match value {
        "0" => false,
        "1" => true,
        _ => return Err(format!("switch value must be 0 or 1, got '{}'", value)),
    };
    Ok((name.to_string(), on))
}

fn init_logging(verbose: u8) -> std::result::Result<(), log::SetLoggerError> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

fn run(args: Args) -> Result<()> {
    // Parse the definition file
    let circuit = dsl::parse_file(&args.circuit_file)?;
    let mut simulator = Simulator::new(circuit);

    for (name, on) in &args.switches {
        simulator.set_switch(name, *on)?;
    }
    for name in &args.monitors {
        simulator.monitor(name)?;
    }
    for name in &args.unmonitors {
        if !simulator.unmonitor(name)? {
            info!("{} was not monitored", name);
        }
    }

    if args.list_signals {
        let circuit = simulator.circuit();
        let (monitored, unmonitored) = circuit.signal_names();
        println!("Monitored:   {}", monitored.join(" "));
        println!("Unmonitored: {}", unmonitored.join(" "));
        println!("Switches:    {}", circuit.switch_names().join(" "));
        return Ok(());
    }

    // Validate
    validate_circuit(simulator.circuit())?;

    // Simulate, keeping whatever was recorded if the network oscillates
    let outcome = simulator.run(args.cycles);
    print!("{}", waveform::render(&simulator));

    if let Some(path) = &args.vcd {
        let file = File::create(path)?;
        vcd::write_vcd(simulator.circuit(), BufWriter::new(file))?;
        info!("Wrote {}", path.display());
    }

    outcome
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("failed to initialise logging: {}", e);
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
