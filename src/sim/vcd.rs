//! [VCD](https://en.wikipedia.org/wiki/Value_change_dump) export of the
//! recorded traces.

use std::io;

use crate::circuit::{Circuit, Signal};
use crate::error::Result;

/// Scope every wire is declared in.
const SCOPE: &str = "logsim";

fn value(signal: Signal) -> ::vcd::Value {
    match signal.level() {
        Some(high) => high.into(),
        None => ::vcd::Value::X,
    }
}

/// Write every monitored trace as a 1-bit wire, one timestamp per cycle.
/// Blank cycles are written as `x`. Only changes are emitted after the
/// first timestamp.
pub fn write_vcd<W: io::Write>(circuit: &Circuit, w: W) -> Result<()> {
    let mut w = ::vcd::Writer::new(w);
    w.timescale(1, ::vcd::TimescaleUnit::S)?;
    w.add_module(SCOPE)?;

    let mut wires = Vec::new();
    for trace in circuit.monitors.iter() {
        let name = circuit.signal_name(trace.point);
        wires.push((w.add_wire(1, &name)?, trace.signals.as_slice()));
    }
    w.upscope()?;
    w.enddefinitions()?;

    let cycles = wires
        .iter()
        .map(|(_, signals)| signals.len())
        .max()
        .unwrap_or(0);
    let mut last: Vec<Option<::vcd::Value>> = vec![None; wires.len()];
    for cycle in 0..cycles {
        w.timestamp(cycle as u64)?;
        for ((id, signals), last) in wires.iter().zip(last.iter_mut()) {
            let Some(&signal) = signals.get(cycle) else {
                continue;
            };
            let v = value(signal);
            if *last != Some(v) {
                w.change_scalar(*id, v)?;
                *last = Some(v);
            }
        }
    }
    w.timestamp(cycles as u64)?;
    Ok(())
}
