//! Text waveforms for the terminal.

use crate::circuit::Signal;

use super::Simulator;

/// Glyph drawn for one cycle of `signal`.
pub fn glyph(signal: Signal) -> char {
    match signal {
        Signal::Low => '_',
        Signal::High => '‾',
        Signal::Rising => '/',
        Signal::Falling => '\\',
        Signal::Blank => ' ',
    }
}

/// One row per monitored signal: the name, padded to a common width, then
/// one glyph per recorded cycle.
pub fn render(simulator: &Simulator) -> String {
    let traces = simulator.traces();
    let width = traces
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (name, signals) in &traces {
        out.push_str(&format!("{:<width$} : ", name, width = width));
        out.extend(signals.iter().map(|&signal| glyph(signal)));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl;

    #[test]
    fn test_render() {
        let circuit = dsl::load(
            "DEVICE_LIST: SIGGEN sg 011; SWITCH s ON; END \
             CONNECTION_LIST: END \
             MONITOR_LIST: sg; s; END",
        )
        .unwrap();
        let mut sim = Simulator::new(circuit);
        sim.run(5).unwrap();
        assert_eq!(render(&sim), "sg : _/‾ _\ns  : ‾‾‾‾‾\n");
    }

    #[test]
    fn test_render_empty() {
        let circuit = dsl::load(
            "DEVICE_LIST: SWITCH s ON; END CONNECTION_LIST: END MONITOR_LIST: s; END",
        )
        .unwrap();
        let mut sim = Simulator::new(circuit);
        assert_eq!(render(&sim), "s : \n");
        sim.unmonitor("s").unwrap();
        assert_eq!(render(&sim), "");
    }
}
