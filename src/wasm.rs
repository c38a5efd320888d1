//! WASM bindings for Logsim Core.
//!
//! This module provides JavaScript-friendly bindings for driving the
//! simulator from a web page.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmLogicSim } from 'logsim_core';
//!
//! await init();
//!
//! const definition = `
//!   DEVICE_LIST: SWITCH sw OFF; CLOCK clk 2; AND g 2; END
//!   CONNECTION_LIST: sw -> g.1; clk -> g.2; END
//!   MONITOR_LIST: g; clk; END
//! `;
//!
//! const sim = new WasmLogicSim(definition);
//! sim.run(10);
//! sim.set_switch("sw", true);
//! sim.continue_run(10);
//! const codes = sim.trace("g"); // Uint8Array, one code per cycle
//! ```

use wasm_bindgen::prelude::*;

use crate::dsl;
use crate::sim::{waveform, Simulator, SimulatorConfig};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WASM-compatible logic simulator.
///
/// This struct wraps the native `Simulator` and provides a JavaScript-friendly API.
#[wasm_bindgen]
pub struct WasmLogicSim {
    simulator: Simulator,
}

#[wasm_bindgen]
impl WasmLogicSim {
    /// Create a new simulator from a definition file.
    ///
    /// # Returns
    /// A new `WasmLogicSim` instance, or the rendered error report if the
    /// definition does not parse.
    #[wasm_bindgen(constructor)]
    pub fn new(definition: &str) -> Result<WasmLogicSim, JsValue> {
        Self::with_config(definition, crate::circuit::DEFAULT_SETTLE_MARGIN)
    }

    /// Create a new simulator with a custom settle margin.
    ///
    /// # Arguments
    /// * `definition` - The circuit in the logic definition language
    /// * `settle_margin` - Extra settle passes per cycle before oscillation (default: 2)
    #[wasm_bindgen]
    pub fn with_config(definition: &str, settle_margin: usize) -> Result<WasmLogicSim, JsValue> {
        let outcome = dsl::parse(definition);
        if !outcome.is_success() {
            return Err(JsValue::from_str(&outcome.report.render(definition)));
        }

        let config = SimulatorConfig::new().with_settle_margin(settle_margin);
        let simulator = Simulator::with_config(outcome.circuit, config);

        Ok(WasmLogicSim { simulator })
    }

    /// Cold start and run `cycles` cycles.
    #[wasm_bindgen]
    pub fn run(&mut self, cycles: usize) -> Result<(), JsValue> {
        self.simulator.run(cycles).map_err(js_error)
    }

    /// Run `cycles` more cycles without resetting.
    #[wasm_bindgen]
    pub fn continue_run(&mut self, cycles: usize) -> Result<(), JsValue> {
        self.simulator.continue_run(cycles).map_err(js_error)
    }

    /// Set a switch by name.
    #[wasm_bindgen]
    pub fn set_switch(&mut self, name: &str, on: bool) -> Result<(), JsValue> {
        self.simulator.set_switch(name, on).map_err(js_error)
    }

    /// Start monitoring an output (`dev` or `dev.PIN`).
    #[wasm_bindgen]
    pub fn monitor(&mut self, name: &str) -> Result<(), JsValue> {
        self.simulator.monitor(name).map_err(js_error)
    }

    /// Stop monitoring an output.
    #[wasm_bindgen]
    pub fn unmonitor(&mut self, name: &str) -> Result<bool, JsValue> {
        self.simulator.unmonitor(name).map_err(js_error)
    }

    /// Trace of a monitored output, one code per cycle:
    /// 0 low, 1 high, 2 rising, 3 falling, 4 blank.
    ///
    /// # Returns
    /// The codes, or `undefined` if the output is not monitored.
    #[wasm_bindgen]
    pub fn trace(&self, name: &str) -> Option<Vec<u8>> {
        self.simulator
            .trace(name)
            .map(|signals| signals.iter().map(|s| s.code()).collect())
    }

    /// Names of every output, monitored ones first.
    #[wasm_bindgen]
    pub fn signal_names(&self) -> Vec<JsValue> {
        let (monitored, unmonitored) = self.simulator.circuit().signal_names();
        monitored
            .into_iter()
            .chain(unmonitored)
            .map(|name| JsValue::from_str(&name))
            .collect()
    }

    /// Names of every switch.
    #[wasm_bindgen]
    pub fn switch_names(&self) -> Vec<JsValue> {
        self.simulator
            .circuit()
            .switch_names()
            .into_iter()
            .map(|name| JsValue::from_str(&name))
            .collect()
    }

    /// Text waveform of every monitored output.
    #[wasm_bindgen]
    pub fn waveform(&self) -> String {
        waveform::render(&self.simulator)
    }

    /// Cycles completed since the last `run`.
    #[wasm_bindgen(getter)]
    pub fn cycles_completed(&self) -> usize {
        self.simulator.cycles_completed()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
