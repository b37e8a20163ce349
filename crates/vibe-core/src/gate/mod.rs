mod runner;
mod session_gate;
mod window;

pub use runner::{GateExit, GateHandle, GateRunner, DEFAULT_TICK_PERIOD};
pub use session_gate::SessionWindowGate;
pub use window::{
    format_clock, SessionWindow, Transition, WindowId, WindowSnapshot, WindowState,
    DEFAULT_TOTAL_DURATION_SECS, DEFAULT_WARNING_THRESHOLD_SECS,
};
