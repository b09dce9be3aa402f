//! Control loop for the charger controller
//!
//! [`Controller::tick`] is one pass of the loop: sample the E-stop, expire
//! staging, decide, arm staging for the next tick, drive the outputs and
//! report transitions. [`run`] calls it on a fixed interval until shutdown.

mod controller;
mod reporter;

pub use controller::{run, Controller};
pub use reporter::{ChangeMemory, StatusReporter};
