//! Distributed mode: a simple fan-out/join between one master and N workers
//!
//! The master owns the control endpoint and the final report; workers run
//! the full local engine and stream aggregate snapshots back. This is
//! deliberately not a replicated state machine: a worker that disappears
//! mid-run is simply dropped, with its last-known contribution retained.

pub mod master;
pub mod protocol;
pub mod worker;

pub use master::{Master, MasterOptions};
pub use protocol::ControlMessage;
