//! Core application primitives (orchestrator, scheduler, HTTP surface)

pub mod http;
pub mod orchestrator;
pub mod scheduler;
pub mod state;

pub use http::*;
pub use orchestrator::*;
pub use scheduler::*;
pub use state::*;
