//! Subprocess execution
//!
//! Every external action in the pipeline goes through a [`CommandRunner`].
//! The system implementation bounds each wait with an optional deadline and
//! a cancellation signal; the recording implementation lets tests script
//! outcomes and inspect which commands were issued.

pub mod cancel;
pub mod command;
pub mod recording;
pub mod runner;

pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use command::{CommandOutput, CommandSpec};
pub use recording::RecordingRunner;
pub use runner::{CommandRunner, SystemRunner};
