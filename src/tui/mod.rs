//! TUI module: Terminal User Interface using Ratatui.
//!
//! A single screen with:
//! - The thirteen-parameter entry form
//! - The result panel (progress gauge while a request is in flight)
//! - Service status and the medical disclaimer

mod app;
mod styles;
mod ui;
mod worker;

pub use app::App;
pub use styles::ClinicalTheme;
pub use worker::{HealthProbe, RequestProgress, RequestWorker, RequestWorkerHandle, WorkerPoll};
