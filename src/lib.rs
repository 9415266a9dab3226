//! IELTS Practice Core Library
//!
//! This crate provides the core functionality for the IELTS practice tool,
//! including the timed speaking sequencer, microphone capture coordination,
//! timed writing tasks, artifact export, and telemetry.

pub mod app;
pub mod capture;
pub mod config;
pub mod export;
pub mod speaking;
pub mod telemetry;
pub mod writing;

mod dirs_compat;

pub use app::PracticeApp;
pub use config::PracticeConfig;
