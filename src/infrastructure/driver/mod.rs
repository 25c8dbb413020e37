//! Browser driver implementations

mod scripted;

pub use scripted::ScriptedDriver;
