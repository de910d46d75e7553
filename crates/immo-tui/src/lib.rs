// Terminal front end for the property assistant: orchestrator and TUI.

pub mod app;
pub mod tui;
