//! Utility functions
//!
//! Helpers shared by the session and the snapshot display.

pub mod size;
