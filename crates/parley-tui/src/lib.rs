//! parley-tui: Terminal UI widgets
//!
//! Key mapping, colors and the handful of widgets the chat screen is built
//! from. Nothing here knows about sessions or models; the binary feeds
//! plain strings in.

pub mod input;
pub mod theme;
pub mod widgets;

pub use theme::Theme;
