//! Split-pane terminal client for Feedly.
//!
//! - `app` - session state and the operations bound to keys
//! - `feed` - data model, the `FeedBackend` seam and the Feedly client
//! - `preview` - inline renderer and full-screen viewer commands
//! - `ui` - terminal loop and rendering

pub mod app;
pub mod config;
pub mod feed;
pub mod keybindings;
pub mod preview;
pub mod read_tracking;
pub mod selection;
pub mod status;
pub mod theme;
pub mod ui;
pub mod util;
