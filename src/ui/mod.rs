//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop, terminal setup and hand-off to viewers
//! - `input` - Key dispatch and the subscription prompt editor
//! - `render` - Pane geometry and frame rendering
//! - `categories` - Category list pane
//! - `posts` - Posts pane
//! - `preview` - Preview pane
//! - `status` - Status and info rows

mod categories;
mod input;
mod loop_runner;
mod posts;
mod preview;
mod render;
mod status;

pub use loop_runner::run;
