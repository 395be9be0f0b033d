//! Utility functions shared by the session and the renderers.
//!
//! - **URL checks**: only web URLs are handed to the desktop opener
//! - **Text processing**: Unicode-aware width calculation, clipping, and
//!   sanitizing of text that came from the network or a child process

mod text;
mod open_url;

pub use self::text::{clip_to_width, display_width, strip_control_chars, truncate_to_width};
pub use self::open_url::{validate_url_for_open, UrlValidationError};
