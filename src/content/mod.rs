//! Content shaping for marketing copy.
//!
//! This module turns a user's topic plus optional style hints into:
//! - the prompt sent to a text provider
//! - a canned local fallback when no provider answers
//!
//! Everything here is pure string formatting.

mod fallback;
mod style;
mod template;

pub use fallback::fallback_body;
pub use style::{CreativityLevel, StyleParameters};
pub use template::{build_prompt, Template};
