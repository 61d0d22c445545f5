//! Prompt rendering for pdfqa.
//!
//! Turns a retrieved chunk and a user question into the text sent to the
//! completion model, using Handlebars with HTML escaping disabled.

pub mod builder;

// Re-export main items
pub use builder::{build_prompt, render_template, ANSWER_TEMPLATE};
