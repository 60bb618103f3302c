//! Render layer: turn a finished operation graph into output formats.

pub mod dot;
pub mod text;

pub use dot::render_dot;
pub use text::render_text;
