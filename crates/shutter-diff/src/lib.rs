//! Image comparison and failure composites.
//!
//! Comparison is exact on canonical encodings. When a snapshot does not
//! match, [`compose`] builds a labelled side-by-side image for review.

pub mod compare;
pub mod compose;
pub mod font;

pub use compare::images_equal;
pub use compose::{canvas_size, compose, HEADER_HEIGHT, HORIZONTAL_GAP};
