//! Document templating codec for PDF files.
//!
//! [`template::extract`] derives a [`template::Template`] from a rendered
//! document; [`template::generate`] renders a new document from a template and
//! a data dictionary. Raw parsing and rendering go through the
//! [`engine::DocumentEngine`] boundary.

pub mod contract;
pub mod engine;
pub mod input;
pub mod template;
pub mod tools;
