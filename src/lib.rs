//! # turtle-script
//!
//! Interpreter for a small line-oriented movement language driving a
//! resource-bounded turtle over an integer grid.
//!
//! Scripts hold one instruction per line: five primitive commands (`up`,
//! `down`, `left`, `right`, `paint`), fixed-count repetition (`N times` ...
//! `end`, nestable), and `#` comments. The [`Turtle`] spends battery, fuel
//! and paint as it executes and halts the run when a pool empties, leaving
//! its painted field and bounds inspectable. [`Observer`] hooks expose the
//! run lifecycle to debuggers, summaries and renderers without coupling
//! the core to any of them; [`render_image`] turns a painted field into a
//! picture and [`generate`] turns a picture back into a script.

pub mod codegen;
pub mod error;
pub mod interpreter;
pub mod observer;
pub mod render;
pub mod turtle;

pub use codegen::*;
pub use error::*;
pub use interpreter::*;
pub use observer::*;
pub use render::*;
pub use turtle::*;
