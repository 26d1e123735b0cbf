//! UTFGrid command line service library.
//!
//! Job configuration and the render/resolve pipelines behind the `utfgrid`
//! binary.

pub mod config;
pub mod job;
