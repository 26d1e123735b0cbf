//! Common types shared across the UTFGrid workspace.

pub mod error;
pub mod extent;
pub mod field;

pub use error::{ErrorCategory, GridError, GridResult};
pub use extent::{Extent, ExtentParseError, Request};
pub use field::{AttributeRecord, AttributeValue, FieldDef, FieldType, FieldValue, ScalarKind};
