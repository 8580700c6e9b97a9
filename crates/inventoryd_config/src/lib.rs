//! Config loading support for inventoryd.
//!
//! Files are parsed into a partial form whose leaves are [`Located`] values,
//! merged first-wins, then converted and validated. Problems at every stage
//! become [`Diagnostic`]s rendered with ariadne.

mod diagnostics;
mod finalize;
mod located;
mod mergeable;

pub use diagnostics::Diagnostic;
pub use diagnostics::Diagnostics;
pub use diagnostics::Error;
pub use diagnostics::LoadError;
pub use diagnostics::MergeConflictLocation;
pub use diagnostics::MergeError;
pub use diagnostics::SourceInfo;
pub use diagnostics::ValidationError;
pub use diagnostics::Warning;
pub use diagnostics::format_diagnostics;
pub use finalize::TryFromPartial;
pub use finalize::Validate;
pub use finalize::finish;
pub use located::Located;
pub use mergeable::PartialConfig;
pub use mergeable::load_files;
pub use mergeable::merge_field;
pub use mergeable::merge_map;
pub use mergeable::parse_source;
pub use mergeable::read_source;
