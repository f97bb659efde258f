//! Domain model for the report front end
//!
//! Map and crash types live in `pmap-common`; this module only adds the
//! errors raised while turning them into reports.

pub mod errors;

pub use errors::ReportError;
