//! Event log access
//!
//! `EventSource` is the seam the watcher polls; `WevtutilEventSource` is the
//! Windows implementation.

pub mod traits;
pub mod wevtutil;

pub use traits::EventSource;
pub use wevtutil::{WevtutilEventSource, parse_rendered_xml};
