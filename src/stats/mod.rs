//! Trigger statistics: detection accuracy and lead/lag against reference events.

pub mod events;
pub mod summary;

pub use events::*;
pub use summary::*;
