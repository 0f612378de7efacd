pub mod cells;
pub mod config;
pub mod document;
pub mod error;
pub mod session;
pub mod shadow;
pub mod text;
pub mod tracker;

pub use error::{CellTrackError, CellTrackResult};
pub use session::{HostEvent, InteractiveMessage, InteractiveSession};
pub use shadow::{EditDelta, ShadowDocument, ShadowNotification};
pub use tracker::{CellRangeTracker, FileHashes, TrackedRange};
