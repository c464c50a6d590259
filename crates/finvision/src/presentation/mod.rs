//! Read-only view model over queue snapshots, plus intake helpers that turn
//! picked or dropped paths into uploads.

pub mod intake;
pub mod view;

pub use intake::{files_from_dropped, files_from_paths, is_accepted_mime};
pub use view::{BadgeTone, QueueRow, QueueView};
