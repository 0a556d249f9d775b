//! Upload module for moodjournal
//!
//! Moves a finished capture to remote object storage: the file is checked for
//! readiness, copied into the local media library, uploaded, and the temporary
//! capture is removed whatever the outcome.

mod cloudinary;
mod library;
mod pipeline;

pub use cloudinary::{CloudinaryStore, ObjectStore, UploadMedia};
pub use library::{LocalMediaLibrary, MediaLibrary};
pub use pipeline::{daily_folder, MediaUploadPipeline};
