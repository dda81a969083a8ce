//! Document processing: validation, pipeline thresholding, and generative reply handling.

pub mod local;
pub mod prompt;
mod remote;
mod validate;

pub use local::{Classification, LocalProcessingApi, LocalProcessingService};
pub use prompt::DocumentInsight;
pub use remote::{RemoteProcessingApi, RemoteProcessingService};
pub use validate::{ValidationError, validate_document};
