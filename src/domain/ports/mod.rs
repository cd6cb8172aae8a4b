//! Ports: interfaces to the external collaborators of the verification core.

pub mod language_model;
pub mod progress;
pub mod search;

pub use language_model::{Completion, LanguageModelClient};
pub use progress::{ChannelProgress, NoopProgress, ProgressObserver};
pub use search::SearchClient;
