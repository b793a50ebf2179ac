pub mod help;
pub mod pipeline;
pub mod provider;
pub mod shapes;

pub use provider::{BackendError, ChatBackend};
pub use shapes::ShapesClient;
