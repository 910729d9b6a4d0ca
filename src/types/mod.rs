// Public modules
pub mod attachment;
pub mod generate_options;
pub mod generate_request;
pub mod generate_response;
pub mod message;
pub mod usage;

// Re-exports
pub use attachment::{Attachment, AttachmentSource};
pub use generate_options::{DEFAULT_NUM_CTX, DEFAULT_TEMPERATURE, GenerateOptions};
pub use generate_request::GenerateRequest;
pub use generate_response::{GenerateResponse, Generation, GenerationEvent};
pub use message::Message;
pub use usage::Usage;
