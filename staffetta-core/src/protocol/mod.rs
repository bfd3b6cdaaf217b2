pub mod http;
pub mod realtime;

// Re-export comodi
pub use http::CreateMessageRequest;
pub use realtime::{Action, ChannelMessage, DecodeError, ErrorInfo, InboundEvent, ProtocolMessage};
