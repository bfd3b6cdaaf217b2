//! staffetta-core: tipi condivisi dal relay (modello Message, DTO HTTP, frame del protocollo realtime, errori).
//! Niente I/O: solo serde e time.

pub mod models;
pub mod protocol;
pub mod error;
pub mod utils;

// Re-export utili per ridurre i percorsi nel crate server
pub use error::{ErrorBody, FETCH_FAILED, SAVE_FAILED, TEXT_REQUIRED};
pub use models::message::Message;
pub use protocol::http::CreateMessageRequest;
pub use protocol::realtime::{
    Action, ChannelMessage, DecodeError, ErrorInfo, InboundEvent, ProtocolMessage,
};
pub use utils::now_timestamp;
