pub mod errors;
pub mod id;
pub mod turn;

pub use errors::{ConfigError, DocChatError};
pub use id::{new_id, TurnId};
pub use turn::{ConversationTurn, Speaker};

pub type Result<T> = std::result::Result<T, DocChatError>;
