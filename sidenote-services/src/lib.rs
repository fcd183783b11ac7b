pub mod chat;
pub mod error;
pub mod knowledge;
pub mod sanitize;

pub use chat::{ChatAssistantClient, ChatService, ConversationHistory, mask_api_key};
pub use error::{ServiceError, ServiceResult};
pub use knowledge::{
    ConnectionConfig, KnowledgeBaseClient, KnowledgeService, SaveOutcome, journal_page_name,
};
pub use sanitize::clean_response;
