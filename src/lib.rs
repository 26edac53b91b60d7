pub mod app_config;
pub mod assistant;
pub mod brokerage;
pub mod calendar;
pub mod google_auth;
pub mod intent;
pub mod mailer;
pub mod models;
pub mod notify;
pub mod server;
pub mod sheets;
pub mod store;
pub mod twiml;

pub use app_config::AppConfig;
pub use assistant::AssistantClient;
pub use models::{Conversation, Intent, Turn, TurnRole};
pub use store::ConversationStore;
