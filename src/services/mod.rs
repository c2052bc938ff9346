//! External collaborators: quote source, chat completion and credential gate.

pub mod chat;
pub mod credentials;
pub mod market_data;
pub mod retry;
pub mod yahoo;

pub use chat::{ChatCompleter, ChatError, OpenAiChatClient};
pub use credentials::{CredentialVerifier, StaticTokenVerifier};
pub use market_data::{SeriesSource, SourceError};
pub use retry::RetryPolicy;
pub use yahoo::YahooChartClient;
