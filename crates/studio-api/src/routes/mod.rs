pub mod chat;
pub mod composio;
pub mod health;
pub mod threads;
