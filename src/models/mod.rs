pub mod chat;
pub mod telegram;
