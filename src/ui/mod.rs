pub mod chat;
pub mod window;
