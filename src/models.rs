pub mod asset;
pub mod badge;
pub mod emote;
pub mod message;
