use crate::{core::irc::PrivMsg, models::message::ChatMessage};

#[derive(Debug)]
pub enum AppEvent {
    Irc(IrcEvent),
    Connection(ConnectionEvent),
    Chat(ChatEvent),
}

#[derive(Debug)]
pub enum IrcEvent {
    PrivMsg(PrivMsg),
}

#[derive(Debug)]
pub enum ConnectionEvent {
    Connected(String),
    Closed(String),
}

#[derive(Debug)]
pub enum ChatEvent {
    NewChatMessage(ChatMessage),
    MessageDiscarded(String),
}
