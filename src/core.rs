pub mod irc;
pub mod pipeline;
pub mod splice;
pub mod tags;
