pub mod cache;
pub mod fetch;
pub mod twitch_api;
