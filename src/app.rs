pub mod assembler;
pub mod config;
pub mod driver;
pub mod reducer;
pub mod retention;
pub mod state;
