pub mod config;
pub mod game_loop;
pub mod sim;
