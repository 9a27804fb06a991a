mod check;
mod config;
mod players;
mod status;

pub use check::CheckCommand;
pub use config::ConfigCommand;
pub use players::PlayersCommand;
pub use status::StatusCommand;
