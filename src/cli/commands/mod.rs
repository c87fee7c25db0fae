//! CLI command implementations.

mod config;
mod deck;
mod doctor;
mod run;
mod search;
mod serve;
mod transcript;

pub use config::run_config;
pub use deck::run_deck;
pub use doctor::run_doctor;
pub use run::run_session;
pub use search::run_search;
pub use serve::run_serve;
pub use transcript::run_transcript;
