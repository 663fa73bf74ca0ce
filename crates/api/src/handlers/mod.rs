pub mod actions;
pub mod config;
pub mod health;
pub mod log;
pub mod lookup;
pub mod status;

pub use actions::run_action;
pub use config::{get_config, update_config};
pub use health::health_check;
pub use log::get_grouped_log;
pub use lookup::lookup;
pub use status::get_status;
