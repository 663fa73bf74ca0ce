pub mod action;
pub mod log;
pub mod lookup;
pub mod status;

pub use action::ActionResponse;
pub use log::{GroupedLogParams, GroupedLogRow};
pub use lookup::{LookupParams, LookupResponse};
pub use status::{CacheSection, ConfigSection, StatusResponse};
