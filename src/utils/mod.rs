pub mod api_ratelimit;
pub mod epoch;
pub mod errors;
pub mod ratelimit;
pub mod scheduler;
pub mod table;

pub use epoch::Fenced;
pub use errors::user_facing_error;
pub use ratelimit::{check_cooldown, check_global_rate_limit};
pub use scheduler::ScheduledTask;
pub use table::Table;
