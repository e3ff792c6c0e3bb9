pub mod errors;
pub mod movement;
pub mod rate_limit;
pub mod steering;

pub use errors::*;
pub use movement::*;
pub use rate_limit::RateLimit;
pub use steering::*;
