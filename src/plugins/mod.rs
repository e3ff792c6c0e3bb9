pub mod combat;
pub mod enemy;
pub mod player;
pub mod scene;

pub use combat::*;
pub use enemy::*;
pub use player::*;
pub use scene::*;
