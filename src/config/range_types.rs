use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Declares an `f32` setting that is clamped into `[min, max]` whenever it is
/// built, including when it is read back from a config file.
macro_rules! bounded_setting {
    ($(#[$meta:meta])* $name:ident, $min:expr, $max:expr, $default:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
        #[serde(from = "f32", into = "f32")]
        pub struct $name(f32);

        impl $name {
            pub const MIN: f32 = $min;
            pub const MAX: f32 = $max;

            pub fn new(value: f32) -> Self {
                Self(value.clamp(Self::MIN, Self::MAX))
            }

            pub fn get(self) -> f32 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new($default)
            }
        }

        impl From<f32> for $name {
            fn from(value: f32) -> Self {
                Self::new(value)
            }
        }

        impl From<$name> for f32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

/// Declares a `u32` count clamped into `[min, max]` the same way.
macro_rules! bounded_count {
    ($(#[$meta:meta])* $name:ident, $min:expr, $max:expr, $default:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
        #[derive(Serialize, Deserialize)]
        #[serde(from = "u32", into = "u32")]
        pub struct $name(u32);

        impl $name {
            pub const MIN: u32 = $min;
            pub const MAX: u32 = $max;

            pub fn new(value: u32) -> Self {
                Self(value.clamp(Self::MIN, Self::MAX))
            }

            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new($default)
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self::new(value)
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

bounded_setting!(
    /// World units per second, constrained to [1.0, 1000.0]
    MovementSpeed, 1.0, 1000.0, 160.0
);

bounded_setting!(
    /// Hit points, constrained to [1.0, 1000.0]
    HealthValue, 1.0, 1000.0, 100.0
);

bounded_setting!(
    /// World units per second, constrained to [10.0, 4000.0]
    BulletSpeed, 10.0, 4000.0, 750.0
);

bounded_setting!(
    /// Damage per hit, constrained to [0.1, 100.0]
    DamageValue, 0.1, 100.0, 5.0
);

bounded_setting!(
    /// Seconds, constrained to [0.1, 30.0]
    Lifetime, 0.1, 30.0, 3.0
);

bounded_setting!(
    /// Shots per second, constrained to [0.1, 60.0]
    FireRate, 0.1, 60.0, 5.0
);

bounded_setting!(
    /// Path replans per second, constrained to [0.1, 60.0]
    RefreshRate, 0.1, 60.0, 5.0
);

bounded_setting!(
    /// Entity side length in world units, constrained to [1.0, 512.0]
    BodySize, 1.0, 512.0, 20.0
);

bounded_count!(
    /// Driver sub-moves per frame, constrained to [1, 16]
    SubMoves, 1, 16, 2
);

bounded_count!(
    /// Extra sub-moves for a wedged body, constrained to [0, 8]
    UnstickAllowance, 0, 8, 1
);
