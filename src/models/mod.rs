//! Data models

pub mod rental;
pub mod timestamps;
pub mod user_device_token;

// Re-export commonly used types
pub use rental::{CreateRental, Rental, RentalStatus, UpdateRental};
pub use timestamps::{Clock, LifecycleHooks, SystemClock, Timestamps};
pub use user_device_token::UserDeviceToken;
