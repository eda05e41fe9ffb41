mod auth;
mod patient;

pub use auth::*;
pub use patient::*;
