pub mod api;
pub mod controller;
pub mod errors;
pub mod models;
pub mod prefs;
pub mod state;

pub use api::*;
pub use controller::*;
pub use errors::*;
pub use models::*;
pub use prefs::*;
pub use state::*;
