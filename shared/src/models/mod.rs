//! Domain models for ForeAIcast

mod aggregate;
mod delivery;
mod document;
mod forecast;
mod place;
mod recipient;

pub use aggregate::*;
pub use delivery::*;
pub use document::*;
pub use forecast::*;
pub use place::*;
pub use recipient::*;
