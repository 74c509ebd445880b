//! Systems - logic that operates on components

mod activation;
mod conversion;
mod events;
mod production;
mod tools;

pub use activation::*;
pub use conversion::*;
pub use events::*;
pub use production::*;
pub use tools::*;
