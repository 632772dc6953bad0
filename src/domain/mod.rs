pub mod bet;
pub mod sport;

pub use bet::*;
pub use sport::*;
