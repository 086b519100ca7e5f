#[macro_use]
extern crate serde;

mod ballot;
mod clock;
mod commitment;
mod error;
mod serde_hex;
mod tally;
mod transaction;
mod voter;

pub use ballot::*;
pub use clock::*;
pub use commitment::*;
pub use error::*;
pub use serde_hex::*;
pub use tally::*;
pub use transaction::*;
pub use voter::*;
