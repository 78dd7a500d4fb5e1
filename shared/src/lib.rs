pub mod clock;
pub mod error;
pub mod ledger;
pub mod models;
pub mod principal;
pub mod status;
pub mod tally;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ElectionError, ErrorCode, ErrorResponse, Result};
pub use models::*;
pub use principal::Principal;
pub use status::{Countdown, ElectionStatus};
pub use tally::{ElectionResult, Standing};
pub use validation::*;

#[cfg(test)]
mod tests;
