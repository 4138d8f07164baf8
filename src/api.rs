pub mod client;
pub mod pge;
pub mod pse;
pub mod supla;

pub use self::{pge::Api as PgeQuotes, pse::Api as PseReports, supla::Api as Supla};
