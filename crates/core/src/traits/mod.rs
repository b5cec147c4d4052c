pub mod ledger;
pub mod reputation;
pub mod repository;
pub mod status_provider;

pub use ledger::*;
pub use reputation::*;
pub use repository::*;
pub use status_provider::*;
