pub use board::*;
pub use bot::*;
pub use die::*;
pub use errors::*;
pub use placement::*;
pub use protocol_types::*;
pub use ruleset::*;
pub use scoring::*;
pub use species::*;
pub use validation::*;
pub use zones::*;

#[cfg(test)]
mod arbitrary;
mod board;
mod bot;
mod die;
mod errors;
mod placement;
mod protocol_types;
mod ruleset;
mod scoring;
mod species;
mod validation;
mod zones;
