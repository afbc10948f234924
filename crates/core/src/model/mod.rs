mod code;
mod country;
mod mode;

pub use code::{CountryCode, CountryCodeError};
pub use country::{Country, CountryError};
pub use mode::{GameMode, GameModeParseError, GameStatus};
