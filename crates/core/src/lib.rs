#![forbid(unsafe_code)]

pub mod aliases;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod time;

pub use aliases::AliasTable;
pub use matcher::AnswerMatcher;
pub use normalize::normalize;
pub use time::Clock;
