#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod config;
pub mod error;
pub mod quiz;

pub use quiz_core::Clock;

pub use app_services::{AppServices, PoolState};
pub use catalog::{CountrySource, RestCountriesClient, StaticCountrySource, parse_countries};
pub use config::{CatalogConfig, QuizConfig};
pub use error::{AppServicesError, CatalogError, SessionError};
pub use quiz::{
    AnswerOutcome, ProgressTracker, ProgressView, QuizView, RunSummary, SelectionPolicy,
    SessionController,
};
