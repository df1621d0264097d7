//! API clients for external services
//!
//! - TMDB: movie/TV listings, search and metadata

pub mod tmdb;

pub use tmdb::{TmdbClient, TmdbError};
