pub mod client;
pub mod models;

pub use client::AdafruitClient;
pub use models::{FetchError, RawRecord};
