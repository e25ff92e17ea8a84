pub mod archive;
pub mod error;
pub mod pdf;
pub mod provider;
pub mod service;

pub use error::ReportError;
pub use provider::{DataProvider, MockDataProvider};
