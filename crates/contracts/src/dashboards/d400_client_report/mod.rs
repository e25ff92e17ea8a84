pub mod branch;
pub mod dto;
pub mod period_query;

pub use branch::Branch;
pub use dto::*;
pub use period_query::{PeriodQuery, PeriodQueryError, ReportParams, MONTH_ABBREVIATIONS};
