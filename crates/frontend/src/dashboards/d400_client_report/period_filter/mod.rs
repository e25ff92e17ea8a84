pub mod state;
pub mod ui;

pub use state::{FilterTarget, PeriodFilter};
pub use ui::PeriodFilterModal;
