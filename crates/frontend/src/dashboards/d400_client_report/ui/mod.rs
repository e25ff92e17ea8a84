pub mod report_page;

pub use report_page::ReportPage;
