pub mod api;
pub mod charts;
pub mod fullscreen;
pub mod period_filter;
pub mod qr;
pub mod slides;
pub mod ui;
