pub mod camera_feed;
pub mod handlers;
pub mod header;
pub mod login_panel;
pub mod mode_selector;
pub mod results;
pub mod utils;
