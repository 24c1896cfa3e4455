pub mod activity;
pub mod attendance;
pub mod child;
pub mod daily_report;
pub mod gallery;
pub mod location;
pub mod menu;
pub mod message;
pub mod organization;
pub mod registry;
pub mod weekly_letter;
