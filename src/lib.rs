pub mod app_state;
pub mod booking;
pub mod bot_command_handlers;
pub mod bot_views;
pub mod cache;
pub mod calendar;
pub mod cart;
pub mod config;
pub mod constants;
pub mod data_backend;
pub mod data_types;
pub mod db_operations;
pub mod errors;
pub mod host;
pub mod init_data;
pub mod menu;
pub mod orders;
pub mod profile;
pub mod router;
pub mod session;
pub mod sheet;
pub mod shared_main;
