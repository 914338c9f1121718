pub mod app_service;
pub mod folder_monitor;
