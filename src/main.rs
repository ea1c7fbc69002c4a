#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_constants;
mod app_menu;
mod app_runtime;
mod app_types;
mod badge;
mod desktop_bridge;
mod desktop_bridge_commands;
mod errors;
mod lifecycle;
mod logging;
mod menu_actions;
mod navigation_policy;
mod options;
mod options_store;
mod orchestrator;
mod platform;
mod session_config;
mod shell_commands;
mod shell_host;
mod shell_locale;
mod system_browser;
mod tray_actions;
mod tray_labels;
mod tray_menu_handler;
mod tray_setup;
mod ui_dispatch;
mod user_agent;
mod window_factory;
mod window_registry;

pub(crate) use app_constants::*;
pub(crate) use app_types::{BridgeResult, ShellState, TrayMenuState};

fn main() {
    app_runtime::run();
}
