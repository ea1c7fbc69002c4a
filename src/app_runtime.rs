use std::path::PathBuf;

use tauri::{AppHandle, Manager, RunEvent};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

use crate::{
    app_menu, errors::ShellError, options::Options, options_store, orchestrator::Orchestrator,
    orchestrator::ShellEvent, platform::NativePlatform, shell_host, shell_locale, tray_setup,
    ShellState,
};

fn load_startup_options(app_handle: &AppHandle) -> Result<(PathBuf, Options), ShellError> {
    let resource_dir = app_handle.path().resource_dir().ok();
    let config_path = options_store::resolve_config_path(resource_dir.as_deref())
        .ok_or(ShellError::ConfigMissing)?;
    tracing::info!(event = "shell.config.resolved", path = %config_path.display());
    let options = options_store::load_options(&config_path)?;
    Ok((config_path, options))
}

fn show_startup_error(app_handle: &AppHandle, error: &ShellError) {
    tracing::error!(event = "shell.startup.failed", error = %error);
    let texts = shell_locale::current_shell_texts();
    let exit_app = app_handle.clone();
    app_handle
        .dialog()
        .message(error.to_string())
        .title(texts.startup_error_title)
        .kind(MessageDialogKind::Error)
        .show(move |_| exit_app.exit(1));
}

fn install_app_menu(app_handle: &AppHandle) {
    let texts = shell_locale::current_shell_texts();
    match app_menu::build_app_menu(app_handle, &texts) {
        Ok(menu) => {
            if let Err(error) = app_handle.set_menu(menu) {
                tracing::warn!(event = "shell.menu.install_failed", error = %error);
            }
        }
        Err(error) => tracing::warn!(event = "shell.menu.build_failed", error = %error),
    }
    app_handle.on_menu_event(|app, event| app_menu::handle_app_menu_event(app, event.id().as_ref()));
}

fn start_shell(app_handle: &AppHandle, config_path: PathBuf, options: Options) {
    if options.single_instance {
        let plugin = tauri_plugin_single_instance::init(|app, _args, _cwd| {
            tracing::info!(event = "shell.lifecycle.second_instance");
            shell_host::handle_event(app, ShellEvent::SecondInstance);
        });
        if let Err(error) = app_handle.plugin(plugin) {
            tracing::warn!(event = "shell.lifecycle.single_instance_failed", error = %error);
        }
    }

    let mut orchestrator = Orchestrator::new(options.clone(), Box::new(NativePlatform));
    let startup_commands = orchestrator.start();
    let tray_enabled = options.tray.is_enabled();
    let start_visible = !options.start_hidden();
    let app_name = options.name.clone();
    app_handle.manage(ShellState::new(orchestrator, options, config_path));

    install_app_menu(app_handle);
    shell_host::execute(app_handle, startup_commands, None);

    if tray_enabled {
        if let Err(error) = tray_setup::setup_tray(app_handle, &app_name, start_visible) {
            tracing::warn!(event = "shell.tray.setup_failed", error = %error);
        }
    }
}

pub(crate) fn run() {
    let log_path = crate::logging::init_logging();
    tracing::info!(
        event = "shell.startup.begin",
        version = env!("CARGO_PKG_VERSION"),
        log_path = ?log_path
    );

    let app = match tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .invoke_handler(tauri::generate_handler![
            crate::desktop_bridge_commands::desktop_bridge_is_desktop_runtime,
            crate::desktop_bridge_commands::desktop_bridge_notification,
            crate::desktop_bridge_commands::desktop_bridge_notification_click,
            crate::desktop_bridge_commands::desktop_bridge_document_ready,
            crate::desktop_bridge_commands::desktop_bridge_open_link,
            crate::desktop_bridge_commands::desktop_bridge_menu_action,
            crate::desktop_bridge_commands::desktop_bridge_get_current_url,
            crate::desktop_bridge_commands::desktop_bridge_get_menu_context,
            crate::desktop_bridge_commands::desktop_bridge_get_params,
        ])
        .on_window_event(shell_host::on_window_event)
        .setup(|app| {
            let app_handle = app.handle().clone();
            match load_startup_options(&app_handle) {
                Ok((config_path, options)) => start_shell(&app_handle, config_path, options),
                Err(error) => show_startup_error(&app_handle, &error),
            }
            Ok(())
        })
        .build(tauri::generate_context!())
    {
        Ok(app) => app,
        Err(error) => {
            tracing::error!(event = "shell.startup.build_failed", error = %error);
            std::process::exit(1);
        }
    };

    app.run(|app_handle, event| match event {
        #[cfg(target_os = "macos")]
        RunEvent::Reopen {
            has_visible_windows,
            ..
        } => {
            shell_host::handle_event(
                app_handle,
                ShellEvent::Reactivated {
                    has_visible_windows,
                },
            );
        }
        RunEvent::ExitRequested { code, api, .. } => {
            // Hidden windows keep the shell alive; only explicit exits get through.
            if code.is_none() {
                api.prevent_exit();
            }
        }
        RunEvent::Exit => tracing::info!(event = "shell.lifecycle.exited"),
        _ => {}
    });
}
