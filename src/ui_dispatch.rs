use tauri::AppHandle;

/// Runs `task` on the UI thread. `action` names the task in the failure log.
pub fn run_on_main_thread_dispatch<F>(
    app_handle: &AppHandle,
    action: &str,
    task: F,
) -> Result<(), String>
where
    F: FnOnce(&AppHandle) + Send + 'static,
{
    let main_app = app_handle.clone();
    app_handle
        .run_on_main_thread(move || task(&main_app))
        .map_err(|error| {
            tracing::warn!(event = "shell.ui_dispatch.failed", action, error = %error);
            format!("Failed to schedule '{action}' on the main thread: {error}")
        })
}
