//! Executes orchestrator commands against Tauri and feeds window events back.
//!
//! The orchestrator lock is only held for the pure dispatch step. Commands run
//! after it is released, so events they trigger can dispatch again.

use tauri::{
    webview::{NewWindowFeatures, NewWindowResponse, PageLoadEvent},
    AppHandle, Emitter, Manager, UserAttentionType, WebviewUrl, WebviewWindow,
    WebviewWindowBuilder,
};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};
use url::Url;

use crate::{
    desktop_bridge,
    errors::ShellError,
    navigation_policy::{Disposition, NavigationRequest},
    options::{parse_hex_color, Options},
    options_store,
    orchestrator::ShellEvent,
    shell_commands::{Dispatch, EventVerdict, ShellCommand, WindowSpec},
    shell_locale, system_browser, tray_labels, ui_dispatch, user_agent,
    window_registry::{WindowId, WindowRole},
    ShellState, PARAMS_EVENT,
};

#[cfg(target_os = "windows")]
const WEBVIEW2_DEFAULT_ARGS: &str =
    "--disable-features=msWebOOUI,msPdfOOUI,msSmartScreenProtection";

pub fn dispatch(app_handle: &AppHandle, event: ShellEvent) -> Dispatch {
    let Some(state) = app_handle.try_state::<ShellState>() else {
        tracing::debug!(event = "shell.host.dispatch_before_setup");
        return Dispatch::proceed();
    };
    let result = match state.orchestrator.lock() {
        Ok(mut orchestrator) => orchestrator.dispatch(event),
        Err(error) => {
            tracing::error!(event = "shell.host.state_poisoned", error = %error);
            Dispatch::proceed()
        }
    };
    result
}

/// Dispatches `event` and runs its commands. Returns the verdict for the caller's
/// platform default.
pub fn handle_event(app_handle: &AppHandle, event: ShellEvent) -> EventVerdict {
    let dispatch = dispatch(app_handle, event);
    execute(app_handle, dispatch.commands, None);
    dispatch.verdict
}

pub fn handle_event_on_main_thread(app_handle: &AppHandle, event: ShellEvent) {
    let action = format!("{event:?}");
    if let Err(error) = ui_dispatch::run_on_main_thread_dispatch(app_handle, &action, move |app| {
        handle_event(app, event);
    }) {
        tracing::warn!(event = "shell.host.schedule_failed", error = %error);
    }
}

fn window_for(app_handle: &AppHandle, window: WindowId) -> Option<WebviewWindow> {
    let found = app_handle.get_webview_window(&window.label());
    if found.is_none() {
        tracing::debug!(event = "shell.host.window_missing", window = %window);
    }
    found
}

fn eval_in(app_handle: &AppHandle, window: WindowId, script: &str) {
    let Some(webview) = window_for(app_handle, window) else {
        return;
    };
    if let Err(error) = webview.eval(script) {
        tracing::warn!(event = "shell.host.eval_failed", window = %window, error = %error);
    }
}

fn app_name(app_handle: &AppHandle) -> String {
    app_handle
        .try_state::<ShellState>()
        .map(|state| state.options.name.clone())
        .unwrap_or_default()
}

/// Runs `commands` in order. `popup` carries the features of a pending
/// `window.open`; the window built for it is returned to the caller.
pub fn execute(
    app_handle: &AppHandle,
    commands: Vec<ShellCommand>,
    mut popup: Option<NewWindowFeatures>,
) -> Option<WebviewWindow> {
    let mut adopted = None;
    for command in commands {
        tracing::trace!(event = "shell.host.command", command = ?command);
        match command {
            ShellCommand::CreateWindow(spec) => {
                let features = if spec.adopt_popup { popup.take() } else { None };
                let adopt = spec.adopt_popup;
                let id = spec.id;
                match build_window(app_handle, spec, features) {
                    Ok(window) if adopt && adopted.is_none() => adopted = Some(window),
                    Ok(_) => {}
                    Err(error) => {
                        tracing::error!(event = "shell.host.window_build_failed", window = %id, error = %error);
                        handle_event(app_handle, ShellEvent::WindowCreationFailed { window: id });
                    }
                }
            }
            ShellCommand::Destroy { window } => {
                if let Some(webview) = window_for(app_handle, window) {
                    if let Err(error) = webview.destroy() {
                        tracing::warn!(event = "shell.host.destroy_failed", window = %window, error = %error);
                    }
                }
            }
            ShellCommand::Show { window } => {
                if let Some(webview) = window_for(app_handle, window) {
                    if let Err(error) = webview.unminimize() {
                        tracing::warn!(event = "shell.host.unminimize_failed", window = %window, error = %error);
                    }
                    if let Err(error) = webview.show() {
                        tracing::warn!(event = "shell.host.show_failed", window = %window, error = %error);
                    }
                }
                if window.is_primary() {
                    tray_labels::update_tray_menu_labels(app_handle, &app_name(app_handle), Some(true));
                }
            }
            ShellCommand::Hide { window } => {
                if let Some(webview) = window_for(app_handle, window) {
                    if let Err(error) = webview.hide() {
                        tracing::warn!(event = "shell.host.hide_failed", window = %window, error = %error);
                    }
                }
                if window.is_primary() {
                    tray_labels::update_tray_menu_labels(app_handle, &app_name(app_handle), Some(false));
                }
            }
            ShellCommand::Focus { window } => {
                if let Some(webview) = window_for(app_handle, window) {
                    if let Err(error) = webview.set_focus() {
                        tracing::warn!(event = "shell.host.focus_failed", window = %window, error = %error);
                    }
                }
            }
            ShellCommand::SetFullscreen { window, fullscreen } => {
                if let Some(webview) = window_for(app_handle, window) {
                    if let Err(error) = webview.set_fullscreen(fullscreen) {
                        tracing::warn!(event = "shell.host.fullscreen_failed", window = %window, error = %error);
                    }
                }
            }
            ShellCommand::Maximize { window } => {
                if let Some(webview) = window_for(app_handle, window) {
                    if let Err(error) = webview.maximize() {
                        tracing::warn!(event = "shell.host.maximize_failed", window = %window, error = %error);
                    }
                }
            }
            ShellCommand::PersistConsumedMaximize => persist_consumed_maximize(app_handle),
            ShellCommand::SetZoom { window, factor } => {
                if let Some(webview) = window_for(app_handle, window) {
                    if let Err(error) = webview.set_zoom(factor) {
                        tracing::warn!(event = "shell.host.zoom_failed", window = %window, error = %error);
                    }
                }
            }
            ShellCommand::SetPinchZoomLimits { window, min, max } => {
                eval_in(app_handle, window, &desktop_bridge::pinch_zoom_script(min, max));
            }
            ShellCommand::InsertCss { window, css } => {
                eval_in(app_handle, window, &desktop_bridge::insert_css_script(&css));
            }
            ShellCommand::ApplyUserAgent { window, user_agent } => {
                eval_in(
                    app_handle,
                    window,
                    &desktop_bridge::user_agent_override_script(&user_agent),
                );
                if let Some(state) = app_handle.try_state::<ShellState>() {
                    state.set_user_agent_override(window, user_agent);
                }
            }
            ShellCommand::Reload { window } => {
                eval_in(app_handle, window, desktop_bridge::RELOAD_SCRIPT);
            }
            ShellCommand::GoBack { window } => {
                eval_in(app_handle, window, desktop_bridge::GO_BACK_SCRIPT);
            }
            ShellCommand::GoForward { window } => {
                eval_in(app_handle, window, desktop_bridge::GO_FORWARD_SCRIPT);
            }
            ShellCommand::ClearCache { window } => {
                if let Some(webview) = window_for(app_handle, window) {
                    match webview.clear_all_browsing_data() {
                        Ok(()) => tracing::info!(event = "shell.host.cache_cleared", window = %window),
                        Err(error) => {
                            tracing::warn!(event = "shell.host.cache_clear_failed", window = %window, error = %error)
                        }
                    }
                }
            }
            ShellCommand::ConfirmClearAppData => confirm_clear_app_data(app_handle),
            ShellCommand::CopyText { window, text } => {
                eval_in(app_handle, window, &desktop_bridge::copy_text_script(&text));
            }
            ShellCommand::OpenExternal { url } => system_browser::open_external(&url),
            ShellCommand::SetBadge { label } => set_badge(app_handle, label),
            ShellCommand::RequestAttention => {
                if let Some(webview) = window_for(app_handle, WindowId::PRIMARY) {
                    if let Err(error) =
                        webview.request_user_attention(Some(UserAttentionType::Informational))
                    {
                        tracing::warn!(event = "shell.host.attention_failed", error = %error);
                    }
                }
            }
            ShellCommand::EmitParams { window, payload } => {
                eval_in(app_handle, window, &desktop_bridge::params_script(&payload));
                if let Err(error) = app_handle.emit_to(window.label().as_str(), PARAMS_EVENT, payload) {
                    tracing::warn!(event = "shell.host.params_emit_failed", window = %window, error = %error);
                }
            }
            ShellCommand::BeginUserAgentLookup => begin_user_agent_lookup(app_handle),
            ShellCommand::Exit => {
                tracing::info!(event = "shell.lifecycle.exit");
                app_handle.exit(0);
            }
        }
    }
    adopted
}

fn persist_consumed_maximize(app_handle: &AppHandle) {
    let Some(state) = app_handle.try_state::<ShellState>() else {
        return;
    };
    if let Err(error) = options_store::persist_consumed_maximize(&state.config_path) {
        tracing::warn!(event = "shell.config.maximize_persist_failed", error = %error);
    }
}

fn confirm_clear_app_data(app_handle: &AppHandle) {
    let texts = shell_locale::current_shell_texts();
    let confirm_app = app_handle.clone();
    app_handle
        .dialog()
        .message(texts.clear_app_data_message)
        .title(texts.clear_app_data_title)
        .kind(MessageDialogKind::Warning)
        .buttons(MessageDialogButtons::OkCancel)
        .show(move |confirmed| {
            tracing::info!(event = "shell.host.clear_app_data_answered", confirmed);
            if confirmed {
                handle_event_on_main_thread(&confirm_app, ShellEvent::ClearAppDataConfirmed);
            }
        });
}

/// Numeric part of a badge label; the notification marker counts as one.
#[cfg_attr(target_os = "macos", allow(dead_code))]
fn badge_count(label: &str) -> Option<i64> {
    let digits: String = label.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Some(1);
    }
    digits.parse().ok()
}

fn set_badge(app_handle: &AppHandle, label: Option<String>) {
    let Some(window) = window_for(app_handle, WindowId::PRIMARY) else {
        return;
    };
    #[cfg(target_os = "macos")]
    let result = window.set_badge_label(label);
    #[cfg(not(target_os = "macos"))]
    let result = window.set_badge_count(label.as_deref().and_then(badge_count));
    if let Err(error) = result {
        tracing::warn!(event = "shell.badge.update_failed", error = %error);
    }
}

fn begin_user_agent_lookup(app_handle: &AppHandle) {
    let lookup_app = app_handle.clone();
    tauri::async_runtime::spawn_blocking(move || {
        let user_agent = user_agent::resolve_auto_user_agent();
        handle_event_on_main_thread(&lookup_app, ShellEvent::UserAgentResolved { user_agent });
    });
}

fn parse_window_url(raw: &str, label: &str) -> Result<Url, ShellError> {
    Url::parse(raw).map_err(|error| ShellError::window(label, error))
}

fn apply_baseline<'a>(
    mut builder: WebviewWindowBuilder<'a, tauri::Wry, AppHandle>,
    options: &Options,
    role: WindowRole,
) -> WebviewWindowBuilder<'a, tauri::Wry, AppHandle> {
    let (width, height) = options.initial_size();
    builder = builder
        .title(options.window_title())
        .inner_size(width, height)
        .always_on_top(options.always_on_top)
        .decorations(!options.hide_window_frame)
        .devtools(!options.disable_dev_tools)
        .initialization_script(&desktop_bridge::bridge_script(options.disable_context_menu));

    if let (Some(min_width), Some(min_height)) = (options.min_width, options.min_height) {
        builder = builder.min_inner_size(min_width, min_height);
    }
    if let (Some(max_width), Some(max_height)) = (options.max_width, options.max_height) {
        builder = builder.max_inner_size(max_width, max_height);
    }
    if role == WindowRole::Primary {
        if let (Some(x), Some(y)) = (options.x, options.y) {
            builder = builder.position(x, y);
        }
    }
    if let Some(raw) = options.background_color.as_deref() {
        match parse_hex_color(raw) {
            Ok((r, g, b, a)) => builder = builder.background_color(tauri::window::Color(r, g, b, a)),
            Err(error) => tracing::warn!(event = "shell.host.background_ignored", error = %error),
        }
    }

    #[cfg(target_os = "macos")]
    {
        if matches!(
            options.title_bar_style.as_deref(),
            Some("hidden" | "hiddenInset" | "customButtonsOnHover")
        ) {
            builder = builder.title_bar_style(tauri::TitleBarStyle::Overlay);
        }
    }
    #[cfg(target_os = "windows")]
    {
        if options.insecure {
            builder = builder.additional_browser_args(&format!(
                "{WEBVIEW2_DEFAULT_ARGS} --ignore-certificate-errors --allow-running-insecure-content"
            ));
        }
    }
    builder
}

fn build_window(
    app_handle: &AppHandle,
    spec: WindowSpec,
    features: Option<NewWindowFeatures>,
) -> Result<WebviewWindow, ShellError> {
    let Some(state) = app_handle.try_state::<ShellState>() else {
        return Err(ShellError::window(&spec.id.label(), "shell state is not managed"));
    };
    let label = spec.id.label();
    let url = parse_window_url(&spec.url, &label)?;
    let id = spec.id;

    let mut builder = WebviewWindowBuilder::new(app_handle, &label, WebviewUrl::External(url));
    builder = apply_baseline(builder, &state.options, spec.role).visible(spec.visible);
    if let Some(user_agent) = spec.user_agent.as_deref() {
        builder = builder.user_agent(user_agent);
    }
    #[cfg(not(target_os = "macos"))]
    if let Some(proxy) = spec.proxy.clone() {
        builder = builder.proxy_url(proxy);
    }
    #[cfg(target_os = "macos")]
    if let Some(group) = spec.tab_group {
        builder = builder.tabbing_identifier(&group.identifier());
    }
    if let Some(features) = features {
        builder = builder.window_features(features);
    }

    let navigation_app = app_handle.clone();
    let page_load_app = app_handle.clone();
    let title_app = app_handle.clone();
    let popup_app = app_handle.clone();
    builder = builder
        .on_navigation(move |url| {
            let request = NavigationRequest::in_page(id, url.as_str());
            let verdict = handle_event(&navigation_app, ShellEvent::NavigationRequested(request));
            verdict == EventVerdict::Proceed
        })
        .on_page_load(move |webview, payload| {
            let url = payload.url().to_string();
            let override_script = page_load_app
                .try_state::<ShellState>()
                .and_then(|state| state.user_agent_override(id))
                .map(|user_agent| desktop_bridge::user_agent_override_script(&user_agent));
            if let Some(script) = override_script {
                if let Err(error) = webview.eval(&script) {
                    tracing::warn!(event = "shell.host.user_agent_eval_failed", window = %id, error = %error);
                }
            }
            let event = match payload.event() {
                PageLoadEvent::Started => ShellEvent::PageLoadStarted { window: id, url },
                PageLoadEvent::Finished => ShellEvent::PageLoadFinished { window: id, url },
            };
            handle_event(&page_load_app, event);
        })
        .on_document_title_changed(move |webview, title| {
            if let Err(error) = webview.set_title(&title) {
                tracing::warn!(event = "shell.host.set_title_failed", window = %id, error = %error);
            }
            handle_event(&title_app, ShellEvent::TitleChanged { window: id, title });
        })
        .on_new_window(move |url, features| {
            let request =
                NavigationRequest::new_window(id, url.as_str(), Disposition::Unspecified)
                    .script_opened();
            let outcome = dispatch(&popup_app, ShellEvent::NavigationRequested(request));
            let verdict = outcome.verdict;
            match execute(&popup_app, outcome.commands, Some(features)) {
                Some(window) => NewWindowResponse::Create { window },
                None if verdict == EventVerdict::Proceed => NewWindowResponse::Allow,
                None => NewWindowResponse::Deny,
            }
        });

    let window = builder
        .build()
        .map_err(|error| ShellError::window(&label, error))?;

    #[cfg(not(target_os = "macos"))]
    if !state.options.show_menu_bar {
        if let Err(error) = window.hide_menu() {
            tracing::debug!(event = "shell.host.menu_hide_failed", window = %id, error = %error);
        }
    }
    if (spec.zoom_factor - 1.0).abs() > f64::EPSILON {
        if let Err(error) = window.set_zoom(spec.zoom_factor) {
            tracing::warn!(event = "shell.host.zoom_failed", window = %id, error = %error);
        }
    }
    tracing::info!(
        event = "shell.host.window_built",
        window = %id,
        role = ?spec.role,
        visible = spec.visible
    );
    Ok(window)
}

/// Maps Tauri window events onto shell events. A prevented close request is
/// cancelled here.
pub fn on_window_event(window: &tauri::Window, event: &tauri::WindowEvent) {
    let Some(id) = WindowId::from_label(window.label()) else {
        return;
    };
    let app_handle = window.app_handle();
    match event {
        tauri::WindowEvent::CloseRequested { api, .. } => {
            if handle_event(app_handle, ShellEvent::CloseRequested { window: id })
                == EventVerdict::PreventDefault
            {
                api.prevent_close();
            }
        }
        tauri::WindowEvent::Destroyed => {
            if let Some(state) = app_handle.try_state::<ShellState>() {
                state.forget_window(id);
            }
            handle_event(app_handle, ShellEvent::Destroyed { window: id });
        }
        tauri::WindowEvent::Focused(focused) => {
            handle_event(
                app_handle,
                ShellEvent::FocusChanged {
                    window: id,
                    focused: *focused,
                },
            );
        }
        tauri::WindowEvent::Resized(_) => {
            let Ok(fullscreen) = window.is_fullscreen() else {
                return;
            };
            let known = app_handle.try_state::<ShellState>().and_then(|state| {
                state
                    .orchestrator
                    .lock()
                    .ok()
                    .and_then(|orchestrator| orchestrator.registry().get(id).map(|r| r.fullscreen))
            });
            if known.is_some_and(|known| known != fullscreen) {
                handle_event(
                    app_handle,
                    ShellEvent::FullscreenChanged {
                        window: id,
                        fullscreen,
                    },
                );
            }
        }
        _ => {}
    }
}
