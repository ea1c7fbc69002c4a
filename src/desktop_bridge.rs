use crate::PARAMS_EVENT;

const INJECTED_STYLE_ID: &str = "pagewrap-injected-css";

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

const BRIDGE_SCRIPT_BODY: &str = r#"
  if (window.__PAGEWRAP_BRIDGE__) return;
  window.__PAGEWRAP_BRIDGE__ = true;

  const invoke = (cmd, args) => {
    const internals = window.__TAURI_INTERNALS__;
    if (!internals || typeof internals.invoke !== 'function') return Promise.resolve(null);
    return internals.invoke(cmd, args || {}).catch(() => null);
  };

  const NativeNotification = window.Notification;
  if (typeof NativeNotification === 'function') {
    class BridgedNotification extends NativeNotification {
      constructor(title, options) {
        super(title, options);
        invoke('desktop_bridge_notification', {
          title: String(title),
          body: options && options.body ? String(options.body) : null,
        });
        this.addEventListener('click', () => invoke('desktop_bridge_notification_click'));
      }
    }
    Object.defineProperty(BridgedNotification, 'permission', {
      get: () => NativeNotification.permission,
    });
    BridgedNotification.requestPermission = (...args) =>
      NativeNotification.requestPermission(...args);
    window.Notification = BridgedNotification;
  }

  const reportReady = () => invoke('desktop_bridge_document_ready');
  if (document.readyState === 'loading') {
    document.addEventListener('DOMContentLoaded', reportReady, { once: true });
  } else {
    reportReady();
  }

  const dispositionFor = (event) => {
    if (event.button === 1 || event.metaKey || event.ctrlKey) {
      return event.shiftKey ? 'foreground-tab' : 'background-tab';
    }
    if (event.shiftKey) return 'new-window';
    return null;
  };

  const interceptLink = (event) => {
    const disposition = dispositionFor(event);
    if (!disposition) return;
    const anchor = event.target && event.target.closest ? event.target.closest('a[href]') : null;
    if (!anchor || !anchor.href || anchor.href.startsWith('javascript:')) return;
    event.preventDefault();
    event.stopPropagation();
    invoke('desktop_bridge_open_link', { url: anchor.href, disposition });
  };
  document.addEventListener('click', interceptLink, true);
  document.addEventListener('auxclick', interceptLink, true);
"#;

const CONTEXT_MENU_BLOCK: &str = r#"
  document.addEventListener('contextmenu', (event) => event.preventDefault(), true);
"#;

/// Initialization script installed on every shell window.
pub fn bridge_script(disable_context_menu: bool) -> String {
    let mut body = String::from(BRIDGE_SCRIPT_BODY);
    if disable_context_menu {
        body.push_str(CONTEXT_MENU_BLOCK);
    }
    format!("(() => {{{body}}})();")
}

/// Replaces the injected stylesheet, so repeated inserts never stack.
pub fn insert_css_script(css: &str) -> String {
    format!(
        r#"(() => {{
  const id = {id};
  let style = document.getElementById(id);
  if (!style) {{
    style = document.createElement('style');
    style.id = id;
    (document.head || document.documentElement).appendChild(style);
  }}
  style.textContent = {css};
}})();"#,
        id = js_string(INJECTED_STYLE_ID),
        css = js_string(css),
    )
}

pub fn pinch_zoom_script(min: f64, max: f64) -> String {
    format!(
        r#"(() => {{
  const content = 'width=device-width, minimum-scale={min}, maximum-scale={max}';
  let meta = document.querySelector('meta[name="viewport"]');
  if (!meta) {{
    meta = document.createElement('meta');
    meta.name = 'viewport';
    (document.head || document.documentElement).appendChild(meta);
  }}
  meta.setAttribute('content', content);
}})();"#
    )
}

/// Page-visible agent override for windows built before the lookup finished.
pub fn user_agent_override_script(user_agent: &str) -> String {
    format!(
        r#"(() => {{
  const value = {ua};
  try {{
    Object.defineProperty(Navigator.prototype, 'userAgent', {{ get: () => value, configurable: true }});
  }} catch (_) {{}}
}})();"#,
        ua = js_string(user_agent),
    )
}

pub fn params_script(payload: &str) -> String {
    format!(
        r#"(() => {{
  const detail = JSON.parse({payload});
  window.__PAGEWRAP_PARAMS__ = detail;
  window.dispatchEvent(new CustomEvent({event}, {{ detail }}));
}})();"#,
        payload = js_string(payload),
        event = js_string(PARAMS_EVENT),
    )
}

pub fn copy_text_script(text: &str) -> String {
    format!(
        "navigator.clipboard && navigator.clipboard.writeText({}).catch(() => {{}});",
        js_string(text)
    )
}

pub const RELOAD_SCRIPT: &str = "window.location.reload();";
pub const GO_BACK_SCRIPT: &str = "window.history.back();";
pub const GO_FORWARD_SCRIPT: &str = "window.history.forward();";
