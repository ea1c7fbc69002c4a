use crate::{
    badge::BadgeController,
    lifecycle::{CloseDecision, ClosePolicy, LifecycleController, LifecycleState},
    menu_actions::{MenuAction, MenuContext},
    navigation_policy::{Action, InternalMatcher, NavigationKind, NavigationRequest, ProbeOutcome},
    options::Options,
    platform::PlatformCapabilities,
    session_config::SessionConfigurator,
    shell_commands::{Dispatch, ShellCommand, WindowSpec},
    window_factory::WindowFactory,
    window_registry::{Visibility, WindowId, WindowRegistry},
};

#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    NavigationRequested(NavigationRequest),
    /// `did-navigate`: a new document started loading.
    PageLoadStarted { window: WindowId, url: String },
    /// First response of the current document reached the page.
    FirstResponse { window: WindowId },
    PageLoadFinished { window: WindowId, url: String },
    TitleChanged { window: WindowId, title: String },
    CloseRequested { window: WindowId },
    Destroyed { window: WindowId },
    WindowCreationFailed { window: WindowId },
    FullscreenChanged { window: WindowId, fullscreen: bool },
    FocusChanged { window: WindowId, focused: bool },
    NotificationReceived,
    NotificationClicked,
    UserAgentResolved { user_agent: String },
    Reactivated { has_visible_windows: bool },
    SecondInstance,
    ToggleVisibility,
    Menu(MenuAction),
    ClearAppDataConfirmed,
}

pub struct Orchestrator {
    options: Options,
    capabilities: Box<dyn PlatformCapabilities>,
    matcher: InternalMatcher,
    session: SessionConfigurator,
    registry: WindowRegistry,
    lifecycle: LifecycleController,
    badge: BadgeController,
    app_focused: bool,
    primary_spec: Option<WindowSpec>,
}

impl Orchestrator {
    pub fn new(options: Options, capabilities: Box<dyn PlatformCapabilities>) -> Self {
        let patterns = options
            .internal_urls
            .as_ref()
            .map(|urls| urls.patterns())
            .unwrap_or_default();
        let matcher = InternalMatcher::new(&options.target_url, &patterns);
        let session = SessionConfigurator::from_options(&options);
        let supports_native_tabs = capabilities.supports_native_tabs();

        let visible = !options.start_hidden();
        let (primary, mut primary_spec) =
            WindowFactory::new(&session, supports_native_tabs).primary(&options.target_url, visible);
        let mut registry = WindowRegistry::new(primary);
        if supports_native_tabs {
            let group = registry.allocate_group();
            primary_spec.tab_group = Some(group);
            registry.primary_mut().tab_group = Some(group);
        }

        let lifecycle = LifecycleController::new(
            ClosePolicy {
                persists_in_dock_when_closed: capabilities.persists_in_dock_when_closed(),
                tray_enabled: options.tray.is_enabled(),
                fast_quit: options.fast_quit,
                clear_cache_on_close: options.clear_cache,
            },
            visible,
        );
        let badge = BadgeController::from_options(&options);

        Self {
            options,
            capabilities,
            matcher,
            session,
            registry,
            lifecycle,
            badge,
            app_focused: false,
            primary_spec: Some(primary_spec),
        }
    }

    #[cfg(test)]
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn menu_context(&self) -> MenuContext {
        MenuContext {
            app_name: self.options.name.clone(),
            version: self
                .options
                .shell_version
                .clone()
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            build_zoom: self.session.base_zoom(),
            dev_tools_disabled: self.options.disable_dev_tools,
        }
    }

    /// `getCurrentUrl` callback: URL of the focused window.
    pub fn current_url(&self) -> String {
        self.registry
            .get(self.registry.focused_or_primary())
            .map(|record| record.current_url.clone())
            .unwrap_or_default()
    }

    fn params_payload(&self) -> String {
        serde_json::to_string(&self.options).unwrap_or_else(|error| {
            tracing::warn!(event = "shell.params.serialize_failed", error = %error);
            "{}".to_string()
        })
    }

    /// Startup commands. The primary spec is handed out exactly once.
    pub fn start(&mut self) -> Vec<ShellCommand> {
        let Some(spec) = self.primary_spec.take() else {
            return Vec::new();
        };
        let mut commands = vec![ShellCommand::CreateWindow(spec)];

        if self.options.maximize {
            self.options.maximize = false;
            commands.push(ShellCommand::Maximize {
                window: WindowId::PRIMARY,
            });
            commands.push(ShellCommand::PersistConsumedMaximize);
        }
        if self.options.full_screen {
            self.registry.primary_mut().fullscreen = true;
            commands.push(ShellCommand::SetFullscreen {
                window: WindowId::PRIMARY,
                fullscreen: true,
            });
        }
        if self.options.clear_cache {
            commands.push(ShellCommand::ClearCache {
                window: WindowId::PRIMARY,
            });
        }
        if self.session.user_agent_mut().begin_lookup() {
            commands.push(ShellCommand::BeginUserAgentLookup);
        }
        commands
    }

    pub fn dispatch(&mut self, event: ShellEvent) -> Dispatch {
        match event {
            ShellEvent::NavigationRequested(request) => self.on_navigation(request),
            ShellEvent::PageLoadStarted { window, url } => self.on_page_load_started(window, url),
            ShellEvent::FirstResponse { window } => self.on_first_response(window),
            ShellEvent::PageLoadFinished { window, url } => self.on_page_load_finished(window, url),
            ShellEvent::TitleChanged { window, title } => self.on_title_changed(window, &title),
            ShellEvent::CloseRequested { window } => self.on_close_requested(window),
            ShellEvent::Destroyed { window } => self.on_destroyed(window),
            ShellEvent::WindowCreationFailed { window } => {
                self.registry.remove(window);
                if window.is_primary() {
                    tracing::error!(event = "shell.lifecycle.primary_creation_failed");
                    return Dispatch::proceed().with([ShellCommand::Exit]);
                }
                Dispatch::proceed()
            }
            ShellEvent::FullscreenChanged { window, fullscreen } => {
                self.on_fullscreen_changed(window, fullscreen)
            }
            ShellEvent::FocusChanged { window, focused } => self.on_focus_changed(window, focused),
            ShellEvent::NotificationReceived => {
                Dispatch::proceed().with(self.badge.on_notification(self.app_focused))
            }
            ShellEvent::NotificationClicked | ShellEvent::SecondInstance => {
                Dispatch::proceed().with(self.show_primary())
            }
            ShellEvent::Reactivated {
                has_visible_windows,
            } => {
                if has_visible_windows {
                    Dispatch::proceed()
                } else {
                    Dispatch::proceed().with(self.show_primary())
                }
            }
            ShellEvent::ToggleVisibility => self.on_toggle_visibility(),
            ShellEvent::UserAgentResolved { user_agent } => self.on_user_agent_resolved(user_agent),
            ShellEvent::Menu(action) => self.on_menu(action),
            ShellEvent::ClearAppDataConfirmed => Dispatch::proceed().with([
                ShellCommand::ClearCache {
                    window: WindowId::PRIMARY,
                },
                ShellCommand::Reload {
                    window: WindowId::PRIMARY,
                },
            ]),
        }
    }

    fn on_navigation(&mut self, request: NavigationRequest) -> Dispatch {
        let Some(origin) = self.registry.get(request.origin) else {
            return Dispatch::proceed();
        };
        if request.kind == NavigationKind::InPage && origin.probe_pending() {
            return Dispatch::proceed();
        }

        let classification = self.matcher.classify(&request.url);
        let supports_native_tabs = self.capabilities.supports_native_tabs();
        let action = crate::navigation_policy::route(&request, classification, supports_native_tabs);
        tracing::debug!(
            event = "shell.navigation.routed",
            window = %request.origin,
            url = %request.url,
            classification = ?classification,
            action = ?action
        );

        let factory = WindowFactory::new(&self.session, supports_native_tabs);
        match action {
            Action::LoadInPlace => Dispatch::proceed(),
            Action::HandToSystemBrowser => {
                Dispatch::prevent().with([ShellCommand::OpenExternal { url: request.url }])
            }
            Action::ProbeThenDecide => Dispatch::prevent().with([
                factory.create_probe_window(&mut self.registry, request.script_opened)
            ]),
            Action::OpenTab(placement) => Dispatch::prevent().with(factory.create_tab(
                &mut self.registry,
                request.origin,
                &request.url,
                placement,
                request.script_opened,
            )),
            Action::OpenWindow => Dispatch::prevent().with([factory.create_window(
                &mut self.registry,
                &request.url,
                request.script_opened,
            )]),
        }
    }

    fn on_page_load_started(&mut self, window: WindowId, url: String) -> Dispatch {
        let css_enabled = self.session.css().is_some();
        if let Some(record) = self.registry.get_mut(window) {
            record.current_url = url;
            if css_enabled {
                record.css.on_did_navigate();
            }
            record.probe = record.probe.map(|probe| probe.on_load_started());
        }
        Dispatch::proceed()
    }

    fn on_first_response(&mut self, window: WindowId) -> Dispatch {
        let Some(css) = self.session.css() else {
            return Dispatch::proceed();
        };
        let Some(record) = self.registry.get_mut(window) else {
            return Dispatch::proceed();
        };
        if record.css.on_first_response() {
            Dispatch::proceed().with([ShellCommand::InsertCss {
                window,
                css: css.to_string(),
            }])
        } else {
            Dispatch::proceed()
        }
    }

    fn on_page_load_finished(&mut self, window: WindowId, url: String) -> Dispatch {
        let payload = self.params_payload();
        let css = self.session.css().map(str::to_string);
        let (min, max) = self.session.pinch_zoom_limits();
        let Some(record) = self.registry.get_mut(window) else {
            return Dispatch::proceed();
        };
        record.current_url = url.clone();

        if let Some(probe) = record.probe {
            let (next, outcome) = probe.on_load_finished(&url);
            record.probe = Some(next);
            match outcome {
                Some(ProbeOutcome::Closed) => {
                    record.visibility = Visibility::Closed;
                    tracing::info!(event = "shell.probe.discarded", window = %window);
                    return Dispatch::proceed().with([ShellCommand::Destroy { window }]);
                }
                Some(ProbeOutcome::Visible) => {
                    record.visibility = Visibility::Visible;
                    tracing::info!(event = "shell.probe.revealed", window = %window, url = %url);
                }
                None => {}
            }
        }

        let mut commands = Vec::new();
        if record.visibility == Visibility::Visible
            && record.probe.is_some()
            && !record.first_load_completed
        {
            commands.push(ShellCommand::Show { window });
        }
        commands.push(ShellCommand::SetPinchZoomLimits { window, min, max });
        if let Some(css) = css.filter(|_| record.css.on_did_finish_load()) {
            commands.push(ShellCommand::InsertCss { window, css });
        }
        if !record.params_sent {
            record.params_sent = true;
            commands.push(ShellCommand::EmitParams { window, payload });
        }
        record.first_load_completed = true;
        Dispatch::proceed().with(commands)
    }

    fn on_title_changed(&mut self, window: WindowId, title: &str) -> Dispatch {
        if !window.is_primary() {
            return Dispatch::proceed();
        }
        Dispatch::proceed().with(self.badge.on_title_changed(title))
    }

    fn on_close_requested(&mut self, window: WindowId) -> Dispatch {
        if !window.is_primary() {
            if let Some(record) = self.registry.get_mut(window) {
                record.visibility = Visibility::Closed;
            }
            return Dispatch::proceed();
        }

        let already_held = self.lifecycle.state() == LifecycleState::ExitingFullscreen;
        let fullscreen = self.registry.primary().fullscreen;
        let decision = self.lifecycle.on_close_requested(fullscreen);
        tracing::info!(
            event = "shell.lifecycle.close_requested",
            fullscreen,
            decision = ?decision
        );

        let mut dispatch = match decision {
            CloseDecision::AwaitFullscreenExit if already_held => Dispatch::prevent(),
            CloseDecision::AwaitFullscreenExit => {
                let mut commands = Vec::new();
                if self.capabilities.supports_native_tabs() {
                    let factory = WindowFactory::new(&self.session, true);
                    commands.extend(factory.migrate_tabs(&mut self.registry, WindowId::PRIMARY));
                }
                commands.push(ShellCommand::SetFullscreen {
                    window: WindowId::PRIMARY,
                    fullscreen: false,
                });
                Dispatch::prevent().with(commands)
            }
            CloseDecision::Hide => {
                self.registry.primary_mut().visibility = Visibility::Hidden;
                Dispatch::prevent().with([ShellCommand::Hide {
                    window: WindowId::PRIMARY,
                }])
            }
            CloseDecision::Close => {
                self.registry.primary_mut().visibility = Visibility::Closed;
                Dispatch::proceed().with([ShellCommand::Exit])
            }
        };

        if self.lifecycle.policy().clear_cache_on_close && !already_held {
            dispatch.commands.insert(
                0,
                ShellCommand::ClearCache {
                    window: WindowId::PRIMARY,
                },
            );
        }
        dispatch
    }

    fn on_fullscreen_changed(&mut self, window: WindowId, fullscreen: bool) -> Dispatch {
        if let Some(record) = self.registry.get_mut(window) {
            record.fullscreen = fullscreen;
        }
        if !window.is_primary() || fullscreen {
            return Dispatch::proceed();
        }

        match self.lifecycle.on_fullscreen_exited() {
            Some(CloseDecision::Hide) => {
                self.registry.primary_mut().visibility = Visibility::Hidden;
                Dispatch::proceed().with([ShellCommand::Hide {
                    window: WindowId::PRIMARY,
                }])
            }
            Some(CloseDecision::Close) => {
                self.registry.primary_mut().visibility = Visibility::Closed;
                Dispatch::proceed().with([
                    ShellCommand::Destroy {
                        window: WindowId::PRIMARY,
                    },
                    ShellCommand::Exit,
                ])
            }
            Some(CloseDecision::AwaitFullscreenExit) | None => Dispatch::proceed(),
        }
    }

    fn on_destroyed(&mut self, window: WindowId) -> Dispatch {
        self.registry.remove(window);
        if window.is_primary() && self.lifecycle.state() != LifecycleState::Closed {
            tracing::warn!(event = "shell.lifecycle.primary_destroyed_unexpectedly");
            return Dispatch::proceed().with([ShellCommand::Exit]);
        }
        Dispatch::proceed()
    }

    fn on_focus_changed(&mut self, window: WindowId, focused: bool) -> Dispatch {
        self.registry.set_focus(window, focused);
        self.app_focused = self.registry.focused().is_some();
        if focused && window.is_primary() {
            return Dispatch::proceed().with(self.badge.on_primary_focused());
        }
        Dispatch::proceed()
    }

    fn show_primary(&mut self) -> Vec<ShellCommand> {
        self.lifecycle.on_shown();
        let primary = self.registry.primary_mut();
        if primary.visibility == Visibility::Closed {
            return Vec::new();
        }
        primary.visibility = Visibility::Visible;
        vec![
            ShellCommand::Show {
                window: WindowId::PRIMARY,
            },
            ShellCommand::Focus {
                window: WindowId::PRIMARY,
            },
        ]
    }

    fn on_toggle_visibility(&mut self) -> Dispatch {
        if self.registry.primary().visibility == Visibility::Visible {
            self.lifecycle.on_hidden();
            self.registry.primary_mut().visibility = Visibility::Hidden;
            return Dispatch::proceed().with([ShellCommand::Hide {
                window: WindowId::PRIMARY,
            }]);
        }
        Dispatch::proceed().with(self.show_primary())
    }

    /// Applies a freshly resolved agent to every window built before it.
    /// Each window that already finished its first load is reloaded once.
    fn on_user_agent_resolved(&mut self, user_agent: String) -> Dispatch {
        let Some(generation) = self.session.user_agent_mut().resolve(user_agent.clone()) else {
            return Dispatch::proceed();
        };

        let stale: Vec<WindowId> = self
            .registry
            .records()
            .filter(|record| record.ua_generation < generation)
            .filter(|record| record.visibility != Visibility::Closed)
            .map(|record| record.id)
            .collect();

        let mut commands = Vec::new();
        for window in stale {
            let Some(record) = self.registry.get_mut(window) else {
                continue;
            };
            record.user_agent = Some(user_agent.clone());
            record.ua_generation = generation;
            commands.push(ShellCommand::ApplyUserAgent {
                window,
                user_agent: user_agent.clone(),
            });
            if record.first_load_completed && !record.ua_reloaded {
                record.ua_reloaded = true;
                commands.push(ShellCommand::Reload { window });
            }
        }
        tracing::info!(
            event = "shell.user_agent.applied",
            generation,
            windows = commands.len()
        );
        Dispatch::proceed().with(commands)
    }

    fn on_menu(&mut self, action: MenuAction) -> Dispatch {
        let window = self.registry.focused_or_primary();
        match action {
            MenuAction::Quit => {
                self.lifecycle.mark_quitting();
                let mut commands = Vec::new();
                if self.lifecycle.policy().clear_cache_on_close {
                    commands.push(ShellCommand::ClearCache {
                        window: WindowId::PRIMARY,
                    });
                }
                commands.push(ShellCommand::Exit);
                Dispatch::proceed().with(commands)
            }
            MenuAction::ZoomIn | MenuAction::ZoomOut | MenuAction::ZoomReset => {
                let session = &self.session;
                let Some(record) = self.registry.get_mut(window) else {
                    return Dispatch::proceed();
                };
                record.zoom_factor = match action {
                    MenuAction::ZoomIn => session.zoom_in(record.zoom_factor),
                    MenuAction::ZoomOut => session.zoom_out(record.zoom_factor),
                    _ => session.zoom_reset(),
                };
                Dispatch::proceed().with([ShellCommand::SetZoom {
                    window,
                    factor: record.zoom_factor,
                }])
            }
            MenuAction::GoBack => Dispatch::proceed().with([ShellCommand::GoBack { window }]),
            MenuAction::GoForward => Dispatch::proceed().with([ShellCommand::GoForward { window }]),
            MenuAction::CopyCurrentUrl => Dispatch::proceed().with([ShellCommand::CopyText {
                window,
                text: self.current_url(),
            }]),
            MenuAction::ClearAppData => {
                Dispatch::proceed().with([ShellCommand::ConfirmClearAppData])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        navigation_policy::Disposition,
        options::{InternalUrls, TrayMode},
        platform::FixedPlatform,
        shell_commands::EventVerdict,
        window_registry::WindowRole,
        ABOUT_BLANK,
    };

    fn options() -> Options {
        Options {
            target_url: "https://mail.example.com".to_string(),
            internal_urls: Some(InternalUrls::One("example\\.com".to_string())),
            ..Options::default()
        }
    }

    fn orchestrator(options: Options, native_tabs: bool, dock: bool) -> Orchestrator {
        let mut orchestrator = Orchestrator::new(
            options,
            Box::new(FixedPlatform {
                native_tabs,
                dock,
            }),
        );
        orchestrator.start();
        orchestrator
    }

    fn created_spec(dispatch: &Dispatch) -> &WindowSpec {
        dispatch
            .commands
            .iter()
            .find_map(|command| match command {
                ShellCommand::CreateWindow(spec) => Some(spec),
                _ => None,
            })
            .expect("a window should be created")
    }

    #[test]
    fn start_creates_primary_and_consumes_maximize_once() {
        let mut orchestrator = Orchestrator::new(
            Options {
                maximize: true,
                ..options()
            },
            Box::new(FixedPlatform::default()),
        );
        let commands = orchestrator.start();
        assert!(matches!(
            &commands[0],
            ShellCommand::CreateWindow(spec) if spec.role == WindowRole::Primary && spec.visible
        ));
        assert!(commands.contains(&ShellCommand::PersistConsumedMaximize));
        assert!(!orchestrator.options().maximize);
        assert!(orchestrator.start().is_empty());
    }

    #[test]
    fn start_in_tray_builds_hidden_primary() {
        let mut orchestrator = Orchestrator::new(
            Options {
                tray: TrayMode::StartInTray,
                ..options()
            },
            Box::new(FixedPlatform::default()),
        );
        let commands = orchestrator.start();
        assert!(matches!(&commands[0], ShellCommand::CreateWindow(spec) if !spec.visible));
        assert_eq!(orchestrator.lifecycle_state(), LifecycleState::Hidden);
    }

    #[test]
    fn start_issues_single_user_agent_lookup_for_auto() {
        let mut orchestrator = Orchestrator::new(
            Options {
                user_agent: Some("auto".to_string()),
                ..options()
            },
            Box::new(FixedPlatform::default()),
        );
        let commands = orchestrator.start();
        assert!(commands.contains(&ShellCommand::BeginUserAgentLookup));
    }

    #[test]
    fn in_page_internal_link_loads_in_place() {
        let mut orchestrator = orchestrator(options(), false, false);
        let dispatch = orchestrator.dispatch(ShellEvent::NavigationRequested(
            NavigationRequest::in_page(WindowId::PRIMARY, "https://example.com/compose"),
        ));
        assert_eq!(dispatch, Dispatch::proceed());
    }

    #[test]
    fn broken_internal_pattern_does_not_discard_valid_ones() {
        let mut orchestrator = orchestrator(
            Options {
                target_url: "https://mail.test".to_string(),
                internal_urls: Some(InternalUrls::Many(vec![
                    "example\\.com".to_string(),
                    "(".to_string(),
                ])),
                ..Options::default()
            },
            false,
            false,
        );
        let dispatch = orchestrator.dispatch(ShellEvent::NavigationRequested(
            NavigationRequest::in_page(WindowId::PRIMARY, "https://example.com/compose"),
        ));
        assert_eq!(dispatch, Dispatch::proceed());
    }

    #[test]
    fn in_page_external_link_goes_to_system_browser_and_keeps_url() {
        let mut orchestrator = orchestrator(options(), false, false);
        let dispatch = orchestrator.dispatch(ShellEvent::NavigationRequested(
            NavigationRequest::in_page(WindowId::PRIMARY, "https://outside.com"),
        ));
        assert_eq!(dispatch.verdict, EventVerdict::PreventDefault);
        assert_eq!(
            dispatch.commands,
            vec![ShellCommand::OpenExternal {
                url: "https://outside.com".to_string()
            }]
        );
        assert_eq!(orchestrator.current_url(), "https://mail.example.com");
    }

    #[test]
    fn background_tab_keeps_primary_focused() {
        let mut orchestrator = orchestrator(options(), true, true);
        orchestrator.dispatch(ShellEvent::FocusChanged {
            window: WindowId::PRIMARY,
            focused: true,
        });

        let dispatch = orchestrator.dispatch(ShellEvent::NavigationRequested(
            NavigationRequest::new_window(
                WindowId::PRIMARY,
                "https://mail.example.com/thread/1",
                Disposition::BackgroundTab,
            ),
        ));

        let spec = created_spec(&dispatch).clone();
        assert!(orchestrator.registry().contains(spec.id));
        assert_eq!(spec.tab_group, orchestrator.registry().primary().tab_group);
        assert_eq!(
            dispatch.commands.last(),
            Some(&ShellCommand::Focus {
                window: WindowId::PRIMARY
            })
        );
    }

    #[test]
    fn internal_new_window_without_tabs_opens_window() {
        let mut orchestrator = orchestrator(options(), false, false);
        let dispatch = orchestrator.dispatch(ShellEvent::NavigationRequested(
            NavigationRequest::new_window(
                WindowId::PRIMARY,
                "https://mail.example.com/print",
                Disposition::NewWindow,
            )
            .script_opened(),
        ));
        let spec = created_spec(&dispatch);
        assert_eq!(spec.role, WindowRole::Secondary);
        assert!(spec.adopt_popup);
        assert_eq!(dispatch.commands.len(), 1);
    }

    fn open_probe(orchestrator: &mut Orchestrator) -> WindowId {
        let dispatch = orchestrator.dispatch(ShellEvent::NavigationRequested(
            NavigationRequest::new_window(WindowId::PRIMARY, ABOUT_BLANK, Disposition::NewWindow),
        ));
        let spec = created_spec(&dispatch);
        assert!(!spec.visible);
        spec.id
    }

    #[test]
    fn probe_that_navigates_becomes_visible() {
        let mut orchestrator = orchestrator(options(), false, false);
        let probe = open_probe(&mut orchestrator);

        orchestrator.dispatch(ShellEvent::PageLoadStarted {
            window: probe,
            url: ABOUT_BLANK.to_string(),
        });
        let in_probe = orchestrator.dispatch(ShellEvent::NavigationRequested(
            NavigationRequest::in_page(probe, "https://example.com"),
        ));
        assert_eq!(in_probe, Dispatch::proceed());

        let dispatch = orchestrator.dispatch(ShellEvent::PageLoadFinished {
            window: probe,
            url: "https://example.com".to_string(),
        });
        assert!(dispatch
            .commands
            .contains(&ShellCommand::Show { window: probe }));
        assert_eq!(
            orchestrator.registry().get(probe).map(|r| r.visibility),
            Some(Visibility::Visible)
        );
    }

    #[test]
    fn probe_that_stays_blank_is_destroyed_never_shown() {
        let mut orchestrator = orchestrator(options(), false, false);
        let probe = open_probe(&mut orchestrator);

        let dispatch = orchestrator.dispatch(ShellEvent::PageLoadFinished {
            window: probe,
            url: ABOUT_BLANK.to_string(),
        });
        assert_eq!(dispatch.commands, vec![ShellCommand::Destroy { window: probe }]);

        orchestrator.dispatch(ShellEvent::Destroyed { window: probe });
        assert!(!orchestrator.registry().contains(probe));
    }

    #[test]
    fn close_with_start_in_tray_hides() {
        let mut orchestrator = orchestrator(
            Options {
                tray: TrayMode::StartInTray,
                ..options()
            },
            false,
            false,
        );
        let dispatch = orchestrator.dispatch(ShellEvent::CloseRequested {
            window: WindowId::PRIMARY,
        });
        assert!(dispatch.is_prevented());
        assert_eq!(
            dispatch.commands,
            vec![ShellCommand::Hide {
                window: WindowId::PRIMARY
            }]
        );
        assert_eq!(orchestrator.lifecycle_state(), LifecycleState::Hidden);
    }

    #[test]
    fn close_with_fast_quit_exits_even_with_tray() {
        let mut orchestrator = orchestrator(
            Options {
                tray: TrayMode::StartVisible,
                fast_quit: true,
                ..options()
            },
            false,
            true,
        );
        let dispatch = orchestrator.dispatch(ShellEvent::CloseRequested {
            window: WindowId::PRIMARY,
        });
        assert_eq!(dispatch.verdict, EventVerdict::Proceed);
        assert_eq!(dispatch.commands, vec![ShellCommand::Exit]);
        assert_eq!(orchestrator.lifecycle_state(), LifecycleState::Closed);
    }

    #[test]
    fn close_clears_cache_on_every_branch_when_configured() {
        for fast_quit in [false, true] {
            let mut orchestrator = orchestrator(
                Options {
                    clear_cache: true,
                    fast_quit,
                    ..options()
                },
                false,
                true,
            );
            let dispatch = orchestrator.dispatch(ShellEvent::CloseRequested {
                window: WindowId::PRIMARY,
            });
            assert_eq!(
                dispatch.commands[0],
                ShellCommand::ClearCache {
                    window: WindowId::PRIMARY
                }
            );
        }
    }

    #[test]
    fn fullscreen_close_migrates_tabs_and_waits_for_exit() {
        let mut orchestrator = orchestrator(options(), true, true);
        orchestrator.dispatch(ShellEvent::NavigationRequested(NavigationRequest::new_window(
            WindowId::PRIMARY,
            "https://mail.example.com/tab",
            Disposition::ForegroundTab,
        )));
        orchestrator.dispatch(ShellEvent::FullscreenChanged {
            window: WindowId::PRIMARY,
            fullscreen: true,
        });

        let dispatch = orchestrator.dispatch(ShellEvent::CloseRequested {
            window: WindowId::PRIMARY,
        });
        assert!(dispatch.is_prevented());
        assert_eq!(
            dispatch.commands.last(),
            Some(&ShellCommand::SetFullscreen {
                window: WindowId::PRIMARY,
                fullscreen: false
            })
        );
        assert!(dispatch
            .commands
            .iter()
            .any(|command| matches!(command, ShellCommand::CreateWindow(_))));
        assert_eq!(
            orchestrator.lifecycle_state(),
            LifecycleState::ExitingFullscreen
        );
        assert!(orchestrator.registry().primary().fullscreen);

        let resumed = orchestrator.dispatch(ShellEvent::FullscreenChanged {
            window: WindowId::PRIMARY,
            fullscreen: false,
        });
        assert_eq!(
            resumed.commands,
            vec![ShellCommand::Hide {
                window: WindowId::PRIMARY
            }]
        );
        assert_eq!(orchestrator.lifecycle_state(), LifecycleState::Hidden);
    }

    #[test]
    fn fullscreen_close_without_suppression_destroys_after_exit() {
        let mut orchestrator = orchestrator(options(), false, false);
        orchestrator.dispatch(ShellEvent::FullscreenChanged {
            window: WindowId::PRIMARY,
            fullscreen: true,
        });
        orchestrator.dispatch(ShellEvent::CloseRequested {
            window: WindowId::PRIMARY,
        });
        let resumed = orchestrator.dispatch(ShellEvent::FullscreenChanged {
            window: WindowId::PRIMARY,
            fullscreen: false,
        });
        assert_eq!(
            resumed.commands,
            vec![
                ShellCommand::Destroy {
                    window: WindowId::PRIMARY
                },
                ShellCommand::Exit
            ]
        );
    }

    #[test]
    fn zoom_targets_focused_window_and_resets_to_base() {
        let mut orchestrator = orchestrator(
            Options {
                zoom: 1.2,
                ..options()
            },
            false,
            false,
        );
        let dispatch = orchestrator.dispatch(ShellEvent::NavigationRequested(
            NavigationRequest::new_window(
                WindowId::PRIMARY,
                "https://mail.example.com/2",
                Disposition::NewWindow,
            ),
        ));
        let second = created_spec(&dispatch).id;
        orchestrator.dispatch(ShellEvent::FocusChanged {
            window: second,
            focused: true,
        });

        orchestrator.dispatch(ShellEvent::Menu(MenuAction::ZoomIn));
        orchestrator.dispatch(ShellEvent::Menu(MenuAction::ZoomIn));
        let zoom_of = |o: &Orchestrator, id| o.registry().get(id).map(|r| r.zoom_factor);
        assert!((zoom_of(&orchestrator, second).unwrap() - 1.4).abs() < 1e-9);
        assert_eq!(zoom_of(&orchestrator, WindowId::PRIMARY), Some(1.2));

        let reset = orchestrator.dispatch(ShellEvent::Menu(MenuAction::ZoomReset));
        assert_eq!(
            reset.commands,
            vec![ShellCommand::SetZoom {
                window: second,
                factor: 1.2
            }]
        );
    }

    #[test]
    fn first_load_sends_params_once_and_reapplies_pinch_limits() {
        let mut orchestrator = orchestrator(options(), false, false);
        let finish = |o: &mut Orchestrator| {
            o.dispatch(ShellEvent::PageLoadFinished {
                window: WindowId::PRIMARY,
                url: "https://mail.example.com/".to_string(),
            })
        };
        let first = finish(&mut orchestrator);
        assert!(first
            .commands
            .iter()
            .any(|c| matches!(c, ShellCommand::EmitParams { .. })));
        let second = finish(&mut orchestrator);
        assert!(!second
            .commands
            .iter()
            .any(|c| matches!(c, ShellCommand::EmitParams { .. })));
        assert!(second.commands.contains(&ShellCommand::SetPinchZoomLimits {
            window: WindowId::PRIMARY,
            min: 1.0,
            max: 3.0
        }));
    }

    #[test]
    fn css_is_injected_once_per_navigation() {
        let mut orchestrator = orchestrator(
            Options {
                css: Some("body { color: red; }".to_string()),
                ..options()
            },
            false,
            false,
        );
        let count_css = |dispatch: &Dispatch| {
            dispatch
                .commands
                .iter()
                .filter(|c| matches!(c, ShellCommand::InsertCss { .. }))
                .count()
        };

        orchestrator.dispatch(ShellEvent::PageLoadStarted {
            window: WindowId::PRIMARY,
            url: "https://mail.example.com/".to_string(),
        });
        let first = orchestrator.dispatch(ShellEvent::FirstResponse {
            window: WindowId::PRIMARY,
        });
        let again = orchestrator.dispatch(ShellEvent::FirstResponse {
            window: WindowId::PRIMARY,
        });
        let finished = orchestrator.dispatch(ShellEvent::PageLoadFinished {
            window: WindowId::PRIMARY,
            url: "https://mail.example.com/".to_string(),
        });
        assert_eq!(count_css(&first) + count_css(&again) + count_css(&finished), 1);
    }

    #[test]
    fn resolved_user_agent_reloads_loaded_windows_once() {
        let mut orchestrator = orchestrator(
            Options {
                user_agent: Some("auto".to_string()),
                ..options()
            },
            false,
            false,
        );
        orchestrator.dispatch(ShellEvent::PageLoadFinished {
            window: WindowId::PRIMARY,
            url: "https://mail.example.com/".to_string(),
        });
        let pending = orchestrator.dispatch(ShellEvent::NavigationRequested(
            NavigationRequest::new_window(
                WindowId::PRIMARY,
                "https://mail.example.com/other",
                Disposition::NewWindow,
            ),
        ));
        let second = created_spec(&pending).id;

        let dispatch = orchestrator.dispatch(ShellEvent::UserAgentResolved {
            user_agent: "UA/1".to_string(),
        });
        let reloads: Vec<_> = dispatch
            .commands
            .iter()
            .filter_map(|c| match c {
                ShellCommand::Reload { window } => Some(*window),
                _ => None,
            })
            .collect();
        assert_eq!(reloads, vec![WindowId::PRIMARY]);
        assert!(dispatch.commands.contains(&ShellCommand::ApplyUserAgent {
            window: second,
            user_agent: "UA/1".to_string()
        }));

        let repeat = orchestrator.dispatch(ShellEvent::UserAgentResolved {
            user_agent: "UA/2".to_string(),
        });
        assert!(repeat.commands.is_empty());

        let later = orchestrator.dispatch(ShellEvent::NavigationRequested(
            NavigationRequest::new_window(
                WindowId::PRIMARY,
                "https://mail.example.com/later",
                Disposition::NewWindow,
            ),
        ));
        assert_eq!(created_spec(&later).user_agent.as_deref(), Some("UA/1"));
    }

    #[test]
    fn counter_badge_follows_primary_title_only() {
        let mut orchestrator = orchestrator(
            Options {
                counter: true,
                ..options()
            },
            false,
            false,
        );
        let dispatch = orchestrator.dispatch(ShellEvent::TitleChanged {
            window: WindowId::PRIMARY,
            title: "Inbox (42)".to_string(),
        });
        assert_eq!(
            dispatch.commands,
            vec![ShellCommand::SetBadge {
                label: Some("42".to_string())
            }]
        );
        let other = orchestrator.dispatch(ShellEvent::TitleChanged {
            window: WindowId::PRIMARY,
            title: "Inbox".to_string(),
        });
        assert_eq!(other.commands, vec![ShellCommand::SetBadge { label: None }]);
    }

    #[test]
    fn notification_badge_only_when_unfocused() {
        let mut orchestrator = orchestrator(options(), false, false);
        orchestrator.dispatch(ShellEvent::FocusChanged {
            window: WindowId::PRIMARY,
            focused: true,
        });
        assert!(orchestrator
            .dispatch(ShellEvent::NotificationReceived)
            .commands
            .is_empty());

        orchestrator.dispatch(ShellEvent::FocusChanged {
            window: WindowId::PRIMARY,
            focused: false,
        });
        assert_eq!(
            orchestrator.dispatch(ShellEvent::NotificationReceived).commands.len(),
            1
        );
        let focus = orchestrator.dispatch(ShellEvent::FocusChanged {
            window: WindowId::PRIMARY,
            focused: true,
        });
        assert_eq!(focus.commands, vec![ShellCommand::SetBadge { label: None }]);
    }

    #[test]
    fn quit_overrides_tray_suppression() {
        let mut orchestrator = orchestrator(
            Options {
                tray: TrayMode::StartVisible,
                ..options()
            },
            false,
            false,
        );
        let quit = orchestrator.dispatch(ShellEvent::Menu(MenuAction::Quit));
        assert_eq!(quit.commands, vec![ShellCommand::Exit]);
        let close = orchestrator.dispatch(ShellEvent::CloseRequested {
            window: WindowId::PRIMARY,
        });
        assert_eq!(close.verdict, EventVerdict::Proceed);
    }

    #[test]
    fn notification_click_and_reactivation_show_primary() {
        let mut orchestrator = orchestrator(
            Options {
                tray: TrayMode::StartInTray,
                ..options()
            },
            false,
            false,
        );
        let shown = orchestrator.dispatch(ShellEvent::NotificationClicked);
        assert!(shown.commands.contains(&ShellCommand::Show {
            window: WindowId::PRIMARY
        }));
        assert_eq!(orchestrator.lifecycle_state(), LifecycleState::Visible);

        assert!(orchestrator
            .dispatch(ShellEvent::Reactivated {
                has_visible_windows: true
            })
            .commands
            .is_empty());
        let toggled = orchestrator.dispatch(ShellEvent::ToggleVisibility);
        assert_eq!(
            toggled.commands,
            vec![ShellCommand::Hide {
                window: WindowId::PRIMARY
            }]
        );
    }

    #[test]
    fn secondary_close_proceeds_without_lifecycle_change() {
        let mut orchestrator = orchestrator(options(), false, true);
        let dispatch = orchestrator.dispatch(ShellEvent::NavigationRequested(
            NavigationRequest::new_window(
                WindowId::PRIMARY,
                "https://mail.example.com/x",
                Disposition::NewWindow,
            ),
        ));
        let second = created_spec(&dispatch).id;
        let close = orchestrator.dispatch(ShellEvent::CloseRequested { window: second });
        assert_eq!(close, Dispatch::proceed());
        assert_eq!(orchestrator.lifecycle_state(), LifecycleState::Visible);
    }
}
