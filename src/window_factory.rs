use crate::{
    navigation_policy::TabPlacement,
    session_config::SessionConfigurator,
    shell_commands::{ShellCommand, WindowSpec},
    window_registry::{Visibility, WindowId, WindowRecord, WindowRegistry, WindowRole},
    ABOUT_BLANK,
};

pub struct WindowFactory<'a> {
    session: &'a SessionConfigurator,
    supports_native_tabs: bool,
}

impl<'a> WindowFactory<'a> {
    pub fn new(session: &'a SessionConfigurator, supports_native_tabs: bool) -> Self {
        Self {
            session,
            supports_native_tabs,
        }
    }

    fn new_record(&self, id: WindowId, role: WindowRole, url: &str) -> WindowRecord {
        let mut record = WindowRecord::new(id, role, url, self.session.base_zoom());
        record.user_agent = self.session.user_agent().for_new_window();
        record.ua_generation = self.session.user_agent().generation();
        record
    }

    fn spec_for(&self, record: &WindowRecord, adopt_popup: bool) -> WindowSpec {
        WindowSpec {
            id: record.id,
            role: record.role,
            url: record.current_url.clone(),
            visible: record.visibility == Visibility::Visible,
            user_agent: record.user_agent.clone(),
            proxy: self.session.proxy().cloned(),
            zoom_factor: record.zoom_factor,
            tab_group: record.tab_group,
            adopt_popup,
        }
    }

    pub fn primary(&self, target_url: &str, visible: bool) -> (WindowRecord, WindowSpec) {
        let mut record = self.new_record(WindowId::PRIMARY, WindowRole::Primary, target_url);
        if !visible {
            record.visibility = Visibility::Hidden;
        }
        let spec = self.spec_for(&record, false);
        (record, spec)
    }

    pub fn create_window(
        &self,
        registry: &mut WindowRegistry,
        url: &str,
        adopt_popup: bool,
    ) -> ShellCommand {
        let id = registry.allocate_id();
        let mut record = self.new_record(id, WindowRole::Secondary, url);
        if self.supports_native_tabs {
            record.tab_group = Some(registry.allocate_group());
        }
        let spec = self.spec_for(&record, adopt_popup);
        registry.insert(record);
        tracing::debug!(event = "shell.factory.window_created", window = %id, url = %url);
        ShellCommand::CreateWindow(spec)
    }

    /// Adds a tab to the focused window's group (the origin's when nothing has focus).
    /// Background tabs hand focus back to `origin` afterwards.
    pub fn create_tab(
        &self,
        registry: &mut WindowRegistry,
        origin: WindowId,
        url: &str,
        placement: TabPlacement,
        adopt_popup: bool,
    ) -> Vec<ShellCommand> {
        debug_assert!(
            self.supports_native_tabs,
            "create_tab requires native tab support"
        );
        if !self.supports_native_tabs {
            tracing::error!(event = "shell.factory.tab_unsupported", url = %url);
            return vec![self.create_window(registry, url, adopt_popup)];
        }

        let host = registry
            .focused()
            .filter(|id| registry.contains(*id))
            .unwrap_or(origin);
        let group = match registry.get(host).and_then(|record| record.tab_group) {
            Some(group) => group,
            None => {
                let group = registry.allocate_group();
                if let Some(record) = registry.get_mut(host) {
                    record.tab_group = Some(group);
                }
                group
            }
        };

        let id = registry.allocate_id();
        let mut record = self.new_record(id, WindowRole::Secondary, url);
        record.tab_group = Some(group);
        let spec = self.spec_for(&record, adopt_popup);
        registry.insert(record);
        tracing::debug!(
            event = "shell.factory.tab_created",
            window = %id,
            host = %host,
            placement = ?placement
        );

        let mut commands = vec![ShellCommand::CreateWindow(spec)];
        if placement == TabPlacement::Background {
            commands.push(ShellCommand::Focus { window: origin });
        }
        commands
    }

    /// Hidden `about:blank` window whose fate is decided by its first load.
    pub fn create_probe_window(
        &self,
        registry: &mut WindowRegistry,
        adopt_popup: bool,
    ) -> ShellCommand {
        let id = registry.allocate_id();
        let mut record = self.new_record(id, WindowRole::Probe, ABOUT_BLANK);
        record.visibility = Visibility::Hidden;
        let spec = self.spec_for(&record, adopt_popup);
        registry.insert(record);
        tracing::debug!(event = "shell.factory.probe_created", window = %id);
        ShellCommand::CreateWindow(spec)
    }

    /// Moves `window`'s tab siblings into one fresh standalone group.
    pub fn migrate_tabs(&self, registry: &mut WindowRegistry, window: WindowId) -> Vec<ShellCommand> {
        let siblings = registry.tab_siblings(window);
        if siblings.is_empty() {
            return Vec::new();
        }

        let group = registry.allocate_group();
        let mut commands = Vec::with_capacity(siblings.len() * 2);
        for sibling in siblings {
            let Some(old) = registry.get_mut(sibling) else {
                continue;
            };
            old.visibility = Visibility::Closed;
            let url = old.current_url.clone();
            let zoom_factor = old.zoom_factor;

            let id = registry.allocate_id();
            let mut record = self.new_record(id, WindowRole::Secondary, &url);
            record.tab_group = Some(group);
            record.zoom_factor = zoom_factor;
            let spec = self.spec_for(&record, false);
            registry.insert(record);

            commands.push(ShellCommand::CreateWindow(spec));
            commands.push(ShellCommand::Destroy { window: sibling });
        }
        tracing::info!(
            event = "shell.factory.tabs_migrated",
            from = %window,
            moved = commands.len() / 2
        );
        commands
    }
}
