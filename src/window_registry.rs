use std::{collections::BTreeMap, fmt};

use crate::{
    navigation_policy::ProbeState, session_config::CssInjection, PRIMARY_WINDOW_LABEL,
    SECONDARY_WINDOW_LABEL_PREFIX,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(u64);

impl WindowId {
    pub const PRIMARY: WindowId = WindowId(0);

    pub fn is_primary(self) -> bool {
        self == Self::PRIMARY
    }

    pub fn label(self) -> String {
        if self.is_primary() {
            PRIMARY_WINDOW_LABEL.to_string()
        } else {
            format!("{SECONDARY_WINDOW_LABEL_PREFIX}{}", self.0)
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        if label == PRIMARY_WINDOW_LABEL {
            return Some(Self::PRIMARY);
        }
        label
            .strip_prefix(SECONDARY_WINDOW_LABEL_PREFIX)
            .and_then(|raw| raw.parse::<u64>().ok())
            .filter(|raw| *raw != 0)
            .map(WindowId)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TabGroupId(u64);

impl TabGroupId {
    pub fn identifier(self) -> String {
        format!("pagewrap-tabs-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRole {
    Primary,
    Secondary,
    Probe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowRecord {
    pub id: WindowId,
    pub role: WindowRole,
    pub tab_group: Option<TabGroupId>,
    pub fullscreen: bool,
    pub visibility: Visibility,
    pub user_agent: Option<String>,
    /// Value of the user-agent generation counter when the window was built.
    pub ua_generation: u64,
    pub ua_reloaded: bool,
    pub zoom_factor: f64,
    pub current_url: String,
    pub first_load_completed: bool,
    pub params_sent: bool,
    pub css: CssInjection,
    pub probe: Option<ProbeState>,
}

impl WindowRecord {
    pub fn new(id: WindowId, role: WindowRole, url: impl Into<String>, zoom_factor: f64) -> Self {
        Self {
            id,
            role,
            tab_group: None,
            fullscreen: false,
            visibility: Visibility::Visible,
            user_agent: None,
            ua_generation: 0,
            ua_reloaded: false,
            zoom_factor,
            current_url: url.into(),
            first_load_completed: false,
            params_sent: false,
            css: CssInjection::default(),
            probe: (role == WindowRole::Probe).then_some(ProbeState::Created),
        }
    }

    pub fn probe_pending(&self) -> bool {
        self.probe.is_some_and(ProbeState::is_unresolved)
    }
}

/// The one authoritative id → record mapping. Only the orchestrator holds it.
#[derive(Debug)]
pub struct WindowRegistry {
    records: BTreeMap<WindowId, WindowRecord>,
    focused: Option<WindowId>,
    next_window: u64,
    next_group: u64,
}

impl WindowRegistry {
    pub fn new(primary: WindowRecord) -> Self {
        debug_assert!(primary.id.is_primary());
        let mut records = BTreeMap::new();
        records.insert(WindowId::PRIMARY, primary);
        Self {
            records,
            focused: None,
            next_window: 1,
            next_group: 1,
        }
    }

    pub fn allocate_id(&mut self) -> WindowId {
        let id = WindowId(self.next_window);
        self.next_window += 1;
        id
    }

    pub fn allocate_group(&mut self) -> TabGroupId {
        let group = TabGroupId(self.next_group);
        self.next_group += 1;
        group
    }

    pub fn insert(&mut self, record: WindowRecord) {
        debug_assert!(!record.id.is_primary(), "primary window is never replaced");
        self.records.insert(record.id, record);
    }

    /// Drops a secondary record. The primary stays for the life of the process.
    pub fn remove(&mut self, id: WindowId) -> Option<WindowRecord> {
        if id.is_primary() {
            if let Some(primary) = self.records.get_mut(&id) {
                primary.visibility = Visibility::Closed;
            }
            return None;
        }
        if self.focused == Some(id) {
            self.focused = None;
        }
        self.records.remove(&id)
    }

    pub fn get(&self, id: WindowId) -> Option<&WindowRecord> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut WindowRecord> {
        self.records.get_mut(&id)
    }

    pub fn primary(&self) -> &WindowRecord {
        &self.records[&WindowId::PRIMARY]
    }

    pub fn primary_mut(&mut self) -> &mut WindowRecord {
        self.records
            .get_mut(&WindowId::PRIMARY)
            .unwrap_or_else(|| unreachable!("primary record is inserted at construction"))
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    pub fn set_focus(&mut self, id: WindowId, focused: bool) {
        if focused {
            if self.contains(id) {
                self.focused = Some(id);
            }
        } else if self.focused == Some(id) {
            self.focused = None;
        }
    }

    pub fn focused_or_primary(&self) -> WindowId {
        self.focused
            .filter(|id| self.contains(*id))
            .unwrap_or(WindowId::PRIMARY)
    }

    pub fn records(&self) -> impl Iterator<Item = &WindowRecord> {
        self.records.values()
    }

    /// Other live windows sharing `id`'s tab group.
    pub fn tab_siblings(&self, id: WindowId) -> Vec<WindowId> {
        let Some(group) = self.get(id).and_then(|record| record.tab_group) else {
            return Vec::new();
        };
        self.records
            .values()
            .filter(|record| record.id != id && record.tab_group == Some(group))
            .filter(|record| record.visibility != Visibility::Closed)
            .map(|record| record.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> WindowRegistry {
        WindowRegistry::new(WindowRecord::new(
            WindowId::PRIMARY,
            WindowRole::Primary,
            "https://a.example",
            1.0,
        ))
    }

    #[test]
    fn labels_round_trip_through_ids() {
        assert_eq!(WindowId::PRIMARY.label(), "main");
        assert_eq!(WindowId::from_label("main"), Some(WindowId::PRIMARY));
        assert_eq!(WindowId::from_label("window-7"), Some(WindowId(7)));
        assert_eq!(WindowId::from_label("window-0"), None);
        assert_eq!(WindowId::from_label("other"), None);
    }

    #[test]
    fn primary_is_never_removed() {
        let mut registry = registry();
        assert!(registry.remove(WindowId::PRIMARY).is_none());
        assert!(registry.contains(WindowId::PRIMARY));
        assert_eq!(registry.primary().visibility, Visibility::Closed);
    }

    #[test]
    fn removing_focused_window_clears_focus() {
        let mut registry = registry();
        let id = registry.allocate_id();
        registry.insert(WindowRecord::new(id, WindowRole::Secondary, "https://a.example/x", 1.0));
        registry.set_focus(id, true);
        assert_eq!(registry.focused(), Some(id));
        registry.remove(id);
        assert_eq!(registry.focused(), None);
        assert_eq!(registry.focused_or_primary(), WindowId::PRIMARY);
    }

    #[test]
    fn tab_siblings_share_a_group() {
        let mut registry = registry();
        let group = registry.allocate_group();
        registry.primary_mut().tab_group = Some(group);
        let tab = registry.allocate_id();
        let mut record = WindowRecord::new(tab, WindowRole::Secondary, "https://a.example/t", 1.0);
        record.tab_group = Some(group);
        registry.insert(record);
        let loner = registry.allocate_id();
        registry.insert(WindowRecord::new(loner, WindowRole::Secondary, "https://a.example/l", 1.0));

        assert_eq!(registry.tab_siblings(WindowId::PRIMARY), vec![tab]);
        assert!(registry.tab_siblings(loner).is_empty());
    }

    #[test]
    fn probe_records_start_in_created_state() {
        let record = WindowRecord::new(WindowId(3), WindowRole::Probe, "about:blank", 1.0);
        assert_eq!(record.probe, Some(ProbeState::Created));
        assert!(record.probe_pending());
    }
}
