/// Platform behaviour the state machines branch on, kept behind a trait so
/// the policy code never checks OS names directly.
pub trait PlatformCapabilities: Send + Sync {
    fn supports_native_tabs(&self) -> bool;
    fn persists_in_dock_when_closed(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NativePlatform;

impl PlatformCapabilities for NativePlatform {
    fn supports_native_tabs(&self) -> bool {
        cfg!(target_os = "macos")
    }

    fn persists_in_dock_when_closed(&self) -> bool {
        cfg!(target_os = "macos")
    }
}

#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPlatform {
    pub native_tabs: bool,
    pub dock: bool,
}

#[cfg(test)]
impl PlatformCapabilities for FixedPlatform {
    fn supports_native_tabs(&self) -> bool {
        self.native_tabs
    }

    fn persists_in_dock_when_closed(&self) -> bool {
        self.dock
    }
}
