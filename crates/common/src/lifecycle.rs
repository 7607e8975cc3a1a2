//! Host lifecycle signals
//!
//! The host application signals imminent suspension (e.g. app backgrounding)
//! so the pipeline can force a final flush before execution is frozen.
//! Hooks fire exactly once per registration per occurrence, on the thread
//! delivering the signal.

use parking_lot::Mutex;

/// Callback invoked when the host is about to suspend.
pub type SuspendHook = Box<dyn Fn() + Send + Sync + 'static>;

/// Source of host suspension signals.
pub trait LifecycleObserver: Send + Sync {
    /// Register a hook to run on each future suspension signal.
    fn observe_suspend(&self, hook: SuspendHook);
}

/// Lifecycle source that never signals. Default for hosts without a
/// suspension concept (daemons, CLI tools).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLifecycle;

impl NoopLifecycle {
    pub fn new() -> Self {
        Self
    }
}

impl LifecycleObserver for NoopLifecycle {
    fn observe_suspend(&self, _hook: SuspendHook) {}
}

/// Manually driven lifecycle source.
///
/// The host embedding wires its platform notification (applicationWillResignActive,
/// SIGTERM handler, ...) to [`SuspendNotifier::fire`]; every registered hook
/// runs once per call.
#[derive(Default)]
pub struct SuspendNotifier {
    hooks: Mutex<Vec<SuspendHook>>,
}

impl SuspendNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a suspension signal to every registered hook.
    pub fn fire(&self) {
        let hooks = self.hooks.lock();
        for hook in hooks.iter() {
            hook();
        }
    }

    /// Number of registered hooks.
    pub fn hook_count(&self) -> usize {
        self.hooks.lock().len()
    }
}

impl LifecycleObserver for SuspendNotifier {
    fn observe_suspend(&self, hook: SuspendHook) {
        self.hooks.lock().push(hook);
    }
}
