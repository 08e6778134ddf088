//! Deferred construction and deferred loading, driven by one-shot activation.

use crate::ActivationState;

/// Defers building a subtree until its region first becomes visible.
///
/// Feed it the states of a `trigger_once` observation. Once mounted it stays mounted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LazyMount {
    mounted: bool,
}

impl LazyMount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Returns `true` exactly once: on the activation that mounts the subtree.
    pub fn on_activation(&mut self, state: ActivationState) -> bool {
        if self.mounted || !(state.is_intersecting || state.has_triggered) {
            return false;
        }
        self.mounted = true;
        true
    }
}

/// Load phase of a [`LazyResource`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadPhase<T, E> {
    /// Not visible yet; nothing requested.
    Deferred,
    Loading,
    Ready(T),
    Failed(E),
}

/// Defers fetching a resource (an image, a detail record) until its region becomes visible.
///
/// There is no retry: a failed load stays `Failed` until [`LazyResource::reset`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LazyResource<T, E> {
    phase: LoadPhase<T, E>,
}

impl<T, E> Default for LazyResource<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> LazyResource<T, E> {
    pub fn new() -> Self {
        Self {
            phase: LoadPhase::Deferred,
        }
    }

    pub fn phase(&self) -> &LoadPhase<T, E> {
        &self.phase
    }

    /// Returns `true` exactly once, when the caller should start the fetch.
    pub fn on_activation(&mut self, state: ActivationState) -> bool {
        if !matches!(self.phase, LoadPhase::Deferred) {
            return false;
        }
        if !(state.is_intersecting || state.has_triggered) {
            return false;
        }
        self.phase = LoadPhase::Loading;
        true
    }

    /// Records the fetch outcome. Ignored unless a load is in progress.
    pub fn resolve(&mut self, result: Result<T, E>) {
        if !matches!(self.phase, LoadPhase::Loading) {
            swarn!("LazyResource::resolve called while not loading; ignoring");
            return;
        }
        self.phase = match result {
            Ok(v) => LoadPhase::Ready(v),
            Err(e) => LoadPhase::Failed(e),
        };
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, LoadPhase::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match &self.phase {
            LoadPhase::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match &self.phase {
            LoadPhase::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Back to `Deferred`, e.g. when the resource source changes.
    pub fn reset(&mut self) {
        self.phase = LoadPhase::Deferred;
    }
}
