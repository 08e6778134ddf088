use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::key::RegionKey;
use crate::{ActivationState, Bounds, RootMargin};

/// Callback fired when an observation's `is_intersecting` flips.
pub type ActivationCallback = Arc<dyn Fn(ObservationId, ActivationState) + Send + Sync>;

/// Handle returned by [`ActivationTracker::observe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObservationId(u64);

/// Configuration for a single observation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObserveOptions {
    /// Minimum visible fraction of the region (0..=1) for it to count as intersecting.
    pub threshold: f32,
    pub root_margin: RootMargin,
    /// Stop watching after the first activation.
    pub trigger_once: bool,
}

impl ObserveOptions {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_root_margin(mut self, root_margin: RootMargin) -> Self {
        self.root_margin = root_margin;
        self
    }

    pub fn with_trigger_once(mut self, trigger_once: bool) -> Self {
        self.trigger_once = trigger_once;
        self
    }

    fn clamped_threshold(&self) -> f32 {
        if self.threshold.is_nan() {
            0.0
        } else {
            self.threshold.clamp(0.0, 1.0)
        }
    }
}

/// Applies `margin` to `root`. A margin that shrinks past zero collapses the axis.
pub fn expand_root(root: Bounds, margin: RootMargin) -> Bounds {
    let left = root.x.saturating_sub(margin.left as i64);
    let top = root.y.saturating_sub(margin.top as i64);
    let right = root.right().saturating_add(margin.right as i64).max(left);
    let bottom = root.bottom().saturating_add(margin.bottom as i64).max(top);
    Bounds {
        x: left,
        y: top,
        width: u32::try_from(right - left).unwrap_or(u32::MAX),
        height: u32::try_from(bottom - top).unwrap_or(u32::MAX),
    }
}

/// Returns the visible fraction of `region` inside `root`, or `None` when they do not touch.
///
/// Touching edges count as an intersection with ratio 0. A zero-area region inside the root
/// has ratio 1.
pub fn intersection_ratio(root: Bounds, region: Bounds) -> Option<f32> {
    let left = root.x.max(region.x);
    let top = root.y.max(region.y);
    let right = root.right().min(region.right());
    let bottom = root.bottom().min(region.bottom());
    if right < left || bottom < top {
        return None;
    }

    let area = region.area();
    if area == 0 {
        return Some(1.0);
    }
    let overlap = (right - left) as u64 * (bottom - top) as u64;
    Some((overlap as f64 / area as f64) as f32)
}

/// Whether `region` counts as intersecting `root` under `options`.
pub fn is_intersecting(root: Bounds, region: Bounds, options: &ObserveOptions) -> bool {
    let root = expand_root(root, options.root_margin);
    let threshold = options.clamped_threshold();
    match intersection_ratio(root, region) {
        Some(ratio) => ratio >= threshold,
        None => false,
    }
}

struct Observation<R> {
    id: ObservationId,
    region: R,
    options: ObserveOptions,
    state: ActivationState,
    watching: bool,
    callback: Option<ActivationCallback>,
}

/// Tracks whether observed regions are visible inside a root.
///
/// The tracker holds no platform objects. The adapter calls [`ActivationTracker::evaluate`]
/// whenever geometry may have changed (scroll, resize, layout) and supplies the current bounds
/// of each region by key. Callbacks receive only transitions, in observation order.
pub struct ActivationTracker<R> {
    observations: Vec<Observation<R>>,
    next_id: u64,
}

impl<R> Default for ActivationTracker<R> {
    fn default() -> Self {
        Self {
            observations: Vec::new(),
            next_id: 0,
        }
    }
}

impl<R> core::fmt::Debug for ActivationTracker<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ActivationTracker")
            .field("observations", &self.observations.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl<R: RegionKey> ActivationTracker<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts observing a region without a callback; poll with [`ActivationTracker::state`].
    ///
    /// A `None` region (the handle does not exist yet) is a no-op and returns `None`.
    pub fn observe(
        &mut self,
        region: Option<R>,
        options: ObserveOptions,
    ) -> Option<ObservationId> {
        self.insert(region, options, None)
    }

    /// Starts observing a region and reports every `is_intersecting` transition to `callback`.
    ///
    /// A `None` region is a no-op and returns `None`; the callback is dropped unused.
    pub fn subscribe(
        &mut self,
        region: Option<R>,
        options: ObserveOptions,
        callback: impl Fn(ObservationId, ActivationState) + Send + Sync + 'static,
    ) -> Option<ObservationId> {
        self.insert(region, options, Some(Arc::new(callback)))
    }

    fn insert(
        &mut self,
        region: Option<R>,
        options: ObserveOptions,
        callback: Option<ActivationCallback>,
    ) -> Option<ObservationId> {
        let Some(region) = region else {
            sdebug!("ActivationTracker: region unavailable, ignoring observe");
            return None;
        };
        let id = ObservationId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        strace!(
            id = id.0,
            threshold = options.threshold,
            trigger_once = options.trigger_once,
            "observe"
        );
        self.observations.push(Observation {
            id,
            region,
            options,
            state: ActivationState::default(),
            watching: true,
            callback,
        });
        Some(id)
    }

    /// Stops observing and releases the observation. Returns `false` for an unknown id.
    pub fn unobserve(&mut self, id: ObservationId) -> bool {
        let before = self.observations.len();
        self.observations.retain(|o| o.id != id);
        let removed = self.observations.len() != before;
        if removed {
            strace!(id = id.0, "unobserve");
        }
        removed
    }

    /// Tears down every observation of `region` (e.g. when it unmounts).
    pub fn unobserve_region(&mut self, region: &R) -> usize {
        let before = self.observations.len();
        self.observations.retain(|o| o.region != *region);
        before - self.observations.len()
    }

    pub fn clear(&mut self) {
        self.observations.clear();
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn state(&self, id: ObservationId) -> Option<ActivationState> {
        self.find(id).map(|o| o.state)
    }

    /// `false` once a one-shot observation has fired, or for an unknown id.
    pub fn is_watching(&self, id: ObservationId) -> bool {
        self.find(id).is_some_and(|o| o.watching)
    }

    pub fn region(&self, id: ObservationId) -> Option<&R> {
        self.find(id).map(|o| &o.region)
    }

    fn find(&self, id: ObservationId) -> Option<&Observation<R>> {
        self.observations.iter().find(|o| o.id == id)
    }

    /// Recomputes every live observation against `root`.
    ///
    /// `geometry` returns the current bounds of a region, or `None` when it no longer exists;
    /// such observations are torn down without reporting. Returns the number of transitions
    /// delivered.
    pub fn evaluate(
        &mut self,
        root: Bounds,
        mut geometry: impl FnMut(&R) -> Option<Bounds>,
    ) -> usize {
        let mut pending: Vec<(ActivationCallback, ObservationId, ActivationState)> = Vec::new();
        let mut transitions = 0usize;

        self.observations.retain_mut(|o| {
            if !o.watching {
                return true;
            }
            let Some(bounds) = geometry(&o.region) else {
                strace!(id = o.id.0, "region gone, tearing down observation");
                return false;
            };

            let now = is_intersecting(root, bounds, &o.options);
            if now == o.state.is_intersecting {
                return true;
            }

            o.state.is_intersecting = now;
            if now && o.options.trigger_once {
                o.state.has_triggered = true;
                o.watching = false;
            }
            transitions += 1;
            strace!(id = o.id.0, is_intersecting = now, "activation transition");
            if let Some(cb) = &o.callback {
                pending.push((Arc::clone(cb), o.id, o.state));
            }
            true
        });

        for (cb, id, state) in pending {
            cb(id, state);
        }
        transitions
    }
}
