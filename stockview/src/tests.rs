use crate::*;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        debug_assert!(start < end_exclusive);
        let span = (end_exclusive - start) as u64;
        start + (self.next_u64() % span) as usize
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.gen_range_usize(0, i + 1);
            items.swap(i, j);
        }
    }
}

fn desc(make: &str, page: u32) -> QueryDescriptor {
    QueryDescriptor::new().with("make", make).with("page", page)
}

// ---- query keys ----

#[test]
fn derive_key_ignores_absent_fields() {
    let a = QueryDescriptor::new()
        .with("make", "BMW")
        .with("model", None::<&str>)
        .with("page", 1);
    let b = QueryDescriptor::new().with("page", 1).with("make", "BMW");
    assert_eq!(derive_key(&a), derive_key(&b));
    assert!(a.is_equivalent(&b));
}

#[test]
fn derive_key_ignores_empty_text_and_non_finite_numbers() {
    let a = QueryDescriptor::new()
        .with("make", "Audi")
        .with("q", "")
        .with("price_max", f64::NAN)
        .with("km_max", FilterValue::Absent);
    assert_eq!(derive_key(&a), "make=\"Audi\"");
}

#[test]
fn derive_key_is_order_independent_for_permutations() {
    let fields: Vec<(&str, FilterValue)> = vec![
        ("make", "Mercedes".into()),
        ("model", "C-Class".into()),
        ("year_min", 2018.into()),
        ("price_max", 45_000.5.into()),
        ("fuel", "diesel".into()),
        ("automatic", true.into()),
        ("page", 3.into()),
    ];
    let expected = derive_key(&fields.iter().cloned().collect());

    let mut rng = Lcg::new(7);
    for _ in 0..50 {
        let mut shuffled = fields.clone();
        rng.shuffle(&mut shuffled);
        let d: QueryDescriptor = shuffled.into_iter().collect();
        assert_eq!(derive_key(&d), expected);
    }
}

#[test]
fn derive_key_distinguishes_text_from_number() {
    let text = QueryDescriptor::new().with("page", "1");
    let num = QueryDescriptor::new().with("page", 1);
    assert_ne!(derive_key(&text), derive_key(&num));
}

#[test]
fn derive_key_treats_whole_floats_like_integers() {
    let f = QueryDescriptor::new().with("page", 2.0);
    let i = QueryDescriptor::new().with("page", 2);
    assert_eq!(derive_key(&f), derive_key(&i));

    let neg_zero = QueryDescriptor::new().with("offset", -0.0);
    let zero = QueryDescriptor::new().with("offset", 0);
    assert_eq!(derive_key(&neg_zero), derive_key(&zero));
}

#[test]
fn derive_key_escapes_separators() {
    let a = QueryDescriptor::new().with("q", "a&b=c");
    let b = QueryDescriptor::new().with("q", "a").with("b", "c");
    assert_ne!(derive_key(&a), derive_key(&b));
    assert_eq!(derive_key(&a), "q=\"a%26b%3Dc\"");
}

#[test]
fn empty_descriptor_derives_empty_key() {
    assert_eq!(derive_key(&QueryDescriptor::new()), "");
    let blanks = QueryDescriptor::new().with("make", "").with("model", FilterValue::Absent);
    assert_eq!(derive_key(&blanks), "");
}

#[test]
fn page_helpers() {
    let d = QueryDescriptor::new().with("make", "BMW");
    assert_eq!(d.page(), 1);
    let d = d.with_page(4);
    assert_eq!(d.page(), 4);
    assert_eq!(d.clone().without_page().page(), 1);
    assert_eq!(QueryDescriptor::new().with("page", "x").page(), 1);
    assert_eq!(QueryDescriptor::new().with("page", 0).page(), 1);
}

// ---- result cache ----

#[test]
fn cache_miss_then_hit() {
    let mut cache = ResultCache::<u32>::default();
    let d = desc("BMW", 1);
    assert!(cache.get(&d, 0).is_none());

    cache.set(&d, vec![1, 2, 3], 30, 10);
    let page = cache.get(&d, 20).unwrap();
    assert_eq!(&*page.items, &[1, 2, 3]);
    assert_eq!(page.total_count, 30);
    assert_eq!(page.created_at_ms, 10);
    assert_eq!(page.age_ms(20), 10);

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.inserts, 1);
}

#[test]
fn cache_hit_is_shared_by_equivalent_descriptors() {
    let mut cache = ResultCache::<&'static str>::default();
    let stored = QueryDescriptor::new()
        .with("make", "BMW")
        .with("model", None::<&str>)
        .with("page", 1);
    cache.set(&stored, vec!["x5"], 1, 0);

    let lookup = QueryDescriptor::new().with("page", 1).with("make", "BMW");
    assert_eq!(&*cache.get(&lookup, 1).unwrap().items, &["x5"]);
}

#[test]
fn capacity_two_evicts_oldest() {
    let opts = CacheOptions::default().with_capacity(2).with_ttl_ms(1000);
    let mut cache = ResultCache::<u8>::new(opts);
    let (a, b, c) = (desc("A", 1), desc("B", 1), desc("C", 1));

    cache.set(&a, vec![1], 1, 0);
    cache.set(&b, vec![2], 1, 100);
    cache.set(&c, vec![3], 1, 200);

    assert_eq!(cache.len(), 2);
    assert!(cache.get(&a, 250).is_none());
    assert!(cache.get(&b, 250).is_some());
    assert!(cache.get(&c, 250).is_some());
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn overwrite_at_capacity_does_not_evict() {
    let opts = CacheOptions::default().with_capacity(2);
    let mut cache = ResultCache::<u8>::new(opts);
    let (a, b) = (desc("A", 1), desc("B", 1));
    cache.set(&a, vec![1], 1, 0);
    cache.set(&b, vec![2], 1, 10);

    cache.set(&a, vec![9, 9], 2, 20);
    assert_eq!(cache.len(), 2);
    assert_eq!(&*cache.get(&a, 21).unwrap().items, &[9, 9]);
    assert!(cache.get(&b, 21).is_some());
    assert_eq!(cache.stats().evictions, 0);
    assert_eq!(cache.stats().updates, 1);

    // `a` is now the newest; inserting a third key evicts `b`.
    cache.set(&desc("C", 1), vec![3], 1, 30);
    assert!(cache.get(&b, 31).is_none());
    assert!(cache.get(&a, 31).is_some());
}

#[test]
fn equal_timestamps_evict_in_insertion_order() {
    let mut cache = ResultCache::<u8>::new(CacheOptions::default().with_capacity(2));
    cache.set(&desc("A", 1), vec![], 0, 5);
    cache.set(&desc("B", 1), vec![], 0, 5);
    cache.set(&desc("C", 1), vec![], 0, 5);
    assert_eq!(
        cache.keys_by_age(),
        vec![desc("B", 1).key(), desc("C", 1).key()]
    );
}

#[test]
fn survivors_are_the_most_recent_n_entries() {
    let mut rng = Lcg::new(42);
    for capacity in [1usize, 2, 3, 5, 8] {
        let mut cache = ResultCache::<usize>::new(
            CacheOptions::default()
                .with_capacity(capacity)
                .with_ttl_ms(u64::MAX),
        );
        // Model: key -> last write time, in write order.
        let mut model: Vec<(String, u64)> = Vec::new();
        let mut now = 0u64;
        for _ in 0..200 {
            now += rng.gen_range_usize(0, 3) as u64;
            let make = rng.gen_range_usize(0, 12);
            let d = desc(&std::format!("make-{make}"), 1);
            let key = d.key();
            cache.set(&d, vec![make], 1, now);

            model.retain(|(k, _)| *k != key);
            model.push((key, now));
            if model.len() > capacity {
                model.remove(0);
            }

            assert!(cache.len() <= capacity);
            let expected: Vec<String> = model.iter().map(|(k, _)| k.clone()).collect();
            assert_eq!(cache.keys_by_age(), expected);
        }
    }
}

#[test]
fn expired_entry_is_absent_and_purged() {
    let mut cache = ResultCache::<u8>::new(CacheOptions::default().with_ttl_ms(1000));
    let d = desc("BMW", 1);
    cache.set(&d, vec![1], 1, 0);

    assert!(cache.get(&d, 999).is_some());
    assert!(cache.contains_key(&d.key(), 999));
    assert!(!cache.contains_key(&d.key(), 1000));
    // Not purged by `contains_key`.
    assert_eq!(cache.len(), 1);

    assert!(cache.get(&d, 1000).is_none());
    assert_eq!(cache.len(), 0);
    assert!(cache.get(&d, 1001).is_none());
    assert_eq!(cache.stats().expired, 1);
}

#[test]
fn refreshed_entry_is_served_after_old_one_expires() {
    let mut cache = ResultCache::<u8>::new(CacheOptions::default().with_ttl_ms(100));
    let d = desc("BMW", 1);
    cache.set(&d, vec![1], 1, 0);
    assert!(cache.get(&d, 150).is_none());
    cache.set(&d, vec![2], 1, 150);
    assert_eq!(&*cache.get(&d, 200).unwrap().items, &[2]);
}

#[test]
fn clear_expired_removes_only_stale_entries() {
    let mut cache = ResultCache::<u8>::new(CacheOptions::default().with_ttl_ms(100));
    cache.set(&desc("A", 1), vec![], 0, 0);
    cache.set(&desc("B", 1), vec![], 0, 50);
    cache.set(&desc("C", 1), vec![], 0, 90);

    assert_eq!(cache.clear_expired(150), 2);
    assert_eq!(cache.len(), 1);
    assert!(cache.get(&desc("C", 1), 150).is_some());
    assert_eq!(cache.clear_expired(150), 0);
}

#[test]
fn clear_empties_but_keeps_stats() {
    let mut cache = ResultCache::<u8>::default();
    cache.set(&desc("A", 1), vec![], 0, 0);
    let _ = cache.get(&desc("A", 1), 1);
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.stats().hits, 1);
    cache.reset_stats();
    assert_eq!(cache.stats(), CacheStats::default());
}

#[test]
fn zero_capacity_stores_nothing() {
    let mut cache = ResultCache::<u8>::new(CacheOptions::default().with_capacity(0));
    cache.set(&desc("A", 1), vec![1], 1, 0);
    assert!(cache.is_empty());
    assert!(cache.get(&desc("A", 1), 0).is_none());
}

#[test]
fn default_options() {
    let opts = CacheOptions::default();
    assert_eq!(opts.capacity, 50);
    assert_eq!(opts.ttl_ms, 300_000);
}

// ---- activation ----

fn root() -> Bounds {
    Bounds::new(0, 0, 1000, 800)
}

#[test]
fn intersection_ratio_basics() {
    let r = root();
    assert_eq!(intersection_ratio(r, Bounds::new(0, 0, 100, 100)), Some(1.0));
    assert_eq!(intersection_ratio(r, Bounds::new(0, 750, 100, 100)), Some(0.5));
    assert_eq!(intersection_ratio(r, Bounds::new(0, 800, 100, 100)), Some(0.0));
    assert_eq!(intersection_ratio(r, Bounds::new(0, 801, 100, 100)), None);
    assert_eq!(intersection_ratio(r, Bounds::new(10, 10, 0, 0)), Some(1.0));
}

#[test]
fn root_margin_pre_triggers() {
    let below = Bounds::new(0, 900, 100, 10);
    let plain = ObserveOptions::default();
    assert!(!is_intersecting(root(), below, &plain));
    let early = ObserveOptions::default().with_root_margin(RootMargin::vertical(200));
    assert!(is_intersecting(root(), below, &early));

    let shrunk = ObserveOptions::default().with_root_margin(RootMargin::all(-100));
    assert!(!is_intersecting(root(), Bounds::new(0, 0, 50, 50), &shrunk));
    assert_eq!(
        expand_root(Bounds::new(0, 0, 100, 100), RootMargin::all(-80)),
        Bounds::new(80, 80, 0, 0)
    );
}

#[test]
fn threshold_requires_visible_fraction() {
    let half = Bounds::new(0, 750, 100, 100);
    assert!(is_intersecting(root(), half, &ObserveOptions::default().with_threshold(0.5)));
    assert!(!is_intersecting(root(), half, &ObserveOptions::default().with_threshold(0.6)));
    // Out-of-range thresholds are clamped.
    assert!(is_intersecting(
        root(),
        Bounds::new(0, 0, 10, 10),
        &ObserveOptions::default().with_threshold(3.0)
    ));
}

#[test]
fn continuous_mode_reports_both_transitions() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let mut tracker = ActivationTracker::<&'static str>::new();
    let id = tracker
        .subscribe(Some("card"), ObserveOptions::default(), move |_, s| {
            sink.lock().unwrap().push(s.is_intersecting);
        })
        .unwrap();

    let mut y = 1000i64;
    let mut geometry = |_: &&str| Some(Bounds::new(0, y, 100, 100));
    assert_eq!(tracker.evaluate(root(), &mut geometry), 0);

    y = 500;
    let mut geometry = |_: &&str| Some(Bounds::new(0, y, 100, 100));
    assert_eq!(tracker.evaluate(root(), &mut geometry), 1);
    // No change, no report.
    assert_eq!(tracker.evaluate(root(), &mut geometry), 0);

    y = -500;
    let mut geometry = |_: &&str| Some(Bounds::new(0, y, 100, 100));
    assert_eq!(tracker.evaluate(root(), &mut geometry), 1);

    assert_eq!(*events.lock().unwrap(), vec![true, false]);
    assert!(tracker.is_watching(id));
    assert_eq!(tracker.state(id), Some(ActivationState::default()));
}

#[test]
fn one_shot_fires_once_and_stays_triggered() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let mut tracker = ActivationTracker::<u32>::new();
    let id = tracker
        .subscribe(
            Some(7),
            ObserveOptions::default().with_trigger_once(true),
            move |_, s| {
                assert!(s.is_intersecting && s.has_triggered);
                c.fetch_add(1, Ordering::SeqCst);
            },
        )
        .unwrap();

    let visible = |_: &u32| Some(Bounds::new(0, 10, 10, 10));
    let hidden = |_: &u32| Some(Bounds::new(0, 5000, 10, 10));
    tracker.evaluate(root(), visible);
    tracker.evaluate(root(), hidden);
    tracker.evaluate(root(), visible);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!tracker.is_watching(id));
    let state = tracker.state(id).unwrap();
    assert!(state.has_triggered);
    assert!(state.is_intersecting);
}

#[test]
fn observe_without_region_is_noop() {
    let mut tracker = ActivationTracker::<u32>::new();
    assert!(tracker.observe(None, ObserveOptions::default()).is_none());
    assert!(
        tracker
            .subscribe(None, ObserveOptions::default(), |_, _| panic!("must not fire"))
            .is_none()
    );
    assert!(tracker.is_empty());
}

#[test]
fn unobserve_stops_reports() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let mut tracker = ActivationTracker::<u32>::new();
    let id = tracker
        .subscribe(Some(1), ObserveOptions::default(), move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    assert!(tracker.unobserve(id));
    assert!(!tracker.unobserve(id));
    tracker.evaluate(root(), |_| Some(Bounds::new(0, 0, 10, 10)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(tracker.state(id).is_none());
}

#[test]
fn unmounted_region_is_torn_down_silently() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let mut tracker = ActivationTracker::<u32>::new();
    let gone = tracker
        .subscribe(Some(1), ObserveOptions::default(), move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    let kept = tracker.observe(Some(2), ObserveOptions::default()).unwrap();

    tracker.evaluate(root(), |r| (*r == 2).then(|| Bounds::new(0, 0, 10, 10)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(tracker.state(gone).is_none());
    assert!(tracker.state(kept).unwrap().is_intersecting);

    assert_eq!(tracker.unobserve_region(&2), 1);
    assert!(tracker.is_empty());
}

#[test]
fn transitions_are_delivered_in_observation_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let mut tracker = ActivationTracker::<u32>::new();
    for region in [3u32, 1, 2] {
        let o = Arc::clone(&order);
        tracker.subscribe(Some(region), ObserveOptions::default(), move |_, _| {
            o.lock().unwrap().push(region);
        });
    }
    tracker.evaluate(root(), |_| Some(Bounds::new(0, 0, 10, 10)));
    assert_eq!(*order.lock().unwrap(), vec![3, 1, 2]);
}

#[test]
fn lazy_mount_mounts_once() {
    let mut m = LazyMount::new();
    assert!(!m.on_activation(ActivationState::default()));
    assert!(!m.is_mounted());
    let hit = ActivationState {
        is_intersecting: true,
        has_triggered: true,
    };
    assert!(m.on_activation(hit));
    assert!(!m.on_activation(hit));
    assert!(!m.on_activation(ActivationState::default()));
    assert!(m.is_mounted());
}

#[test]
fn lazy_resource_requests_once_and_records_failure() {
    let mut r = LazyResource::<&'static str, &'static str>::new();
    assert!(!r.on_activation(ActivationState::default()));
    let hit = ActivationState {
        is_intersecting: true,
        has_triggered: false,
    };
    assert!(r.on_activation(hit));
    assert!(r.is_loading());
    assert!(!r.on_activation(hit));

    r.resolve(Err("404"));
    assert_eq!(r.error(), Some(&"404"));
    assert!(r.value().is_none());
    // No retry on its own.
    assert!(!r.on_activation(hit));

    r.reset();
    assert!(r.on_activation(hit));
    r.resolve(Ok("img"));
    assert_eq!(r.phase(), &LoadPhase::Ready("img"));
    // Late results are ignored.
    r.resolve(Err("late"));
    assert_eq!(r.value(), Some(&"img"));
}

// ---- list window ----

fn items(n: usize) -> Vec<usize> {
    (0..n).collect()
}

#[test]
fn compute_visible_is_a_pure_slice() {
    let data = items(40);
    let w = VisibleWindow::new(12, 24);
    let a = compute_visible(&data, w);
    let b = compute_visible(&data, w);
    assert_eq!(a, b);
    assert_eq!(a, &data[12..24]);
    assert_eq!(w, VisibleWindow::new(12, 24));

    assert_eq!(compute_visible(&data, VisibleWindow::new(35, 60)), &data[35..40]);
    assert!(compute_visible(&data, VisibleWindow::new(50, 60)).is_empty());
}

#[test]
fn initial_window_is_first_step() {
    let w = ListWindow::new(ListWindowOptions::new(40));
    assert_eq!(w.window(), VisibleWindow::new(0, 12));
    let w = ListWindow::new(ListWindowOptions::new(5));
    assert_eq!(w.window(), VisibleWindow::new(0, 5));
    let w = ListWindow::new(ListWindowOptions::new(0));
    assert!(w.window().is_empty());
}

#[test]
fn scroll_maps_to_window() {
    let data = items(40);
    let mut w = ListWindow::new(
        ListWindowOptions::new(40)
            .with_items_per_page(12)
            .with_item_heights(400, 200),
    );
    // start index 12 in grid layout.
    let win = w.on_scroll(12 * 400, 800, 40 * 400);
    assert_eq!(win, VisibleWindow::new(12, 24));
    assert_eq!(w.visible(&data), &data[12..24]);

    let win = w.on_scroll(35 * 400 + 399, 800, 40 * 400);
    assert_eq!(win, VisibleWindow::new(35, 40));

    let win = w.on_scroll(10_000_000, 800, 40 * 400);
    assert_eq!(win, VisibleWindow::new(40, 40));
}

#[test]
fn window_invariant_holds_under_random_events() {
    let mut rng = Lcg::new(99);
    let mut w = ListWindow::new(ListWindowOptions::new(0).with_items_per_page(7));
    for _ in 0..2000 {
        match rng.gen_range_usize(0, 5) {
            0 => w.append(rng.gen_range_usize(0, 20)),
            1 => {
                w.on_scroll(rng.next_u64() % 50_000, 800, 60_000);
            }
            2 => w.set_layout(if rng.gen_bool() {
                LayoutMode::Grid
            } else {
                LayoutMode::List
            }),
            3 => w.set_len(rng.gen_range_usize(0, 100)),
            _ => w.reset(rng.gen_range_usize(0, 100)),
        }
        let win = w.window();
        assert!(win.start <= win.end);
        assert!(win.end <= w.len());
        assert!(win.len() <= 7);
    }
}

#[test]
fn layout_switch_keeps_window() {
    let mut w = ListWindow::new(ListWindowOptions::new(100).with_item_heights(400, 100));
    w.on_scroll(4000, 800, 40_000);
    assert_eq!(w.window(), VisibleWindow::new(10, 22));

    w.set_layout(LayoutMode::List);
    assert_eq!(w.item_height(), 100);
    assert_eq!(w.window(), VisibleWindow::new(10, 22));

    // Same offset now maps to a different row.
    w.on_scroll(4000, 800, 40_000);
    assert_eq!(w.window(), VisibleWindow::new(40, 52));
}

#[test]
fn append_extends_short_window_and_clears_latch() {
    let mut w = ListWindow::new(ListWindowOptions::new(5));
    w.set_has_more(true);
    assert!(w.on_tail_activation().unwrap().is_requested());
    assert!(w.is_load_pending());

    w.append(12);
    assert_eq!(w.len(), 17);
    assert_eq!(w.window(), VisibleWindow::new(0, 12));
    assert!(!w.is_load_pending());
}

#[test]
fn rapid_tail_activations_request_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let mut w = ListWindow::new(ListWindowOptions::new(24).with_on_load_more(move |req| {
        assert_eq!(req.offset, 24);
        c.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }));
    w.set_has_more(true);

    assert_eq!(
        w.on_tail_activation(),
        Ok(TailActivation::Requested(LoadRequest { offset: 24 }))
    );
    w.set_loading(true);
    for _ in 0..10 {
        assert_eq!(
            w.on_tail_activation(),
            Ok(TailActivation::Skipped(SkipReason::Loading))
        );
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    w.set_loading(false);
    assert!(w.on_tail_activation().unwrap().is_requested());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn pending_latch_covers_gap_before_loading_is_reported() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let mut w = ListWindow::new(ListWindowOptions::new(12).with_on_load_more(move |_| {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }));
    w.set_has_more(true);
    let hit = ActivationState {
        is_intersecting: true,
        has_triggered: false,
    };
    for _ in 0..5 {
        let _ = w.on_sentinel(hit);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        w.on_sentinel(hit),
        Ok(TailActivation::Skipped(SkipReason::Pending))
    );
    // A redundant `false` does not clear the latch.
    w.set_loading(false);
    assert_eq!(
        w.on_sentinel(hit),
        Ok(TailActivation::Skipped(SkipReason::Pending))
    );
    w.clear_pending();
    assert!(w.on_sentinel(hit).unwrap().is_requested());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn no_more_means_no_load() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let mut w = ListWindow::new(ListWindowOptions::new(40).with_on_load_more(move |_| {
        c.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }));
    w.set_has_more(false);
    let hit = ActivationState {
        is_intersecting: true,
        has_triggered: false,
    };
    assert_eq!(
        w.on_sentinel(hit),
        Ok(TailActivation::Skipped(SkipReason::NoMore))
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn non_intersecting_sentinel_is_ignored() {
    let mut w = ListWindow::new(ListWindowOptions::new(40));
    w.set_has_more(true);
    assert_eq!(
        w.on_sentinel(ActivationState::default()),
        Ok(TailActivation::Skipped(SkipReason::NotIntersecting))
    );
    assert!(!w.is_load_pending());
}

#[test]
fn load_more_failure_is_returned_without_retry() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let mut w = ListWindow::new(ListWindowOptions::new(12).with_on_load_more(move |_| {
        c.fetch_add(1, Ordering::SeqCst);
        Err(LoadMoreError::new("offline"))
    }));
    w.set_has_more(true);

    let err = w.on_tail_activation().unwrap_err();
    assert_eq!(err.reason(), "offline");
    assert_eq!(std::format!("{err}"), "load more failed: offline");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!w.is_load_pending());
    assert!(w.has_more());
    assert!(!w.is_loading());
}

#[test]
fn handle_scroll_triggers_tail_near_bottom() {
    let mut w = ListWindow::new(
        ListWindowOptions::new(24)
            .with_item_heights(100, 100)
            .with_tail_threshold(200),
    );
    w.set_has_more(true);

    let far = w.handle_scroll(0, 800, 2400);
    assert!(far.tail.is_none());

    let near = w.handle_scroll(1400, 800, 2400);
    assert_eq!(near.window, VisibleWindow::new(14, 24));
    assert_eq!(
        near.tail,
        Some(Ok(TailActivation::Requested(LoadRequest { offset: 24 })))
    );

    let again = w.handle_scroll(1500, 800, 2400);
    assert_eq!(again.tail, Some(Ok(TailActivation::Skipped(SkipReason::Pending))));

    assert!(!w.is_near_tail(0, 800, 0));
}

#[test]
fn on_change_fires_on_window_changes_only() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    let mut w = ListWindow::new(
        ListWindowOptions::new(40)
            .with_item_heights(100, 100)
            .with_on_change(move |win| s.lock().unwrap().push(win)),
    );
    w.on_scroll(0, 800, 4000);
    w.on_scroll(50, 800, 4000);
    w.on_scroll(1200, 800, 4000);
    w.set_layout(LayoutMode::List);
    assert_eq!(*seen.lock().unwrap(), vec![VisibleWindow::new(12, 24)]);
}

#[test]
fn reset_returns_to_first_step() {
    let mut w = ListWindow::new(ListWindowOptions::new(40).with_item_heights(100, 100));
    w.set_has_more(true);
    w.on_scroll(2000, 800, 4000);
    let _ = w.on_tail_activation();
    w.reset(8);
    assert_eq!(w.window(), VisibleWindow::new(0, 8));
    assert!(!w.is_load_pending());
    assert_eq!(w.last_scroll_top(), 0);
}

#[test]
fn snapshot_restore_round_trip_is_clamped() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let mut w = ListWindow::new(
        ListWindowOptions::new(100)
            .with_item_heights(100, 100)
            .with_on_change(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            }),
    );
    w.set_has_more(true);
    w.set_layout(LayoutMode::List);
    w.on_scroll(5000, 800, 10_000);
    let snap = w.snapshot();
    assert_eq!(snap.window, VisibleWindow::new(50, 62));

    let mut fresh = ListWindow::new(ListWindowOptions::new(55));
    fresh.restore(snap);
    assert_eq!(fresh.window(), VisibleWindow::new(50, 55));
    assert_eq!(fresh.layout(), LayoutMode::List);
    assert!(fresh.has_more());

    calls.store(0, Ordering::SeqCst);
    w.restore(ListSnapshot {
        window: VisibleWindow::new(0, 12),
        layout: LayoutMode::Grid,
        has_more: false,
    });
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn items_per_page_is_at_least_one() {
    let mut w = ListWindow::new(ListWindowOptions::new(10).with_items_per_page(0));
    assert_eq!(w.items_per_page(), 1);
    assert_eq!(w.window(), VisibleWindow::new(0, 1));
    w.set_items_per_page(4);
    assert_eq!(w.window(), VisibleWindow::new(0, 4));
}
