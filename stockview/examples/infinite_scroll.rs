// Example: a windowed listing that pages in more results from a tail sentinel.
use stockview::{
    ActivationTracker, Bounds, LayoutMode, ListWindow, ListWindowOptions, ObserveOptions,
    RootMargin, TailActivation,
};

const TOTAL: usize = 60;
const ROW: u32 = 100;

fn main() {
    let mut items: Vec<String> = (0..24).map(|i| format!("vehicle-{i}")).collect();
    let mut list = ListWindow::new(
        ListWindowOptions::new(items.len())
            .with_items_per_page(12)
            .with_item_heights(ROW, ROW / 2)
            .with_on_change(|w| println!("window -> {w:?}")),
    );
    list.set_has_more(items.len() < TOTAL);

    let mut tracker = ActivationTracker::<&'static str>::new();
    let sentinel = tracker
        .observe(
            Some("tail-sentinel"),
            ObserveOptions::default().with_root_margin(RootMargin::vertical(200)),
        )
        .expect("sentinel is mounted");

    let viewport = Bounds::new(0, 0, 1200, 800);
    for scroll_top in [0u64, 600, 1200, 1800, 2400, 3600, 4800] {
        list.on_scroll(scroll_top, viewport.height, items.len() as u64 * ROW as u64);

        // Sentinel sits right after the last known item, in content coordinates.
        let sentinel_y = items.len() as i64 * ROW as i64 - scroll_top as i64;
        tracker.evaluate(viewport, |_| Some(Bounds::new(0, sentinel_y, 1200, 1)));
        let state = tracker.state(sentinel).unwrap_or_default();

        if let Ok(TailActivation::Requested(req)) = list.on_sentinel(state) {
            let next: Vec<String> = (req.offset..(req.offset + 12).min(TOTAL))
                .map(|i| format!("vehicle-{i}"))
                .collect();
            println!("loaded {} more at offset {}", next.len(), req.offset);
            items.extend(next);
            list.append(items.len() - req.offset);
            list.set_has_more(items.len() < TOTAL);
        }

        let visible = list.visible(&items);
        println!(
            "scroll_top={scroll_top} visible={}..={}",
            visible.first().map(String::as_str).unwrap_or("-"),
            visible.last().map(String::as_str).unwrap_or("-"),
        );
    }

    list.set_layout(LayoutMode::List);
    println!("list layout keeps window {:?}", list.window());
}
