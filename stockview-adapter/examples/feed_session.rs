// Example: one browsing session, one cache, a feed driven by filter changes and scrolling.
use stockview::{CacheOptions, ListWindowOptions, QueryDescriptor, ResultCache};
use stockview_adapter::{FeedController, FeedStep, FetchTicket, FetchedPage};

const PER_PAGE: usize = 12;

// Stand-in for the inventory API.
fn fetch(ticket: &FetchTicket) -> FetchedPage<String> {
    let make = ticket
        .descriptor
        .get("make")
        .and_then(|v| v.as_text())
        .unwrap_or("any")
        .to_string();
    let total = 30usize;
    let start = (ticket.page as usize - 1) * PER_PAGE;
    let items = (start..(start + PER_PAGE).min(total))
        .map(|i| format!("{make} #{i}"))
        .collect();
    FetchedPage::new(items, total as u64)
}

fn drive(
    feed: &mut FeedController<String>,
    cache: &mut ResultCache<String>,
    step: FeedStep,
    now_ms: u64,
) {
    match step {
        FeedStep::Fetch(ticket) => {
            let page = fetch(&ticket);
            match feed.complete(ticket, Ok(page), cache, now_ms) {
                Ok(step) => println!("  completed: {step:?}"),
                Err(err) => println!("  failed: {err}"),
            }
        }
        other => println!("  step: {other:?}"),
    }
}

fn main() {
    let mut cache = ResultCache::new(CacheOptions::default());
    let mut feed = FeedController::new(ListWindowOptions::default().with_item_heights(100, 60));

    println!("query BMW");
    let step = feed.query(QueryDescriptor::new().with("make", "BMW"), &mut cache, 0);
    drive(&mut feed, &mut cache, step, 0);

    println!("scroll to bottom");
    if let Ok(step) = feed.on_scroll(900, 600, 1200, &mut cache, 100) {
        drive(&mut feed, &mut cache, step, 100);
    }

    println!("switch to Audi and back to BMW");
    let step = feed.query(QueryDescriptor::new().with("make", "Audi"), &mut cache, 200);
    drive(&mut feed, &mut cache, step, 200);
    let step = feed.query(QueryDescriptor::new().with("make", "BMW"), &mut cache, 300);
    drive(&mut feed, &mut cache, step, 300);

    println!(
        "known={} visible={:?} cache={:?}",
        feed.items().len(),
        feed.list().window(),
        cache.stats()
    );
}
