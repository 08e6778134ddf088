// Example: caching inventory search pages by filter selection.
use stockview::{CacheOptions, QueryDescriptor, ResultCache};

fn main() {
    let mut cache = ResultCache::<&'static str>::new(
        CacheOptions::default().with_capacity(2).with_ttl_ms(1_000),
    );

    let bmw = QueryDescriptor::new()
        .with("make", "BMW")
        .with("model", None::<&str>)
        .with("page", 1);
    cache.set(&bmw, vec!["BMW 320d", "BMW X3"], 2, 0);

    // Same filters, different order and no blank field: same entry.
    let again = QueryDescriptor::new().with("page", 1).with("make", "BMW");
    println!("key={}", again.key());
    println!("hit={:?}", cache.get(&again, 500).map(|p| p.items));

    cache.set(&QueryDescriptor::new().with("make", "Audi"), vec!["Audi A4"], 1, 100);
    cache.set(&QueryDescriptor::new().with("make", "VW"), vec!["VW Golf"], 1, 200);
    println!("after eviction: len={} bmw={:?}", cache.len(), cache.get(&bmw, 300).is_some());

    println!("expired purge: removed={}", cache.clear_expired(1_150));
    println!("stats={:?}", cache.stats());
}
