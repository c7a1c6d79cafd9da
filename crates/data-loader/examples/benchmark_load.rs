use data_loader::DataIndex;
use std::path::Path;
use std::time::Instant;

fn main() {
    let data_dir = Path::new("datasets");

    println!("Loading creative dataset...\n");

    let start = Instant::now();
    let mut index = DataIndex::load_from_files(data_dir)
        .expect("Failed to load dataset");
    let elapsed = start.elapsed();

    let (creatives, events, users) = index.counts();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Creatives: {}", creatives);
    println!("Success events: {}", events);
    println!("Users: {}", users);
    println!("\nPerformance: {:.0} events/second",
             events as f64 / elapsed.as_secs_f64());

    let start = Instant::now();
    index.compute_creative_stats();
    println!("Aggregate recomputation: {:?}", start.elapsed());
}
