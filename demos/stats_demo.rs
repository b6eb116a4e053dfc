use clap::Parser;
use clap::ValueEnum;
use prime_cache::Cache;
use prime_cache::ProbePolicy;
use prime_cache::Record;
use prime_cache::config::MAXID;
use prime_cache::config::MINID;
use prime_cache::hasher::Times33;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Policy {
    Linear,
    Quadratic,
    DoubleHash,
}

impl From<Policy> for ProbePolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Linear => ProbePolicy::Linear,
            Policy::Quadratic => ProbePolicy::Quadratic,
            Policy::DoubleHash => ProbePolicy::DoubleHash,
        }
    }
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "capacity", default_value_t = 101)]
    capacity: usize,

    #[arg(short = 'n', long = "records", default_value_t = 1000)]
    records: u32,

    #[arg(short = 'r', long = "remove_every", default_value_t = 3)]
    remove_every: u32,

    #[arg(short = 'p', long = "policy", value_enum, default_value_t = Policy::DoubleHash)]
    policy: Policy,
}

fn main() {
    let args = Args::parse();
    let records = args.records.min(MAXID - MINID + 1);

    let mut cache = Cache::new(args.capacity, Times33, args.policy.into());
    println!(
        "Created cache with capacity {} ({:?})",
        cache.capacity(),
        cache.probe_policy()
    );

    let mut resizes = 0;
    let mut failures = 0;
    for i in 0..records {
        let was_resizing = cache.is_resizing();
        if cache
            .insert(Record::new(format!("key_{i:08X}"), MINID + i))
            .is_err()
        {
            failures += 1;
        }
        if !was_resizing && cache.is_resizing() {
            resizes += 1;
        }
    }
    println!(
        "Inserted {} records, {} resizes, {} failures",
        cache.len(),
        resizes,
        failures
    );

    if args.remove_every > 0 {
        let mut removed = 0;
        for i in (0..records).step_by(args.remove_every as usize) {
            if cache.remove(&format!("key_{i:08X}"), MINID + i).is_ok() {
                removed += 1;
            }
        }
        println!("Removed {} records", removed);
    }

    println!(
        "Final load factor: {:.2}%, tombstone ratio: {:.2}%",
        cache.load_factor() * 100.0,
        cache.tombstone_ratio() * 100.0
    );

    cache.probe_histogram().print();
    cache.debug_stats().print();
}
