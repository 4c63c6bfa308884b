use clap::Parser;
use strdict::Dict;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// Number of distinct keys to insert.
    #[arg(short = 'n', long = "keys", default_value_t = 1000)]
    keys: usize,

    /// Key prefix; keys are `<prefix><index>`.
    #[arg(short = 'p', long = "prefix", default_value = "sym")]
    prefix: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let args = Args::parse();

    let mut dict = Dict::new();
    println!("Initial capacity: {}", dict.capacity());
    println!("Inserting {} keys...", args.keys);

    for i in 0..args.keys {
        let key = format!("{}{}", args.prefix, i);
        if let Err(err) = dict.insert(&key, i) {
            eprintln!("insert of {key:?} failed: {err}");
        }
    }

    let misses = (0..args.keys)
        .filter(|i| dict.get(&format!("{}{}", args.prefix, i)) != Some(i))
        .count();

    println!("Inserted {} keys", dict.len());
    println!("Lookups that failed to find their key: {misses}");
    println!(
        "Final load factor: {:.2}%",
        (dict.len() as f64 / dict.capacity() as f64) * 100.0
    );

    dict.probe_histogram().print();
    dict.debug_stats().print();
}
