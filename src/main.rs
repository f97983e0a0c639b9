use anyhow::Context;
use clap::Parser;
use simple_logger::SimpleLogger;

use txn_watch::config::Args;
use txn_watch::feed::CsvFeed;
use txn_watch::notify::CsvNotifier;
use txn_watch::poll::{Poller, SystemClock};
use txn_watch::store::StateStore;

fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;

    log::debug!("Application started");

    let args = Args::parse();
    log::debug!("Parsed arguments: {args:?}");

    let mut poller = Poller::new(
        CsvFeed::new(&args.feed_dir),
        CsvNotifier::new(std::io::stdout()),
        SystemClock,
        StateStore::new(&args.state_file),
        args.backoff(),
        args.poll_settings(),
    );

    poller
        .run(args.cycle_limit())
        .with_context(|| format!("state in {:?} could not be restored", args.state_file))?;

    log::debug!("Application finished");

    Ok(())
}
