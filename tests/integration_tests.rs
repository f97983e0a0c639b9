use csv::Trim;
use serde::Deserialize;
use std::time::Duration;
use std::{fs, path::PathBuf, process::Command};

use txn_watch::engine::{
    AccountSnapshot, Amount, RawAccountSummary, RawTransactionRow, Report, Transaction,
};
use txn_watch::feed::{AccountFeed, FetchError};
use txn_watch::notify::{Notifier, NotifyError};
use txn_watch::poll::{Backoff, Clock, CycleOutcome, PollSettings, Poller};
use txn_watch::store::StateStore;

#[derive(Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct ReportRow {
    kind: String,
    date: String,
    name: String,
    description: String,
    amount: String,
}

fn read_rows(data: &[u8]) -> Vec<ReportRow> {
    let mut rdr = csv::ReaderBuilder::new().trim(Trim::All).from_reader(data);
    let mut rows: Vec<ReportRow> = rdr.deserialize::<ReportRow>().map(|r| r.unwrap()).collect();
    // Sorting to avoid issues with order
    rows.sort();
    rows
}

#[test]
fn test_integration() {
    let files_dir = PathBuf::from("./tests/files");

    for entry in fs::read_dir(&files_dir)
        .expect("cannot read files_dir")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
    {
        let case_dir = entry.path();
        let expected_output_path = case_dir.join("output.csv");
        assert!(expected_output_path.exists());

        let state_dir = tempfile::tempdir().unwrap();
        let state_file = state_dir.path().join("transactions.json");
        let seed = case_dir.join("state.json");
        if seed.exists() {
            fs::copy(&seed, &state_file).unwrap();
        }

        let output = Command::new(env!("CARGO_BIN_EXE_txn_watch"))
            .arg("--once")
            .arg("--feed-dir")
            .arg(&case_dir)
            .arg("--state-file")
            .arg(&state_file)
            .output()
            .expect("failed to execute txn_watch");

        assert!(output.status.success(), "{case_dir:?} failed");

        let generated = read_rows(&output.stdout);
        let expected = read_rows(&fs::read(&expected_output_path).unwrap());
        assert_eq!(generated, expected, "{case_dir:?}");

        // A finished cycle never leaves a backup behind
        assert!(!state_dir.path().join("transactions.json.bak").exists());
        assert!(state_file.exists());
    }
}

#[test]
fn test_binary_fails_without_feed_dir() {
    let output = Command::new(env!("CARGO_BIN_EXE_txn_watch"))
        .arg("--once")
        .output()
        .expect("failed to execute txn_watch");
    assert!(!output.status.success());
}

/// Feed serving whatever the test puts in it
#[derive(Default)]
struct MemoryFeed {
    summary: Option<RawAccountSummary>,
    pending: Vec<RawTransactionRow>,
    settled: Vec<RawTransactionRow>,
}

impl MemoryFeed {
    fn with_balance(balance: &str) -> Self {
        MemoryFeed {
            summary: Some(RawAccountSummary {
                current_balance: balance.into(),
                available_credit: "$400.00".into(),
                credit_limit: "$500.00".into(),
            }),
            ..Default::default()
        }
    }
}

impl AccountFeed for MemoryFeed {
    fn fetch_account_summary(&mut self) -> Result<RawAccountSummary, FetchError> {
        self.summary.clone().ok_or(FetchError::MissingSummary)
    }

    fn fetch_pending(&mut self) -> Result<Vec<RawTransactionRow>, FetchError> {
        Ok(self.pending.clone())
    }

    fn fetch_settled_window(
        &mut self,
        _cap: usize,
        _watermark: Option<&Transaction>,
    ) -> Result<Vec<RawTransactionRow>, FetchError> {
        Ok(self.settled.clone())
    }
}

#[derive(Default)]
struct KeepingNotifier {
    reports: Vec<Report>,
}

impl Notifier for KeepingNotifier {
    fn notify(&mut self, report: &Report) -> Result<(), NotifyError> {
        self.reports.push(report.clone());
        Ok(())
    }
}

#[derive(Default)]
struct NoSleep {
    sleeps: Vec<Duration>,
}

impl Clock for NoSleep {
    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
    }
}

fn coffee_row() -> RawTransactionRow {
    RawTransactionRow {
        date: "2024-01-01".into(),
        card_name: "J".into(),
        description: "Coffee".into(),
        amount: "$4.50".into(),
    }
}

fn poller(store: StateStore, feed: MemoryFeed) -> Poller<MemoryFeed, KeepingNotifier, NoSleep> {
    Poller::new(
        feed,
        KeepingNotifier::default(),
        NoSleep::default(),
        store,
        Backoff::default(),
        PollSettings::default(),
    )
}

#[test]
fn test_crash_after_backup_resumes_from_pre_cycle_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transactions.json");

    let mut feed = MemoryFeed::with_balance("$100.00");
    feed.pending = vec![coffee_row()];
    let mut first = poller(StateStore::new(&path), feed);
    assert_eq!(first.run_cycle().unwrap(), CycleOutcome::Reported);
    let committed = StateStore::new(&path).load().unwrap();

    // Next cycle backs up, starts writing, and the process dies
    let store = StateStore::new(&path);
    store.backup().unwrap();
    fs::write(&path, "{\"pending\": [{\"date\": \"2024-").unwrap();

    // Fresh process with the same upstream state: nothing new to report
    let mut feed = MemoryFeed::with_balance("$100.00");
    feed.pending = vec![coffee_row()];
    let mut restarted = poller(StateStore::new(&path), feed);
    assert_eq!(restarted.run_cycle().unwrap(), CycleOutcome::Quiet);
    assert!(restarted.notifier().reports.is_empty());
    assert_eq!(restarted.store().load().unwrap(), committed);
    assert!(!restarted.store().has_backup());
}

#[test]
fn test_cleared_pending_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("transactions.json"));
    store
        .commit(&AccountSnapshot {
            available_credit: Some(Amount::from_cents(40000)),
            current_balance: Some(Amount::from_cents(10000)),
            pending: vec![coffee_row().to_transaction().unwrap()],
            processed: vec![],
        })
        .unwrap();

    let mut poller = poller(store, MemoryFeed::with_balance("$100.00"));
    assert_eq!(poller.run_cycle().unwrap(), CycleOutcome::Reported);

    let report = &poller.notifier().reports[0];
    assert_eq!(report.diff.new_pending().count(), 0);
    let event = &report.diff.events()[0];
    assert_eq!(event.description(), "Coffee - PROCESSED");
    assert!(event.ignore_transaction());
    assert_eq!(report.totals.pending_total, Amount::new());
    assert!(poller.store().load().unwrap().pending.is_empty());
}

#[test]
fn test_balance_change_alone_reports() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("transactions.json"));
    store
        .commit(&AccountSnapshot {
            available_credit: Some(Amount::from_cents(40000)),
            current_balance: Some(Amount::from_cents(10000)),
            ..Default::default()
        })
        .unwrap();

    let mut poller = poller(store, MemoryFeed::with_balance("$150.00"));
    assert_eq!(poller.run_cycle().unwrap(), CycleOutcome::Reported);

    let report = &poller.notifier().reports[0];
    assert!(report.diff.is_empty());
    assert_eq!(report.summary.current_balance, Amount::from_cents(15000));
    assert_eq!(
        poller.store().load().unwrap().current_balance,
        Some(Amount::from_cents(15000))
    );
}

#[test]
fn test_failing_upstream_backs_off_to_ceiling() {
    let dir = tempfile::tempdir().unwrap();
    let mut poller = poller(
        StateStore::new(dir.path().join("transactions.json")),
        MemoryFeed::default(),
    );

    poller.run(Some(13)).unwrap();

    let sleeps = &poller.clock().sleeps;
    assert_eq!(sleeps.len(), 12);
    assert!(sleeps.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(sleeps.last(), Some(&Duration::from_secs(60 * 60)));
    assert!(poller.notifier().reports.is_empty());
}
