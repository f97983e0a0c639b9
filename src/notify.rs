use serde::Serialize;
use std::io::Write;
use thiserror::Error;

use crate::engine::Report;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Report could not be written: {0}")]
    Csv(#[from] csv::Error),

    #[error("Report could not be flushed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Notification rejected: {0}")]
    Rejected(String),
}

/// Delivers a report to whoever watches the account
pub trait Notifier {
    fn notify(&mut self, report: &Report) -> Result<(), NotifyError>;
}

#[derive(Serialize, Debug)]
struct EventRow<'a> {
    kind: &'static str,
    date: &'a str,
    name: &'a str,
    description: String,
    amount: String,
}

/// Logs balances and totals and writes one CSV row per event
pub struct CsvNotifier<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvNotifier<W> {
    pub fn new(writer: W) -> Self {
        CsvNotifier {
            writer: csv::Writer::from_writer(writer),
        }
    }

    pub fn into_inner(self) -> Result<W, NotifyError> {
        self.writer
            .into_inner()
            .map_err(|e| NotifyError::Io(e.into_error()))
    }
}

impl<W: Write> Notifier for CsvNotifier<W> {
    fn notify(&mut self, report: &Report) -> Result<(), NotifyError> {
        let summary = &report.summary;
        log::info!("Current balance: {}", summary.current_balance);
        log::info!("Available credit: {}", summary.available_credit);
        log::info!("Credit limit: {}", summary.credit_limit);

        let totals = &report.totals;
        if report.diff.new_pending().next().is_some() || report.diff.cleared_pending().next().is_some() {
            log::info!("Pending transactions total: {}", totals.pending_total);
        }
        if totals.over_limit.is_positive() {
            log::warn!("Over limit by: {}", totals.over_limit);
        }
        if report.diff.new_settled().next().is_some() {
            log::info!("New transactions total: {}", totals.settled_total);
        }

        log::debug!("Starting report serialisation");
        for event in report.diff.events() {
            let tx = event.transaction();
            self.writer.serialize(EventRow {
                kind: event.kind().as_str(),
                date: &tx.date,
                name: &tx.card_name,
                description: event.description(),
                amount: tx.amount.to_string(),
            })?;
        }

        log::debug!("Report serialisation done -> Flushing");
        self.writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AccountSummary, Amount, Diff, Transaction, TransactionEvent};

    #[test]
    fn test_that_events_are_written_as_csv_rows() {
        let coffee = Transaction::new("2024-01-01", "J", "Coffee", Amount::from_cents(450));
        let fuel = Transaction::new("2024-01-02", "J", "Fuel", Amount::from_cents(6000));
        let diff = Diff::from_events(vec![
            TransactionEvent::NewPending(fuel),
            TransactionEvent::ClearedPending(coffee),
        ]);
        let summary = AccountSummary {
            current_balance: Amount::from_cents(10000),
            available_credit: Amount::from_cents(50000),
            credit_limit: Amount::from_cents(60000),
        };
        let report = Report::new(summary, diff).unwrap();

        let mut notifier = CsvNotifier::new(Vec::new());
        notifier.notify(&report).unwrap();
        let output = String::from_utf8(notifier.into_inner().unwrap()).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "kind,date,name,description,amount");
        assert_eq!(lines[1], "pending,2024-01-02,J,Fuel,$60.00");
        assert_eq!(lines[2], "cleared,2024-01-01,J,Coffee - PROCESSED,$4.50");
    }
}
