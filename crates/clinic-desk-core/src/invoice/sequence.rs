//! Daily invoice sequence.

use chrono::{DateTime, FixedOffset, NaiveDate};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::models::InvoiceCounter;
use crate::store::KeyValueStore;

/// Store key of the persisted counter.
pub const DEFAULT_COUNTER_KEY: &str = "invoiceCounter";

/// Clinic time zone, UTC+07:00.
pub const CLINIC_UTC_OFFSET_SECS: i32 = 7 * 60 * 60;

/// `YYYY-MM-DD`, the date format stored in the counter.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format `DDMMYY-SS`.
///
/// Sequences of 100 and above widen the suffix to 3+ digits.
pub fn format_invoice_number(date: NaiveDate, sequence: u32) -> String {
    format!("{}-{:02}", date.format("%d%m%y"), sequence)
}

/// Load the counter for `today`, falling back to a zero counter when the slot
/// is empty, unreadable, corrupt or holds a previous day.
pub fn load_counter<S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
    today: NaiveDate,
) -> InvoiceCounter {
    let today = day_key(today);

    let stored = match store.get(key) {
        Ok(Some(json)) => json,
        Ok(None) => {
            debug!(key, "No invoice counter stored");
            return InvoiceCounter::zero(today);
        }
        Err(e) => {
            warn!(key, error = %e, "Invoice counter unreadable, starting from zero");
            return InvoiceCounter::zero(today);
        }
    };

    match InvoiceCounter::from_json(&stored) {
        Ok(counter) if counter.date == today => counter,
        Ok(counter) => {
            info!(stored = %counter.date, %today, "New day, resetting invoice counter");
            InvoiceCounter::zero(today)
        }
        Err(e) => {
            warn!(key, error = %e, "Invoice counter corrupt, starting from zero");
            InvoiceCounter::zero(today)
        }
    }
}

/// Issue the next invoice number for the clinic-local instant `now`.
///
/// The incremented counter is written back before returning. A failed write
/// is logged and the number is still issued.
pub fn next_invoice_number_at<S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: &str,
    now: DateTime<FixedOffset>,
) -> String {
    let today = now.date_naive();
    let current = load_counter(store, key, today);

    let next = InvoiceCounter {
        date: current.date,
        counter: current.counter.saturating_add(1),
    };

    match next.to_json() {
        Ok(json) => {
            if let Err(e) = store.set(key, &json) {
                warn!(key, error = %e, "Failed to persist invoice counter");
            }
        }
        Err(e) => warn!(key, error = %e, "Failed to serialize invoice counter"),
    }

    let number = format_invoice_number(today, next.counter);
    debug!(%number, "Issued invoice number");
    number
}

/// Invoice number generator bound to a clock and the clinic time zone.
#[derive(Debug, Clone)]
pub struct InvoiceSequence<C: Clock> {
    clock: C,
    offset: FixedOffset,
    key: String,
}

impl<C: Clock> InvoiceSequence<C> {
    /// Create a generator using the default store key.
    pub fn new(clock: C, offset: FixedOffset) -> Self {
        Self {
            clock,
            offset,
            key: DEFAULT_COUNTER_KEY.to_string(),
        }
    }

    /// Use a different store key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Current clinic-local time.
    pub fn local_now(&self) -> DateTime<FixedOffset> {
        self.clock.now().with_timezone(&self.offset)
    }

    /// Current clinic-local date.
    pub fn today(&self) -> NaiveDate {
        self.local_now().date_naive()
    }

    /// Issue the next invoice number.
    pub fn next_invoice_number<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> String {
        next_invoice_number_at(store, &self.key, self.local_now())
    }

    /// Today's counter without advancing it.
    pub fn current<S: KeyValueStore + ?Sized>(&self, store: &S) -> InvoiceCounter {
        load_counter(store, &self.key, self.today())
    }
}
