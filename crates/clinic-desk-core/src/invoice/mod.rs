//! Invoice numbering and the printable invoice view.
//!
//! Invoice numbers have the form `DDMMYY-SS`: the clinic-local date followed by
//! a per-day sequence starting at 01. The sequence is kept in a single
//! key-value slot as an [`InvoiceCounter`](crate::models::InvoiceCounter).

mod document;
mod sequence;

pub use document::*;
pub use sequence::*;
