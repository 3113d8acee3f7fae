//! CSV readers and writers used by the command-line driver.

pub mod invoice_csv;
pub mod quote_writer;
pub mod record_reader;
