use crate::error::{CourierError, Result};
use serde::de::DeserializeOwned;
use std::io::Read;

/// Reads typed records (rate cards, states, quotes, payments...) from a CSV source.
///
/// Whitespace around fields is trimmed and short rows are tolerated, so
/// trailing optional columns may be left off.
pub struct RecordReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RecordReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes each row; a bad row yields an error without
    /// stopping the iteration.
    pub fn records<T: DeserializeOwned>(self) -> impl Iterator<Item = Result<T>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(CourierError::from))
    }
}
