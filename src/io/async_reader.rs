//! Asynchronous CSV reader with batch interface
//!
//! Reads replay input in batches for the async strategy.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - futures `AsyncRead`, so tokio files plug in through `tokio_util::compat`
//! - Batch reading so a whole batch can be dispatched at once
//!
//! ```text
//! CSV Reader → AsyncReader<_, TransferRecord> → Vec<TransferRequest>
//!                  ↓
//!           csv_format module
//!           (CsvRow::convert)
//! ```

use crate::io::csv_format::CsvRow;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use std::marker::PhantomData;
use tracing::warn;

/// Asynchronous CSV reader
///
/// Malformed rows are logged and skipped; `malformed()` counts them.
pub struct AsyncReader<R: AsyncRead + Unpin, T> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    line_num: usize,
    malformed: usize,
    _row: PhantomData<T>,
}

impl<R, T> AsyncReader<R, T>
where
    R: AsyncRead + Unpin + Send + 'static,
    T: CsvRow + Send + 'static,
{
    /// Create a new AsyncReader over CSV data with a header row
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            line_num: 1,
            malformed: 0,
            _row: PhantomData,
        }
    }

    /// Read up to `batch_size` converted rows
    ///
    /// Returns an empty vector once the input is exhausted.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<T::Output> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<T>();

        while batch.len() < batch_size {
            let row = match records.next().await {
                Some(row) => row,
                None => break,
            };
            self.line_num += 1;

            match row.map_err(|e| format!("CSV parse error: {}", e)).and_then(T::convert) {
                Ok(output) => batch.push(output),
                Err(e) => {
                    self.malformed += 1;
                    warn!(line = self.line_num, error = %e, "skipping malformed row");
                }
            }
        }

        batch
    }

    /// Rows skipped so far because they failed to parse or convert
    pub fn malformed(&self) -> usize {
        self.malformed
    }
}
