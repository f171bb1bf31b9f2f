//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over the rows of a replay input file. The
//! row type decides both the expected columns and the validation applied, so
//! the same reader serves the accounts file and the transfers file.
//!
//! ```no_run
//! use rust_ledger_engine::io::csv_format::TransferRecord;
//! use rust_ledger_engine::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::<TransferRecord>::new(Path::new("transfers.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(request) => println!("transfer {:?}", request),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found) are returned from `new()`
//! - Individual row errors are yielded as `Err` with the line number
//!
//! Rows are read one at a time; the file is never loaded into memory whole.

use crate::io::csv_format::CsvRow;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::marker::PhantomData;
use std::path::Path;

/// Synchronous CSV reader yielding converted rows
#[derive(Debug)]
pub struct SyncReader<R> {
    reader: csv::Reader<File>,
    line_num: usize,
    _row: PhantomData<R>,
}

impl<R: CsvRow> SyncReader<R> {
    /// Open a CSV file with a header row
    ///
    /// Fields are trimmed and the buffer is 8KB.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 1,
            _row: PhantomData,
        })
    }
}

impl<R: CsvRow> Iterator for SyncReader<R> {
    type Item = Result<R::Output, String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<R>();
        let row = deserializer.next()?;
        self.line_num += 1;

        Some(match row {
            Ok(record) => record
                .convert()
                .map_err(|e| format!("Line {}: {}", self.line_num, e)),
            Err(e) => Err(format!("Line {}: CSV parse error: {}", self.line_num, e)),
        })
    }
}
