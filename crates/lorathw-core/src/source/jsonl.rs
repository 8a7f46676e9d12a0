use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{SourceError, UplinkEvent, UplinkSource};

/// Reads one uplink JSON object per line, skipping blank lines.
///
/// # Examples
/// ```
/// use std::io::Cursor;
///
/// use lorathw_core::{JsonLinesSource, UplinkSource};
///
/// let mut source = JsonLinesSource::new(Cursor::new("\n{\"dev_id\":\"a\"}\n"));
/// let event = source.next_uplink()?.expect("one record");
/// assert_eq!(event.line, 2);
/// assert!(source.next_uplink()?.is_none());
/// # Ok::<(), lorathw_core::SourceError>(())
/// ```
pub struct JsonLinesSource<R = BufReader<File>> {
    reader: R,
    line: usize,
}

impl JsonLinesSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, line: 0 }
    }
}

impl<R: BufRead> UplinkSource for JsonLinesSource<R> {
    fn next_uplink(&mut self) -> Result<Option<UplinkEvent>, SourceError> {
        let mut buf = String::new();
        loop {
            buf.clear();
            if self.reader.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let text = buf.trim();
            if text.is_empty() {
                continue;
            }
            return Ok(Some(UplinkEvent {
                line: self.line,
                text: text.to_string(),
            }));
        }
    }
}
