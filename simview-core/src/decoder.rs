//! ## simview-core::decoder
//! **Row decoder for cache simulation event logs**
//!
//! Opens a log (gzip by extension), discards the header and yields one
//! [`DecodedRow`] per data row. Fields are read as raw bytes and never
//! checked for UTF-8. Numeric columns parse permissively: a bad value (invalid
//! UTF-8 included) becomes zero and the row is still emitted. A row the CSV layer cannot
//! produce at all (e.g. a different column count than the header) ends
//! decoding with [`ReplayError::Read`].

use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use csv::ByteRecord;
use flate2::bufread::MultiGzDecoder;
use tracing::{debug, info, trace};

use crate::error::ReplayError;
use crate::events::{Action, CacheOccupancy, Event, Schema, SchemaChoice};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Compression {
    None,
    Gzip,
}

impl Compression {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(OsStr::to_str) {
            Some("gz") | Some("gzip") => Compression::Gzip,
            _ => Compression::None,
        }
    }
}

/// Wraps `file` in a gzip decoder after checking the magic bytes, so a file
/// that is not gzip at all fails at open time rather than on the header read.
fn gzip_reader(file: File) -> io::Result<MultiGzDecoder<BufReader<File>>> {
    let mut reader = BufReader::new(file);
    let head = reader.fill_buf()?;
    if !head.starts_with(&GZIP_MAGIC) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "missing gzip magic bytes",
        ));
    }
    Ok(MultiGzDecoder::new(reader))
}

/// A data row turned into an [`Event`].
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedRow {
    pub event: Event,
    /// Numeric columns that failed to parse and were replaced with zero.
    pub defaulted_fields: usize,
}

struct FieldReader<'a> {
    record: &'a ByteRecord,
    defaulted: usize,
}

impl<'a> FieldReader<'a> {
    fn bytes(&self, index: usize) -> &'a [u8] {
        self.record.get(index).unwrap_or_default()
    }

    fn action(&self, index: usize) -> Action {
        Action::from_label(&String::from_utf8_lossy(self.bytes(index)))
    }

    fn number<T: FromStr + Default>(&mut self, index: usize) -> T {
        let parsed = std::str::from_utf8(self.bytes(index))
            .ok()
            .and_then(|text| text.parse().ok());
        parsed.unwrap_or_else(|| {
            self.defaulted += 1;
            T::default()
        })
    }
}

/// Maps one CSV record onto an [`Event`] using the given column layout.
///
/// The tick column is unsigned, so a negative tick counts as a parse failure
/// and becomes 0.
pub fn parse_record(record: &ByteRecord, schema: Schema) -> DecodedRow {
    let mut fields = FieldReader {
        record,
        defaulted: 0,
    };

    let event = match schema {
        Schema::Basic => Event {
            tick: fields.number(0),
            file_id: fields.number(1),
            size: fields.number(2),
            num_requests: fields.number(3),
            delta_t: fields.number(4),
            action: fields.action(5),
            occupancy: None,
        },
        Schema::Extended => Event {
            tick: fields.number(0),
            action: fields.action(1),
            occupancy: Some(CacheOccupancy {
                size: fields.number(2),
                capacity: fields.number(3),
            }),
            file_id: fields.number(4),
            size: fields.number(5),
            num_requests: fields.number(6),
            delta_t: fields.number(7),
        },
    };

    DecodedRow {
        event,
        defaulted_fields: fields.defaulted,
    }
}

/// Forward-only reader over an event log.
pub struct LogDecoder {
    reader: csv::Reader<Box<dyn Read + Send>>,
    schema: Schema,
    header: ByteRecord,
    record: ByteRecord,
    failed: bool,
}

impl LogDecoder {
    /// Opens `path`, decompressing when the extension is `.gz` or `.gzip`,
    /// and consumes the header line.
    pub fn open<P: AsRef<Path>>(path: P, choice: SchemaChoice) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ReplayError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let compression = Compression::from_path(path);
        let source: Box<dyn Read + Send> = match compression {
            Compression::Gzip => {
                Box::new(
                    gzip_reader(file).map_err(|source| ReplayError::Decompression {
                        path: path.to_path_buf(),
                        source,
                    })?,
                )
            }
            Compression::None => Box::new(file),
        };

        info!(path = %path.display(), ?compression, "Opened event log");
        Self::from_boxed(source, choice)
    }

    /// Builds a decoder over an already decompressed byte source.
    pub fn from_reader<R: Read + Send + 'static>(
        reader: R,
        choice: SchemaChoice,
    ) -> Result<Self, ReplayError> {
        Self::from_boxed(Box::new(reader), choice)
    }

    fn from_boxed(source: Box<dyn Read + Send>, choice: SchemaChoice) -> Result<Self, ReplayError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(false)
            .from_reader(source);

        let mut header = ByteRecord::new();
        if !reader.read_byte_record(&mut header).map_err(ReplayError::Header)? {
            return Err(ReplayError::MissingHeader);
        }

        let schema = choice.resolve(header.len())?;
        debug!(%schema, columns = header.len(), "Discarded event log header");

        Ok(Self {
            reader,
            schema,
            header,
            record: ByteRecord::new(),
            failed: false,
        })
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// The discarded header line. Its contents are never validated.
    pub fn header(&self) -> &ByteRecord {
        &self.header
    }
}

impl Iterator for LogDecoder {
    type Item = Result<DecodedRow, ReplayError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.reader.read_byte_record(&mut self.record) {
            Ok(true) => {
                trace!(record = ?self.record, "Decoded row");
                Some(Ok(parse_record(&self.record, self.schema)))
            }
            Ok(false) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(ReplayError::Read(err)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    use flate2::write::GzEncoder;
    use tempfile::NamedTempFile;

    const BASIC_LOG: &str = "tick,filename,size,num req,delta t,action\n\
                             0,1,1024,1,0,ADD\n\
                             3,1,1024,1,0,DELETE\n";

    fn decode_all(text: &'static str, choice: SchemaChoice) -> Vec<Event> {
        LogDecoder::from_reader(Cursor::new(text), choice)
            .unwrap()
            .map(|row| row.unwrap().event)
            .collect()
    }

    fn write_gzip(text: &str, suffix: &str) -> NamedTempFile {
        let file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        let mut encoder = GzEncoder::new(file.reopen().unwrap(), flate2::Compression::fast());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap();
        file
    }

    #[test]
    fn decodes_basic_rows() {
        let events = decode_all(BASIC_LOG, SchemaChoice::Auto);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].tick, 0);
        assert_eq!(events[0].action, Action::Add);
        assert_eq!(events[0].file_id, 1);
        assert_eq!(events[0].size, 1024.0);
        assert_eq!(events[0].occupancy, None);
        assert_eq!(events[1].tick, 3);
        assert_eq!(events[1].action, Action::Delete);
    }

    #[test]
    fn decodes_extended_rows() {
        let log = "tick,action,cache size,cache capacity,filename,size,num req,delta t\n\
                   5,ADD,2048.5,4096,9,512,3,12\n";
        let events = decode_all(log, SchemaChoice::Auto);
        assert_eq!(
            events,
            vec![Event {
                tick: 5,
                action: Action::Add,
                file_id: 9,
                size: 512.0,
                num_requests: 3,
                delta_t: 12,
                occupancy: Some(CacheOccupancy {
                    size: 2048.5,
                    capacity: 4096.0,
                }),
            }]
        );
    }

    #[test]
    fn bad_numbers_default_to_zero() {
        let record = ByteRecord::from(vec!["0", "1", "notanumber", "1", "0", "ADD"]);
        let row = parse_record(&record, Schema::Basic);
        assert_eq!(row.event.size, 0.0);
        assert_eq!(row.event.file_id, 1);
        assert_eq!(row.defaulted_fields, 1);
    }

    #[test]
    fn negative_tick_becomes_zero() {
        let record = ByteRecord::from(vec!["-4", "1", "1", "1", "0", "ADD"]);
        let row = parse_record(&record, Schema::Basic);
        assert_eq!(row.event.tick, 0);
        assert_eq!(row.defaulted_fields, 1);
    }

    #[test]
    fn invalid_utf8_is_tolerated_per_field() {
        let log: &[u8] = b"tick,filename,size,num req,delta t,act\xffion\n\
                           0,1,10\xff,1,0,ADD\n\
                           3,1,1024,1,0,DEL\xffETE\n";
        let rows: Vec<DecodedRow> = LogDecoder::from_reader(Cursor::new(log), SchemaChoice::Auto)
            .unwrap()
            .map(Result::unwrap)
            .collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].event.size, 0.0);
        assert_eq!(rows[0].event.action, Action::Add);
        assert_eq!(rows[0].defaulted_fields, 1);
        assert_eq!(rows[1].event.tick, 3);
        assert_eq!(rows[1].event.size, 1024.0);
        assert_eq!(rows[1].event.action, Action::Other("DEL\u{FFFD}ETE".into()));
        assert_eq!(rows[1].defaulted_fields, 0);
    }

    #[test]
    fn unknown_action_is_kept() {
        let log = "tick,filename,size,num req,delta t,action\n2,4,8,1,0,EVICT\n";
        let events = decode_all(log, SchemaChoice::Basic);
        assert_eq!(events[0].action, Action::Other("EVICT".into()));
    }

    #[test]
    fn empty_input_has_no_header() {
        let result = LogDecoder::from_reader(Cursor::new(""), SchemaChoice::Auto);
        assert!(matches!(result, Err(ReplayError::MissingHeader)));
    }

    #[test]
    fn header_only_log_yields_nothing() {
        let events = decode_all("tick,filename,size,num req,delta t,action\n", SchemaChoice::Auto);
        assert!(events.is_empty());
    }

    #[test]
    fn ragged_row_is_fatal_and_stops_decoding() {
        let log = "tick,filename,size,num req,delta t,action\n\
                   0,1,1024,1,0,ADD\n\
                   1,2,3\n\
                   2,1,1024,1,0,DELETE\n";
        let mut decoder = LogDecoder::from_reader(Cursor::new(log), SchemaChoice::Auto).unwrap();
        assert!(decoder.next().unwrap().is_ok());
        assert!(matches!(decoder.next(), Some(Err(ReplayError::Read(_)))));
        assert!(decoder.next().is_none());
    }

    #[test]
    fn header_is_available_after_open() {
        let decoder = LogDecoder::from_reader(Cursor::new(BASIC_LOG), SchemaChoice::Auto).unwrap();
        assert_eq!(decoder.schema(), Schema::Basic);
        assert_eq!(decoder.header().get(5), Some(&b"action"[..]));
    }

    #[test]
    fn missing_file_fails_to_open() {
        let result = LogDecoder::open("/nonexistent/simview/log.csv", SchemaChoice::Auto);
        assert!(matches!(result, Err(ReplayError::Open { .. })));
    }

    #[test]
    fn gzip_and_plain_decode_identically() {
        let mut plain = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        plain.write_all(BASIC_LOG.as_bytes()).unwrap();
        let gz = write_gzip(BASIC_LOG, ".gz");
        let gzip = write_gzip(BASIC_LOG, ".gzip");

        let read = |path: &Path| -> Vec<DecodedRow> {
            LogDecoder::open(path, SchemaChoice::Auto)
                .unwrap()
                .map(Result::unwrap)
                .collect()
        };

        let expected = read(plain.path());
        assert_eq!(expected.len(), 2);
        assert_eq!(read(gz.path()), expected);
        assert_eq!(read(gzip.path()), expected);
    }

    #[test]
    fn plain_text_with_gz_extension_fails_decompression() {
        let mut file = tempfile::Builder::new().suffix(".gz").tempfile().unwrap();
        file.write_all(BASIC_LOG.as_bytes()).unwrap();
        let result = LogDecoder::open(file.path(), SchemaChoice::Auto);
        assert!(matches!(result, Err(ReplayError::Decompression { .. })));
    }

    #[test]
    fn compression_follows_extension_only() {
        assert_eq!(Compression::from_path(Path::new("a.csv.gz")), Compression::Gzip);
        assert_eq!(Compression::from_path(Path::new("a.gzip")), Compression::Gzip);
        assert_eq!(Compression::from_path(Path::new("a.csv")), Compression::None);
        assert_eq!(Compression::from_path(Path::new("a")), Compression::None);
    }
}
