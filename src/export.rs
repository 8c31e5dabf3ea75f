use std::io::Write;

use crate::error::{AppError, Result};
use crate::feed::FeedItem;

pub const CONTENT_DISPOSITION: &str = "attachment; filename=WebScrape.csv";

pub const HEADER: [&str; 6] = [
    "Title",
    "Description",
    "Link To Article",
    "Publication Date",
    "Category",
    "Image URL",
];

/// The CSV produced by a single scrape. Each request owns its own artifact,
/// so concurrent scrapes never see each other's rows.
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    pub bytes: Vec<u8>,
    pub rows: usize,
}

/// Streams feed items as CSV into `W`, header first.
///
/// Each row is encoded on its own and handed to the sink in one write, so a
/// rejected row leaves nothing half-written behind it.
pub struct CsvExporter<W: Write> {
    out: W,
    rows: usize,
}

impl<W: Write> CsvExporter<W> {
    pub fn new(mut out: W) -> Result<Self> {
        out.write_all(&encode(HEADER)?)?;

        Ok(CsvExporter { out, rows: 0 })
    }

    /// Appends one row. A failed row is logged and dropped so the rest of the
    /// feed still lands in the artifact.
    pub fn push(&mut self, item: &FeedItem) {
        let written = encode(item.to_record())
            .and_then(|row| self.out.write_all(&row).map_err(AppError::from));
        match written {
            Ok(()) => self.rows += 1,
            Err(err) => tracing::warn!("Error writing to CSV: {}", err),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl CsvExporter<Vec<u8>> {
    pub fn into_artifact(self) -> Result<OutputArtifact> {
        let rows = self.rows;
        let bytes = self.finish()?;

        Ok(OutputArtifact { bytes, rows })
    }
}

fn encode(record: [&str; 6]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(record)?;

    Ok(writer.into_inner().map_err(|err| err.into_error())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn item(title: &str, description: &str) -> FeedItem {
        FeedItem {
            title: title.into(),
            description: description.into(),
            ..FeedItem::default()
        }
    }

    fn export(items: &[FeedItem]) -> OutputArtifact {
        let mut exporter = CsvExporter::new(Vec::new()).unwrap();
        for item in items {
            exporter.push(item);
        }
        exporter.into_artifact().unwrap()
    }

    /// Refuses any write whose bytes contain `reject`.
    struct RejectingSink {
        written: Vec<u8>,
        reject: &'static str,
    }

    impl Write for RejectingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if String::from_utf8_lossy(buf).contains(self.reject) {
                return Err(io::Error::new(io::ErrorKind::Other, "sink refused row"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn empty_export_is_just_the_header() {
        let artifact = export(&[]);

        assert_eq!(artifact.rows, 0);
        assert_eq!(
            String::from_utf8(artifact.bytes).unwrap(),
            "Title,Description,Link To Article,Publication Date,Category,Image URL\n"
        );
    }

    #[test]
    fn rows_follow_the_header_in_push_order() {
        let artifact = export(&[item("one", "a"), item("two", "b")]);
        let text = String::from_utf8(artifact.bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(artifact.rows, 2);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "one,a,,,,");
        assert_eq!(lines[2], "two,b,,,,");
    }

    #[test]
    fn delimiters_quotes_and_newlines_are_quoted() {
        let artifact = export(&[item("a, b", "say \"hi\"\nbye")]);
        let text = String::from_utf8(artifact.bytes).unwrap();

        assert!(text.ends_with("\"a, b\",\"say \"\"hi\"\"\nbye\",,,,\n"));
    }

    #[test]
    fn output_reads_back_with_six_columns() {
        let artifact = export(&[item("x", "y")]);
        let mut reader = csv::Reader::from_reader(artifact.bytes.as_slice());

        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), HEADER.to_vec());

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), 6);
    }

    #[test]
    fn failed_row_is_skipped_and_later_rows_still_land() {
        let sink = RejectingSink {
            written: Vec::new(),
            reject: "poison",
        };
        let mut exporter = CsvExporter::new(sink).unwrap();
        exporter.push(&item("first", ""));
        exporter.push(&item("poison", ""));
        exporter.push(&item("third", ""));

        assert_eq!(exporter.rows(), 2);
        let sink = exporter.finish().unwrap();
        assert_eq!(
            String::from_utf8(sink.written).unwrap(),
            "Title,Description,Link To Article,Publication Date,Category,Image URL\n\
             first,,,,,\n\
             third,,,,,\n"
        );
    }

    #[test]
    fn failed_header_is_fatal() {
        let sink = RejectingSink {
            written: Vec::new(),
            reject: "Title",
        };
        let err = CsvExporter::new(sink).err().expect("header write must fail");
        assert!(matches!(err, crate::error::AppError::Io(_)));
    }
}
