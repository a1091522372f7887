//! Metadata ledger: the append-only table pairing audio references to
//! transcripts.
//!
//! Persisted as a single two-column CSV (`audio,text`). Appending loads the
//! whole file, concatenates one row, and rewrites it in full. There is no
//! locking: concurrent appends from separate processes race and can lose
//! updates.

use crate::capture::SourceType;
use crate::error::{Result, VoicebankError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One (audio reference, transcript) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRow {
    /// Relative reference, formatted `audio/{sourceType}/{filename}`.
    pub audio: String,
    /// Transcript text. Possibly empty, never absent: rows are only written
    /// for successfully transcribed samples.
    pub text: String,
}

/// The ledger file and its load-append-save operations.
pub struct MetadataLedger {
    path: PathBuf,
}

impl MetadataLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Format the audio reference for a persisted sample.
    pub fn audio_ref(source: SourceType, filename: &str) -> String {
        format!("audio/{}/{}", source.dir_name(), filename)
    }

    /// Append one row, preserving all existing rows and their order.
    ///
    /// Loads the full ledger if the file exists, concatenates the new row,
    /// and overwrites the file with the result. Row order is append order;
    /// no other ordering exists.
    pub fn append(&self, source: SourceType, filename: &str, text: &str) -> Result<()> {
        let mut rows = if self.path.exists() {
            self.read_all()?
        } else {
            Vec::new()
        };

        rows.push(MetadataRow {
            audio: Self::audio_ref(source, filename),
            text: text.to_string(),
        });

        self.write_all(&rows)
    }

    /// Read every row in append order.
    ///
    /// A malformed file (missing columns, unreadable content) is fatal.
    pub fn read_all(&self) -> Result<Vec<MetadataRow>> {
        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|e| VoicebankError::Ledger {
                message: format!("failed to open {}: {e}", self.path.display()),
            })?;

        reader
            .deserialize()
            .map(|row| {
                row.map_err(|e| VoicebankError::Ledger {
                    message: format!("malformed row in {}: {e}", self.path.display()),
                })
            })
            .collect()
    }

    fn write_all(&self, rows: &[MetadataRow]) -> Result<()> {
        let mut writer =
            csv::Writer::from_path(&self.path).map_err(|e| VoicebankError::Ledger {
                message: format!("failed to write {}: {e}", self.path.display()),
            })?;

        for row in rows {
            writer.serialize(row).map_err(|e| VoicebankError::Ledger {
                message: format!("failed to serialize row: {e}"),
            })?;
        }

        writer.flush().map_err(|e| VoicebankError::Ledger {
            message: format!("failed to flush {}: {e}", self.path.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn ledger_in(dir: &Path) -> MetadataLedger {
        MetadataLedger::new(dir.join("metadata.csv"))
    }

    #[test]
    fn audio_ref_format() {
        assert_eq!(
            MetadataLedger::audio_ref(SourceType::Uploaded, "a.mp3"),
            "audio/uploaded/a.mp3"
        );
        assert_eq!(
            MetadataLedger::audio_ref(SourceType::Recorded, "b.wav"),
            "audio/recorded/b.wav"
        );
    }

    #[test]
    fn first_append_creates_file_with_header() {
        let dir = tempdir().unwrap();
        let ledger = ledger_in(dir.path());

        ledger
            .append(SourceType::Recorded, "x.wav", "hello world")
            .unwrap();

        let contents = fs::read_to_string(ledger.path()).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("audio,text"));
        assert_eq!(lines.next(), Some("audio/recorded/x.wav,hello world"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn appends_preserve_submission_order() {
        let dir = tempdir().unwrap();
        let ledger = ledger_in(dir.path());

        for i in 0..5 {
            ledger
                .append(SourceType::Uploaded, &format!("{i}.wav"), &format!("t{i}"))
                .unwrap();
        }

        let rows = ledger.read_all().unwrap();
        assert_eq!(rows.len(), 5);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.audio, format!("audio/uploaded/{i}.wav"));
            assert_eq!(row.text, format!("t{i}"));
        }
    }

    #[test]
    fn append_leaves_existing_rows_unchanged() {
        let dir = tempdir().unwrap();
        let ledger = ledger_in(dir.path());

        ledger.append(SourceType::Recorded, "a.wav", "first").unwrap();
        let before = ledger.read_all().unwrap();

        ledger.append(SourceType::Recorded, "b.wav", "second").unwrap();
        let after = ledger.read_all().unwrap();

        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(&after[..before.len()], &before[..]);
    }

    #[test]
    fn empty_transcript_is_a_valid_row() {
        let dir = tempdir().unwrap();
        let ledger = ledger_in(dir.path());

        ledger.append(SourceType::Recorded, "a.wav", "").unwrap();

        let rows = ledger.read_all().unwrap();
        assert_eq!(rows[0].text, "");
    }

    #[test]
    fn transcript_with_commas_and_quotes_round_trips() {
        let dir = tempdir().unwrap();
        let ledger = ledger_in(dir.path());

        let text = "well, \"quoted\" text,\nwith a newline";
        ledger.append(SourceType::Uploaded, "a.mp3", text).unwrap();
        ledger.append(SourceType::Uploaded, "b.mp3", "plain").unwrap();

        let rows = ledger.read_all().unwrap();
        assert_eq!(rows[0].text, text);
        assert_eq!(rows[1].text, "plain");
    }

    #[test]
    fn read_all_on_missing_file_errors() {
        let dir = tempdir().unwrap();
        let ledger = ledger_in(dir.path());

        assert!(matches!(
            ledger.read_all(),
            Err(VoicebankError::Ledger { .. })
        ));
    }

    #[test]
    fn read_all_on_wrong_schema_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        fs::write(&path, "foo,bar\n1,2\n").unwrap();

        let ledger = MetadataLedger::new(&path);
        assert!(matches!(
            ledger.read_all(),
            Err(VoicebankError::Ledger { .. })
        ));
    }

    #[test]
    fn append_to_malformed_ledger_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        fs::write(&path, "audio,text\n\"unterminated\n").unwrap();

        let ledger = MetadataLedger::new(&path);
        let result = ledger.append(SourceType::Recorded, "a.wav", "t");
        assert!(matches!(result, Err(VoicebankError::Ledger { .. })));
    }
}
