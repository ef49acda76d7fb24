//! Local CSV profile log
//!
//! One row per recorded profile, appended to a single file. The header row is
//! written only when the file is created or empty. Appends are serialized by a
//! mutex so concurrent calls cannot interleave partial rows.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use call_agent_core::{ProfileSink, Result, UserProfile};

use crate::PersistenceError;

pub const CSV_HEADER: [&str; 4] = ["Name", "Email", "Blood Group", "Registration Date"];

/// Quote a field when it contains a delimiter, quote or line break
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn encode_row(fields: &[&str]) -> String {
    let mut line = fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",");
    line.push_str("\r\n");
    line
}

/// Appends profiles to a CSV file
pub struct CsvProfileSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvProfileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, profile: &UserProfile) -> std::result::Result<(), PersistenceError> {
        let _guard = self.lock.lock().await;

        let needs_header = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        let mut buf = String::new();
        if needs_header {
            buf.push_str(&encode_row(&CSV_HEADER));
        }
        let registered = profile.registered_at_display();
        buf.push_str(&encode_row(&[
            &profile.name,
            &profile.email,
            &profile.blood_group,
            &registered,
        ]));

        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileSink for CsvProfileSink {
    async fn record(&self, profile: &UserProfile) -> Result<()> {
        self.append(profile).await?;
        tracing::info!(
            path = %self.path.display(),
            name = %profile.name,
            blood_group = %profile.blood_group,
            "Profile appended to CSV"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("Ram"), "Ram");
        assert_eq!(escape_field("Sharma, Ram"), "\"Sharma, Ram\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[tokio::test]
    async fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvProfileSink::new(dir.path().join("user_data.csv"));

        sink.record(&UserProfile::new("Ram", "", "A+")).await.unwrap();
        sink.record(&UserProfile::new("Sita", "sita@gmail.com", "O-"))
            .await
            .unwrap();

        let content = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Name,Email,Blood Group,Registration Date");
        assert!(lines[1].starts_with("Ram,,A+,"));
        assert!(lines[2].starts_with("Sita,sita@gmail.com,O-,"));
    }

    #[tokio::test]
    async fn test_existing_file_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_data.csv");
        std::fs::write(&path, "Name,Email,Blood Group,Registration Date\r\nOld,,B+,2024-01-01 00:00:00\r\n").unwrap();

        let sink = CsvProfileSink::new(&path);
        sink.record(&UserProfile::new("New, Person", "", "AB+"))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("Name,Email").count(), 1);
        assert!(content.contains("\"New, Person\",,AB+,"));
    }

    #[tokio::test]
    async fn test_unwritable_path_is_persistence_error() {
        let sink = CsvProfileSink::new("/nonexistent-dir/user_data.csv");
        let err = sink.record(&UserProfile::new("Ram", "", "A+")).await.unwrap_err();
        assert!(matches!(err, call_agent_core::Error::Persistence(_)));
    }
}
