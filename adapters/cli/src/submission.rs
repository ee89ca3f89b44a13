//! Stores a graded log together with the student record that points at it.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use keyplay_system_keylog::rle_compress;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Key-value sink for submission records.
pub(crate) trait SubmissionStore {
    /// Stores `value` under `key`, replacing any previous value.
    fn put(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Store that writes one file per key inside a directory.
#[derive(Clone, Debug)]
pub(crate) struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub(crate) fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)
            .with_context(|| format!("failed to create store directory {}", root.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }
}

impl SubmissionStore for DirectoryStore {
    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.root.join(key);
        fs::write(&path, value)
            .with_context(|| format!("failed to write {key} to {}", path.display()))
    }
}

/// Identity attached to a submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Student {
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) student_id: String,
}

/// JSON record stored under `submission-{studentID}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmissionRecord {
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    #[serde(rename = "studentID")]
    pub(crate) student_id: String,
    pub(crate) keystrokes_key: String,
}

/// Compresses `body` under `keys-{id}` and writes the record referencing it.
pub(crate) fn submit<S>(store: &mut S, student: Student, body: &str) -> Result<SubmissionRecord>
where
    S: SubmissionStore + ?Sized,
{
    validate_student_id(&student.student_id)?;

    let keystrokes_key = format!("keys-{}", student.student_id);
    let compressed = rle_compress(body).context("failed to compress keystroke log")?;
    store.put(&keystrokes_key, &compressed)?;

    let record = SubmissionRecord {
        first_name: student.first_name,
        last_name: student.last_name,
        student_id: student.student_id,
        keystrokes_key,
    };
    let json = serde_json::to_string(&record).context("failed to encode submission record")?;
    store.put(&format!("submission-{}", record.student_id), &json)?;

    info!(
        student = %record.student_id,
        original = body.len(),
        compressed = compressed.len(),
        "stored submission"
    );
    Ok(record)
}

fn validate_student_id(student_id: &str) -> Result<()> {
    if student_id.is_empty() {
        bail!("student ID must not be empty");
    }
    if let Some(bad) = student_id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        bail!("student ID {student_id:?} contains unsupported character {bad:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Default)]
    struct MemoryStore {
        entries: BTreeMap<String, String>,
    }

    impl SubmissionStore for MemoryStore {
        fn put(&mut self, key: &str, value: &str) -> Result<()> {
            let _ = self.entries.insert(key.to_owned(), value.to_owned());
            Ok(())
        }
    }

    fn student(id: &str) -> Student {
        Student {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            student_id: id.to_owned(),
        }
    }

    #[test]
    fn writes_compressed_keys_and_record() {
        let mut store = MemoryStore::default();
        let record = submit(&mut store, student("s1234"), "131\n131\n131\n130").expect("stored");

        assert_eq!(record.keystrokes_key, "keys-s1234");
        assert_eq!(store.entries["keys-s1234"], "131,3\n130");

        let json = &store.entries["submission-s1234"];
        assert_eq!(
            json,
            r#"{"firstName":"Ada","lastName":"Lovelace","studentID":"s1234","keystrokesKey":"keys-s1234"}"#
        );
        let decoded: SubmissionRecord = serde_json::from_str(json).expect("record parses");
        assert_eq!(decoded, record);
    }

    #[test]
    fn rejects_path_like_student_ids() {
        let mut store = MemoryStore::default();
        assert!(submit(&mut store, student("../etc"), "1").is_err());
        assert!(submit(&mut store, student(""), "1").is_err());
        assert!(store.entries.is_empty());
    }
}
