//! JSON dump of the final records plus optional media and chunk side files

use base64::Engine;
use std::path::{Path, PathBuf};

use crate::config::OutputConfig;
use crate::error::{Error, Result};
use crate::processing::RunReport;
use crate::types::{FinalRecord, TextChunk};

/// Files written by [`save_media`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MediaFiles {
    pub images: Vec<PathBuf>,
    pub audio: Vec<PathBuf>,
}

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}

/// Write records as a pretty-printed UTF-8 JSON array
pub async fn write_records(path: impl AsRef<Path>, records: &[FinalRecord]) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path).await?;
    let json = serde_json::to_vec_pretty(records)?;
    tokio::fs::write(path, json).await?;
    tracing::info!("Wrote {} record(s) to {}", records.len(), path.display());
    Ok(())
}

/// Write the text chunks of a run as a JSON array
pub async fn write_chunks(path: impl AsRef<Path>, chunks: &[TextChunk]) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path).await?;
    let json = serde_json::to_vec_pretty(chunks)?;
    tokio::fs::write(path, json).await?;
    tracing::info!("Wrote {} chunk(s) to {}", chunks.len(), path.display());
    Ok(())
}

/// Decode every record's media into `part_{n}.png` / `part_{n}.mp3`, n counting records from 1
pub async fn save_media(dir: impl AsRef<Path>, records: &[FinalRecord]) -> Result<MediaFiles> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await?;

    let engine = &base64::engine::general_purpose::STANDARD;
    let mut files = MediaFiles::default();

    for (i, record) in records.iter().enumerate() {
        let n = i + 1;

        let image = engine
            .decode(&record.img)
            .map_err(|e| Error::internal(format!("record {} image is not valid base64: {}", n, e)))?;
        let image_path = dir.join(format!("part_{}.png", n));
        tokio::fs::write(&image_path, image).await?;
        files.images.push(image_path);

        if let Some(audio) = &record.audio {
            let audio = engine
                .decode(audio)
                .map_err(|e| Error::internal(format!("record {} audio is not valid base64: {}", n, e)))?;
            let audio_path = dir.join(format!("part_{}.mp3", n));
            tokio::fs::write(&audio_path, audio).await?;
            files.audio.push(audio_path);
        }
    }

    tracing::info!(
        "Saved {} image(s) and {} audio file(s) to {}",
        files.images.len(),
        files.audio.len(),
        dir.display()
    );
    Ok(files)
}

/// Write every configured artifact of a run
///
/// The records file is written even when the run aborted, as an empty array.
pub async fn write_run(output: &OutputConfig, report: &RunReport) -> Result<()> {
    write_records(&output.path, &report.records).await?;
    if let Some(path) = &output.chunks_path {
        write_chunks(path, &report.chunks).await?;
    }
    if let Some(dir) = &output.media_dir {
        save_media(dir, &report.records).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::{DocumentFailure, DocumentStage};

    fn record(story: &str, img: &[u8], audio: Option<&[u8]>) -> FinalRecord {
        let engine = &base64::engine::general_purpose::STANDARD;
        FinalRecord {
            story: story.to_string(),
            img: engine.encode(img),
            audio: audio.map(|a| engine.encode(a)),
        }
    }

    #[tokio::test]
    async fn test_write_records_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("story.json");
        let records = vec![record("Olá, mundo", b"png", None), record("Fim", b"png", Some(b"mp3"))];

        write_records(&path, &records).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  {"));
        assert!(raw.contains("Olá, mundo"));
        let parsed: Vec<FinalRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, records);
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value[0].get("audio").is_none());
        assert!(value[1].get("audio").is_some());
    }

    #[tokio::test]
    async fn test_save_media_decodes_files() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            record("one", b"\x89PNG first", Some(b"ID3 first")),
            record("two", b"\x89PNG second", None),
        ];

        let files = save_media(dir.path(), &records).await.unwrap();

        assert_eq!(files.images.len(), 2);
        assert_eq!(files.audio.len(), 1);
        assert_eq!(std::fs::read(dir.path().join("part_2.png")).unwrap(), b"\x89PNG second");
        assert_eq!(std::fs::read(dir.path().join("part_1.mp3")).unwrap(), b"ID3 first");
        assert!(!dir.path().join("part_2.mp3").exists());
    }

    #[tokio::test]
    async fn test_save_media_rejects_invalid_base64() {
        let dir = tempfile::tempdir().unwrap();
        let bad = FinalRecord {
            story: "x".into(),
            img: "not base64!!".into(),
            audio: None,
        };
        assert!(matches!(
            save_media(dir.path(), &[bad]).await,
            Err(Error::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_aborted_run_still_writes_empty_records() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            path: dir.path().join("story.json"),
            media_dir: Some(dir.path().join("media")),
            chunks_path: None,
        };
        let report = RunReport {
            source_filename: "aula.txt".into(),
            document: None,
            locale: None,
            chunks: Vec::new(),
            parts_extracted: 0,
            records: Vec::new(),
            dropped: Vec::new(),
            stage: DocumentStage::Aborted,
            failure: Some(DocumentFailure {
                stage: DocumentStage::LanguageKnown,
                error: Error::UnsupportedLanguage("deu".into()),
            }),
        };

        write_run(&output, &report).await.unwrap();

        let raw = std::fs::read_to_string(&output.path).unwrap();
        let parsed: Vec<FinalRecord> = serde_json::from_str(&raw).unwrap();
        assert!(parsed.is_empty());
        assert!(std::fs::read_dir(dir.path().join("media")).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_write_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.json");
        let chunks = vec![TextChunk {
            id: "abcdefghijkl".into(),
            text: "Roma".into(),
            source_filename: "roma.txt".into(),
            page_number: Some(1),
            char_start: 0,
            char_end: 4,
        }];

        write_chunks(&path, &chunks).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["id"], "abcdefghijkl");
        assert_eq!(value[0]["source_filename"], "roma.txt");
    }
}
