//! Routing of streamed response chunks to the terminal or to disk.
//!
//! Only the first part of the first candidate is inspected. Inline binary
//! data is decoded and written to `<prefix>_<index><ext>`; anything else is
//! printed as text. Chunks missing candidates, content or parts are skipped.

use crate::ai::gemini::types::GenerateContentResponse;
use crate::ai::mime::extension_for_mime;
use crate::{Error, Result};
use base64::Engine as _;
use futures_util::{Stream, StreamExt};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What happened to a single chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Skipped,
    Printed,
    Saved(PathBuf),
}

/// Totals for a fully consumed stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub chunks: usize,
    pub skipped: usize,
    pub printed: usize,
    pub saved: Vec<PathBuf>,
}

pub struct ResponseDispatcher<W: Write> {
    output_dir: PathBuf,
    file_prefix: String,
    next_index: usize,
    out: W,
}

impl<W: Write> ResponseDispatcher<W> {
    pub fn new(output_dir: impl Into<PathBuf>, file_prefix: impl Into<String>, out: W) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_prefix: file_prefix.into(),
            next_index: 0,
            out,
        }
    }

    /// Index the next saved file will use.
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Route one chunk.
    pub fn dispatch(&mut self, chunk: &GenerateContentResponse) -> Result<Dispatch> {
        let Some(parts) = chunk.first_parts() else {
            debug!("Skipping chunk without candidate content");
            return Ok(Dispatch::Skipped);
        };

        if let Some(blob) = &parts[0].inline_data {
            let bytes = match blob.data.as_deref() {
                Some(data) if !data.is_empty() => base64::engine::general_purpose::STANDARD
                    .decode(data)
                    .map_err(|e| {
                        Error::AiProvider(format!("Failed to decode inline data: {}", e))
                    })?,
                _ => Vec::new(),
            };

            if !bytes.is_empty() {
                let mime_type = blob.mime_type.as_deref().unwrap_or_default();
                let path = self.save_binary(&bytes, mime_type)?;
                return Ok(Dispatch::Saved(path));
            }
        }

        match chunk.text() {
            Some(text) => {
                writeln!(self.out, "{}", text)?;
                self.out.flush()?;
                Ok(Dispatch::Printed)
            }
            None => {
                debug!("Chunk carried no text");
                Ok(Dispatch::Skipped)
            }
        }
    }

    /// Consume the stream to exhaustion, dispatching each chunk in order.
    /// The first error ends the run.
    pub async fn run<S>(&mut self, mut chunks: S) -> Result<DispatchSummary>
    where
        S: Stream<Item = Result<GenerateContentResponse>> + Unpin,
    {
        let mut summary = DispatchSummary::default();

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            summary.chunks += 1;

            match self.dispatch(&chunk)? {
                Dispatch::Skipped => summary.skipped += 1,
                Dispatch::Printed => summary.printed += 1,
                Dispatch::Saved(path) => summary.saved.push(path),
            }
        }

        Ok(summary)
    }

    fn save_binary(&mut self, bytes: &[u8], mime_type: &str) -> Result<PathBuf> {
        let extension = extension_for_mime(mime_type).unwrap_or_default();
        let file_name = format!("{}_{}{}", self.file_prefix, self.next_index, extension);
        self.next_index += 1;

        let path = self.output_dir.join(file_name);
        write_file(&path, bytes)?;

        info!("Saved {} bytes of {} to {}", bytes.len(), mime_type, path.display());
        writeln!(self.out, "File saved to: {}", path.display())?;
        self.out.flush()?;

        Ok(path)
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|e| {
        tracing::error!("Failed to write {}: {}", path.display(), e);
        Error::Io(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::types::{Candidate, ResponseContent, ResponsePart};
    use crate::ai::MockStreamClient;
    use pretty_assertions::assert_eq;

    fn dispatcher(dir: &Path) -> ResponseDispatcher<Vec<u8>> {
        ResponseDispatcher::new(dir, "out", Vec::new())
    }

    fn output(dispatcher: ResponseDispatcher<Vec<u8>>) -> String {
        String::from_utf8(dispatcher.into_inner()).unwrap()
    }

    fn file_count(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_empty_candidates_produce_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = dispatcher(dir.path());

        let empty = GenerateContentResponse {
            candidates: Some(vec![]),
            model_version: None,
        };
        for _ in 0..3 {
            assert_eq!(d.dispatch(&empty).unwrap(), Dispatch::Skipped);
        }

        assert_eq!(file_count(dir.path()), 0);
        assert_eq!(output(d), "");
    }

    #[test]
    fn test_absent_levels_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = dispatcher(dir.path());

        let chunks = [
            GenerateContentResponse::default(),
            GenerateContentResponse {
                candidates: Some(vec![Candidate::default()]),
                model_version: None,
            },
            GenerateContentResponse {
                candidates: Some(vec![Candidate {
                    content: Some(ResponseContent::default()),
                    finish_reason: Some("STOP".to_string()),
                }]),
                model_version: None,
            },
            GenerateContentResponse {
                candidates: Some(vec![Candidate {
                    content: Some(ResponseContent {
                        role: None,
                        parts: Some(vec![]),
                    }),
                    finish_reason: None,
                }]),
                model_version: None,
            },
        ];

        for chunk in &chunks {
            assert_eq!(d.dispatch(chunk).unwrap(), Dispatch::Skipped);
        }
        assert_eq!(output(d), "");
    }

    #[test]
    fn test_text_chunk_is_printed_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = dispatcher(dir.path());

        let result = d
            .dispatch(&MockStreamClient::text_chunk("Play 1: Cover 2 zone"))
            .unwrap();

        assert_eq!(result, Dispatch::Printed);
        assert_eq!(file_count(dir.path()), 0);
        assert_eq!(output(d), "Play 1: Cover 2 zone\n");
    }

    #[test]
    fn test_png_payload_is_saved_with_index_zero() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = dispatcher(dir.path());

        // "QUJD" is base64 for b"ABC"
        let result = d
            .dispatch(&MockStreamClient::inline_chunk("image/png", "QUJD"))
            .unwrap();

        let expected = dir.path().join("out_0.png");
        assert_eq!(result, Dispatch::Saved(expected.clone()));
        assert_eq!(fs::read(&expected).unwrap(), b"ABC");
        assert_eq!(
            output(d),
            format!("File saved to: {}\n", expected.display())
        );
    }

    #[test]
    fn test_consecutive_binary_chunks_use_increasing_indices() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = dispatcher(dir.path());

        d.dispatch(&MockStreamClient::inline_chunk("image/png", "QUJD"))
            .unwrap();
        d.dispatch(&MockStreamClient::text_chunk("between"))
            .unwrap();
        let second = d
            .dispatch(&MockStreamClient::inline_chunk("image/jpeg", "REVG"))
            .unwrap();

        assert_eq!(second, Dispatch::Saved(dir.path().join("out_1.jpg")));
        assert_eq!(fs::read(dir.path().join("out_1.jpg")).unwrap(), b"DEF");
        assert_eq!(d.next_index(), 2);
    }

    #[test]
    fn test_unknown_mime_type_saves_without_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = dispatcher(dir.path());

        let result = d
            .dispatch(&MockStreamClient::inline_chunk("application/x-made-up", "QUJD"))
            .unwrap();

        assert_eq!(result, Dispatch::Saved(dir.path().join("out_0")));
    }

    #[test]
    fn test_existing_file_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("out_0.png"), b"stale contents").unwrap();
        let mut d = dispatcher(dir.path());

        d.dispatch(&MockStreamClient::inline_chunk("image/png", "QUJD"))
            .unwrap();

        assert_eq!(fs::read(dir.path().join("out_0.png")).unwrap(), b"ABC");
    }

    #[test]
    fn test_empty_inline_payload_falls_through_to_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = dispatcher(dir.path());

        let chunk = GenerateContentResponse {
            candidates: Some(vec![Candidate {
                content: Some(ResponseContent {
                    role: None,
                    parts: Some(vec![
                        ResponsePart {
                            inline_data: Some(crate::ai::gemini::types::Blob {
                                mime_type: Some("image/png".to_string()),
                                data: Some(String::new()),
                            }),
                            ..ResponsePart::default()
                        },
                        ResponsePart {
                            text: Some("caption".to_string()),
                            ..ResponsePart::default()
                        },
                    ]),
                }),
                finish_reason: None,
            }]),
            model_version: None,
        };

        assert_eq!(d.dispatch(&chunk).unwrap(), Dispatch::Printed);
        assert_eq!(d.next_index(), 0);
        assert_eq!(file_count(dir.path()), 0);
        assert_eq!(output(d), "caption\n");
    }

    #[test]
    fn test_invalid_base64_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = dispatcher(dir.path());

        let err = d
            .dispatch(&MockStreamClient::inline_chunk("image/png", "!!!"))
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[test]
    fn test_write_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let mut d = dispatcher(&missing);

        let err = d
            .dispatch(&MockStreamClient::inline_chunk("image/png", "QUJD"))
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn test_run_consumes_stream_and_summarizes() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = dispatcher(dir.path());

        let chunks = futures_util::stream::iter(vec![
            Ok(MockStreamClient::text_chunk("intro")),
            Ok(MockStreamClient::inline_chunk("image/png", "QUJD")),
            Ok(GenerateContentResponse::default()),
            Ok(MockStreamClient::text_chunk("more")),
            Ok(MockStreamClient::inline_chunk("image/png", "REVG")),
        ]);

        let summary = d.run(chunks).await.unwrap();

        assert_eq!(
            summary,
            DispatchSummary {
                chunks: 5,
                skipped: 1,
                printed: 2,
                saved: vec![dir.path().join("out_0.png"), dir.path().join("out_1.png")],
            }
        );
    }

    #[tokio::test]
    async fn test_run_stops_at_first_stream_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = dispatcher(dir.path());

        let chunks = futures_util::stream::iter(vec![
            Ok(MockStreamClient::text_chunk("before")),
            Err(Error::Stream("connection reset".to_string())),
            Ok(MockStreamClient::text_chunk("after")),
        ]);

        let err = d.run(chunks).await.unwrap_err();
        assert!(matches!(err, Error::Stream(_)));
        assert_eq!(output(d), "before\n");
    }
}
