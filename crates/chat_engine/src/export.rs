use std::path::PathBuf;

use chat_logging::chat_info;
use serde_json::json;

use crate::filename::transcript_stem;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::render::FragmentRenderer;

/// What is being exported: one view of one chat endpoint.
#[derive(Debug, Clone)]
pub struct TranscriptSource<'a> {
    pub endpoint: &'a str,
    pub show_chat: &'a str,
    pub title: &'a str,
    /// Newest first, as held by the transcript buffer.
    pub fragments: &'a [String],
    pub exported_at: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub line_count: usize,
    pub output_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("manifest serialization failed: {0}")]
    Manifest(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct TranscriptExporter {
    writer: AtomicFileWriter,
    write_manifest: bool,
}

impl TranscriptExporter {
    pub fn new(writer: AtomicFileWriter) -> Self {
        Self {
            writer,
            write_manifest: true,
        }
    }

    pub fn without_manifest(mut self) -> Self {
        self.write_manifest = false;
        self
    }

    /// Writes `<stem>.md` (and `<stem>.json` unless disabled) into the writer's directory.
    pub fn export(
        &self,
        source: &TranscriptSource<'_>,
        renderer: &dyn FragmentRenderer,
    ) -> Result<ExportSummary, ExportError> {
        let stem = transcript_stem(source.endpoint, source.show_chat);
        let lines: Vec<String> = source
            .fragments
            .iter()
            .flat_map(|fragment| renderer.render(fragment))
            .collect();

        let mut document = format!(
            "# {}\n\nsource: {}\nview: {}\nexported: {}\n\n",
            source.title, source.endpoint, source.show_chat, source.exported_at
        );
        for line in &lines {
            document.push_str(line);
            document.push('\n');
        }

        let output_path = self
            .writer
            .write(&format!("{stem}.md"), document.as_bytes())?;

        let manifest_path = if self.write_manifest {
            let manifest = json!({
                "endpoint": source.endpoint,
                "show_chat": source.show_chat,
                "exported_at": source.exported_at,
                "fragments": source.fragments.len(),
                "lines": lines.len(),
                "file": format!("{stem}.md"),
            });
            let body = serde_json::to_vec_pretty(&manifest)?;
            Some(self.writer.write(&format!("{stem}.json"), &body)?)
        } else {
            None
        };

        chat_info!(
            "exported {} lines of {} to {:?}",
            lines.len(),
            source.show_chat,
            output_path
        );
        Ok(ExportSummary {
            line_count: lines.len(),
            output_path,
            manifest_path,
        })
    }
}
