use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::domain::RepositoryError;
use crate::domain::images::NewImage;
use crate::domain::prompts::NewPrompt;
use crate::domain::repositories::{ImageRepository, PromptRepository};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Outcome of one ingestion run.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub prompts_created: usize,
    pub images_created: usize,
    pub skipped_slugs: Vec<String>,
}

/// Seeds prompts and image candidates from a directory tree laid out as
/// `<prompt-slug>/<ModelName>/<image files>`, with the prompt text in a
/// `prompt.txt` (or `_prompt.txt`) file beside the model directories.
///
/// Slugs already present in the database are skipped, so re-running ingestion
/// against a grown tree only adds the new prompts. Stored image paths are
/// relative to the tree root; model names never appear in served URLs.
pub struct Ingestor {
    prompts: Arc<dyn PromptRepository>,
    images: Arc<dyn ImageRepository>,
}

impl Ingestor {
    pub fn new(prompts: Arc<dyn PromptRepository>, images: Arc<dyn ImageRepository>) -> Self {
        Self { prompts, images }
    }

    pub async fn ingest_tree(&self, root: &Path, dry_run: bool) -> anyhow::Result<IngestReport> {
        let mut report = IngestReport::default();

        let mut entries = tokio::fs::read_dir(root)
            .await
            .with_context(|| format!("failed to read image tree at {}", root.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }

            let slug = slugify(&entry.file_name().to_string_lossy());
            if slug.is_empty() {
                continue;
            }

            match self.prompts.get_by_slug(&slug).await {
                Ok(_) => {
                    info!(slug, "prompt already ingested, skipping");
                    report.skipped_slugs.push(slug);
                    continue;
                }
                Err(RepositoryError::NotFound) => {}
                Err(err) => return Err(err.into()),
            }

            self.ingest_prompt_dir(root, &entry.path(), &slug, dry_run, &mut report)
                .await?;
        }

        info!(
            prompts = report.prompts_created,
            images = report.images_created,
            skipped = report.skipped_slugs.len(),
            dry_run,
            "ingestion complete"
        );

        Ok(report)
    }

    async fn ingest_prompt_dir(
        &self,
        root: &Path,
        prompt_dir: &Path,
        slug: &str,
        dry_run: bool,
        report: &mut IngestReport,
    ) -> anyhow::Result<()> {
        let Some(text) = read_prompt_text(prompt_dir).await else {
            warn!(slug, "no prompt.txt found, skipping directory");
            return Ok(());
        };

        // Collect model/file pairs first; a prompt without images is not
        // worth creating.
        let mut found: Vec<(String, String)> = Vec::new();

        let mut model_dirs = tokio::fs::read_dir(prompt_dir).await?;
        while let Some(model_entry) = model_dirs.next_entry().await? {
            if !model_entry.file_type().await?.is_dir() {
                continue;
            }
            let model_name = model_entry.file_name().to_string_lossy().trim().to_string();

            let mut files = tokio::fs::read_dir(model_entry.path()).await?;
            while let Some(file_entry) = files.next_entry().await? {
                if !file_entry.file_type().await?.is_file() {
                    continue;
                }
                let path = file_entry.path();
                if !is_image_file(&path) {
                    continue;
                }
                let relative = path
                    .strip_prefix(root)
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .replace('\\', "/");
                found.push((model_name.clone(), relative));
            }
        }

        if found.is_empty() {
            warn!(slug, "no image files found, skipping directory");
            return Ok(());
        }

        if dry_run {
            info!(slug, images = found.len(), "would ingest prompt");
            report.prompts_created += 1;
            report.images_created += found.len();
            return Ok(());
        }

        let prompt = self
            .prompts
            .insert(NewPrompt {
                slug: slug.to_string(),
                text,
                created_at: None,
            })
            .await
            .map_err(anyhow::Error::from)?;

        for (model_name, image_path) in &found {
            self.images
                .insert(NewImage {
                    prompt_id: prompt.id,
                    model_name: model_name.clone(),
                    image_path: image_path.clone(),
                    created_at: None,
                })
                .await
                .map_err(anyhow::Error::from)?;
        }

        info!(slug, images = found.len(), "ingested prompt");
        report.prompts_created += 1;
        report.images_created += found.len();

        Ok(())
    }
}

async fn read_prompt_text(prompt_dir: &Path) -> Option<String> {
    for candidate in ["_prompt.txt", "prompt.txt"] {
        if let Ok(text) = tokio::fs::read_to_string(prompt_dir.join(candidate)).await {
            let text = text.trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Lowercase, spaces and underscores to hyphens, everything else
/// non-alphanumeric stripped.
fn slugify(folder_name: &str) -> String {
    let mut slug = String::with_capacity(folder_name.len());
    for ch in folder_name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if ch == ' ' || ch == '_' || ch == '-' {
            if !slug.ends_with('-') {
                slug.push('-');
            }
        }
    }
    slug.trim_matches('-').to_string()
}
