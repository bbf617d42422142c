//! Story pipeline orchestration: document → story parts → images → narration

use base64::Engine;
use futures_util::future::join_all;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

use crate::config::StoryConfig;
use crate::error::{Error, Result};
use crate::generation::{PromptFormatter, TagExtractor, IMAGE_PROMPT_TAG, PART_TAG};
use crate::ingestion::{normalize_pages, FileParser, TextChunker};
use crate::language::{detect_language, Locale};
use crate::providers::{
    backends_from_config, ImageGenerator, ImageRequest, TextGenerator, VoiceGenerator,
    VoiceRequest,
};
use crate::types::{
    Document, FinalRecord, GeneratedAudio, GeneratedImage, ImagePrompt, StoryPart, TextChunk,
};

use super::retry::RetryPolicy;

/// Document-level progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStage {
    Extracted,
    Normalized,
    LanguageKnown,
    StoryGenerated,
    PartsExtracted,
    Complete,
    Aborted,
}

/// Per-part progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartStage {
    Pending,
    ImagePromptGenerated,
    ImageGenerated,
    AudioGenerated,
    Assembled,
    Dropped,
}

impl fmt::Display for DocumentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Extracted => "extraction",
            Self::Normalized => "normalization",
            Self::LanguageKnown => "language detection",
            Self::StoryGenerated => "story generation",
            Self::PartsExtracted => "part extraction",
            Self::Complete => "complete",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

impl fmt::Display for PartStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::ImagePromptGenerated => "image prompt generation",
            Self::ImageGenerated => "image generation",
            Self::AudioGenerated => "audio generation",
            Self::Assembled => "assembly",
            Self::Dropped => "dropped",
        };
        f.write_str(name)
    }
}

/// Why a document run stopped early
#[derive(Debug)]
pub struct DocumentFailure {
    /// Stage that could not be reached
    pub stage: DocumentStage,
    pub error: Error,
}

/// A story part removed from the output
#[derive(Debug)]
pub struct DroppedPart {
    /// 1-based position in the story
    pub index: usize,
    /// Stage that could not be reached
    pub stage: PartStage,
    /// Last error seen at that stage
    pub error: Error,
}

/// Result of one pipeline run
#[derive(Debug)]
pub struct RunReport {
    pub source_filename: String,
    /// Present when the run started from a file
    pub document: Option<Document>,
    pub locale: Option<Locale>,
    pub chunks: Vec<TextChunk>,
    /// Parts found in the story response
    pub parts_extracted: usize,
    /// Surviving parts in story order
    pub records: Vec<FinalRecord>,
    pub dropped: Vec<DroppedPart>,
    /// Terminal document stage, `Complete` or `Aborted`
    pub stage: DocumentStage,
    pub failure: Option<DocumentFailure>,
}

impl RunReport {
    fn new(source_filename: &str, document: Option<Document>) -> Self {
        Self {
            source_filename: source_filename.to_string(),
            document,
            locale: None,
            chunks: Vec::new(),
            parts_extracted: 0,
            records: Vec::new(),
            dropped: Vec::new(),
            stage: DocumentStage::Extracted,
            failure: None,
        }
    }

    fn abort(mut self, stage: DocumentStage, error: Error) -> Self {
        tracing::error!("{}: aborted at {}: {}", self.source_filename, stage, error);
        self.stage = DocumentStage::Aborted;
        self.failure = Some(DocumentFailure { stage, error });
        self
    }

    /// Whether the document went through every stage
    pub fn is_complete(&self) -> bool {
        self.stage == DocumentStage::Complete
    }
}

enum PartOutcome {
    Assembled(FinalRecord),
    Dropped(DroppedPart),
}

impl PartOutcome {
    fn dropped(part: &StoryPart, stage: PartStage, error: Error) -> Self {
        tracing::warn!("Dropping story part {}: {} failed: {}", part.index, stage, error);
        Self::Dropped(DroppedPart {
            index: part.index,
            stage,
            error,
        })
    }
}

/// Orchestrates extraction, story generation and the per-part media stages
pub struct StoryPipeline {
    config: StoryConfig,
    text: Arc<dyn TextGenerator>,
    image: Arc<dyn ImageGenerator>,
    voice: Option<Arc<dyn VoiceGenerator>>,
    retry: RetryPolicy,
    parts: TagExtractor,
    image_prompts: TagExtractor,
}

impl StoryPipeline {
    /// Create a pipeline over the given backends; configuration errors surface here
    pub fn new(
        config: StoryConfig,
        text: Arc<dyn TextGenerator>,
        image: Arc<dyn ImageGenerator>,
        voice: Option<Arc<dyn VoiceGenerator>>,
    ) -> Result<Self> {
        config.validate()?;

        let voice = if config.voice.enabled {
            if voice.is_none() {
                tracing::warn!("Voice is enabled but no voice backend was given; audio disabled");
            }
            voice
        } else {
            None
        };

        Ok(Self {
            retry: RetryPolicy::from_config(&config.retry),
            parts: TagExtractor::new(PART_TAG)?,
            image_prompts: TagExtractor::new(IMAGE_PROMPT_TAG)?,
            config,
            text,
            image,
            voice,
        })
    }

    /// Create a pipeline with the HTTP backends named by the configuration
    pub fn from_config(config: StoryConfig) -> Result<Self> {
        config.validate()?;
        config.validate_credentials()?;
        let backends = backends_from_config(&config)?;
        Self::new(config, backends.text, backends.image, backends.voice)
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &StoryConfig {
        &self.config
    }

    /// Run the whole pipeline on a file
    pub async fn run(&self, path: impl AsRef<Path>) -> RunReport {
        let path = path.as_ref();
        let source = path.display().to_string();

        match FileParser::extract_pages(path).await {
            Ok(extracted) => {
                let pages: Vec<String> = extracted.pages.iter().map(|p| p.content.clone()).collect();
                let filename = extracted.document.filename.clone();
                tracing::info!(
                    "{}: extracted {} page(s)",
                    filename,
                    extracted.document.page_count
                );
                self.process(&filename, Some(extracted.document), &pages).await
            }
            Err(e) => RunReport::new(&source, None).abort(DocumentStage::Extracted, e),
        }
    }

    /// Run the pipeline on already extracted page texts
    pub async fn run_pages<S: AsRef<str>>(&self, filename: &str, pages: &[S]) -> RunReport {
        self.process(filename, None, pages).await
    }

    async fn process<S: AsRef<str>>(
        &self,
        filename: &str,
        document: Option<Document>,
        pages: &[S],
    ) -> RunReport {
        let start = Instant::now();
        let mut report = RunReport::new(filename, document);

        let normalized = normalize_pages(pages);
        let text = normalized.join(" ");
        if text.is_empty() {
            return report.abort(
                DocumentStage::Normalized,
                Error::EmptyInput(format!("{} contains no usable text", filename)),
            );
        }
        report.stage = DocumentStage::Normalized;
        tracing::info!(
            "{}: normalized {} page(s), {} characters",
            filename,
            normalized.len(),
            text.chars().count()
        );

        let locale = match self.config.story.locale {
            Some(locale) => {
                tracing::info!("{}: using configured locale {}", filename, locale);
                locale
            }
            None => match detect_language(&text) {
                Ok(detection) => {
                    tracing::info!(
                        "{}: detected {} (confidence {:.2})",
                        filename,
                        detection.locale,
                        detection.confidence
                    );
                    detection.locale
                }
                Err(e) => return report.abort(DocumentStage::LanguageKnown, e),
            },
        };
        report.locale = Some(locale);
        report.stage = DocumentStage::LanguageKnown;

        match TextChunker::from_config(&self.config.chunking) {
            Ok(mut chunker) => report.chunks = chunker.chunk_pages(&normalized, filename),
            Err(e) => return report.abort(DocumentStage::LanguageKnown, e),
        }
        tracing::debug!("{}: {} chunk(s)", filename, report.chunks.len());

        let requested = self.config.story.parts;
        let prompt = PromptFormatter::story_prompt(locale, &text, requested);
        let prompt = prompt.as_str();
        let text_backend = &self.text;
        let story = match self
            .retry
            .run("story generation", move || text_backend.generate(prompt))
            .await
        {
            Ok(story) => story,
            Err(e) => return report.abort(DocumentStage::StoryGenerated, e),
        };
        report.stage = DocumentStage::StoryGenerated;
        tracing::info!(
            "{}: story generated by {} ({} characters)",
            filename,
            self.text.name(),
            story.chars().count()
        );

        let parts: Vec<StoryPart> = self
            .parts
            .extract_all(&story)
            .into_iter()
            .enumerate()
            .map(|(i, segment)| StoryPart::new(i + 1, segment))
            .collect();
        report.parts_extracted = parts.len();
        report.stage = DocumentStage::PartsExtracted;

        if parts.is_empty() {
            tracing::warn!("{}: story response contained no <{}> segments", filename, PART_TAG);
        } else if parts.len() != requested {
            tracing::info!(
                "{}: requested {} parts, model returned {}",
                filename,
                requested,
                parts.len()
            );
        }

        let image_locale = self.config.story.image_locale.unwrap_or(locale);
        let semaphore = Semaphore::new(self.config.processing.effective_parallel_parts());

        let outcomes = join_all(
            parts
                .into_iter()
                .map(|part| self.process_part_bounded(&semaphore, part, image_locale)),
        )
        .await;

        for outcome in outcomes {
            match outcome {
                PartOutcome::Assembled(record) => report.records.push(record),
                PartOutcome::Dropped(dropped) => report.dropped.push(dropped),
            }
        }

        report.stage = DocumentStage::Complete;
        tracing::info!(
            "{}: complete, {} record(s), {} dropped, {:.1}s",
            filename,
            report.records.len(),
            report.dropped.len(),
            start.elapsed().as_secs_f64()
        );
        report
    }

    async fn process_part_bounded(
        &self,
        semaphore: &Semaphore,
        part: StoryPart,
        image_locale: Locale,
    ) -> PartOutcome {
        let _permit = match semaphore.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                return PartOutcome::dropped(
                    &part,
                    PartStage::Pending,
                    Error::internal(format!("worker pool closed: {}", e)),
                )
            }
        };
        self.process_part(part, image_locale).await
    }

    /// Image prompt → image → optional narration for one part
    async fn process_part(&self, mut part: StoryPart, image_locale: Locale) -> PartOutcome {
        let index = part.index;
        tracing::debug!("Part {}: {:?}", index, PartStage::Pending);

        let prompt = PromptFormatter::image_prompt(image_locale, &part.story_text);
        let prompt = prompt.as_str();
        let text_backend = &self.text;
        let label = format!("image prompt generation (part {})", index);
        let response = match self
            .retry
            .run(&label, move || text_backend.generate(prompt))
            .await
        {
            Ok(response) => response,
            Err(e) => return PartOutcome::dropped(&part, PartStage::ImagePromptGenerated, e),
        };

        let image_prompt = ImagePrompt::from_extraction(self.image_prompts.extract_first(&response));
        if !image_prompt.found {
            if self.config.story.skip_missing_image_prompts {
                let error = Error::backend(
                    self.text.name(),
                    format!("response carried no <{}> tag", IMAGE_PROMPT_TAG),
                );
                return PartOutcome::dropped(&part, PartStage::ImagePromptGenerated, error);
            }
            tracing::warn!("Part {}: no <{}> tag, using sentinel prompt", index, IMAGE_PROMPT_TAG);
        }
        tracing::debug!("Part {}: {:?} ({})", index, PartStage::ImagePromptGenerated, image_prompt.text);

        let image_backend = &self.image;
        let image_config = &self.config.image;
        let prompt_text = image_prompt.text.as_str();
        let label = format!("image generation (part {})", index);
        // Each attempt draws its own seed
        let image = match self
            .retry
            .run(&label, move || {
                let request = ImageRequest::from_config(prompt_text, image_config);
                tracing::debug!("Part {}: image attempt with seed {}", index, request.seed);
                async move { image_backend.generate_image(&request).await }
            })
            .await
        {
            Ok(base64_data) => GeneratedImage {
                story_part_index: index,
                base64_data,
            },
            Err(e) => return PartOutcome::dropped(&part, PartStage::ImageGenerated, e),
        };
        part.image_prompt = Some(image_prompt);
        tracing::debug!("Part {}: {:?}", index, PartStage::ImageGenerated);

        let audio = match &self.voice {
            Some(voice_backend) => {
                let request = VoiceRequest::from_config(&part.story_text, &self.config.voice);
                let request_ref = &request;
                let label = format!("voice generation (part {})", index);
                match self
                    .retry
                    .run(&label, move || voice_backend.synthesize(request_ref))
                    .await
                {
                    Ok(bytes) => {
                        tracing::debug!("Part {}: {:?} ({} bytes)", index, PartStage::AudioGenerated, bytes.len());
                        Some(GeneratedAudio {
                            story_part_index: index,
                            base64_data: base64::engine::general_purpose::STANDARD.encode(&bytes),
                        })
                    }
                    Err(e) => return PartOutcome::dropped(&part, PartStage::AudioGenerated, e),
                }
            }
            None => None,
        };

        tracing::info!("Part {}: {}", index, PartStage::Assembled);
        PartOutcome::Assembled(FinalRecord::assemble(&part, image, audio))
    }
}
