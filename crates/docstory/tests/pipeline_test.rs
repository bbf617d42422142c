//! End-to-end pipeline runs against in-process fake backends

use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use docstory::config::{BackoffStrategy, RetryConfig};
use docstory::providers::{
    ImageGenerator, ImageRequest, TextGenerator, VoiceGenerator, VoiceRequest,
};
use docstory::{
    DocumentStage, Error, ImagePrompt, Locale, PartStage, Result, RetryPolicy, StoryConfig,
    StoryPipeline,
};

const LESSON: &str = "The Romans built long straight roads across their empire. \
    Soldiers and merchants travelled on these roads every day.";

fn encode(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}

/// Segment embedded in an image prompt request
fn story_segment(prompt: &str) -> &str {
    prompt
        .split("<story_segment>")
        .nth(1)
        .and_then(|rest| rest.split("</story_segment>").next())
        .map(str::trim)
        .unwrap_or("")
}

struct FakeText {
    story: Result<String>,
    tag_image_prompts: bool,
    calls: AtomicU32,
}

impl FakeText {
    fn story(story: &str) -> Self {
        Self {
            story: Ok(story.to_string()),
            tag_image_prompts: true,
            calls: AtomicU32::new(0),
        }
    }

    fn parts(texts: &[&str]) -> Self {
        let story: String = texts
            .iter()
            .map(|t| format!("<part>\n{}\n</part>\n", t))
            .collect();
        Self::story(&format!("Here is the story.\n\n{}", story))
    }
}

#[async_trait]
impl TextGenerator for FakeText {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if prompt.contains("<educational_content>") {
            return match &self.story {
                Ok(story) => Ok(story.clone()),
                Err(_) => Err(Error::backend("fake-text", "HTTP 500")),
            };
        }

        let segment = story_segment(prompt);
        if self.tag_image_prompts {
            Ok(format!("Sure!\n<image_prompt>\npicture of {}\n</image_prompt>", segment))
        } else {
            Ok(format!("picture of {}", segment))
        }
    }

    fn name(&self) -> &str {
        "fake-text"
    }

    fn model(&self) -> &str {
        "fake"
    }
}

#[derive(Default)]
struct FakeImage {
    prompts: Mutex<Vec<String>>,
    seeds: Mutex<Vec<u32>>,
}

#[async_trait]
impl ImageGenerator for FakeImage {
    async fn generate_image(&self, request: &ImageRequest) -> Result<String> {
        self.prompts.lock().push(request.prompt.clone());
        let attempt = {
            let mut seeds = self.seeds.lock();
            seeds.push(request.seed);
            seeds.len()
        };

        if request.prompt.contains("FLAKY") && attempt <= 2 {
            return Err(Error::timeout("fake-image stalled"));
        }

        // earlier parts finish last
        if request.prompt.contains("One") {
            tokio::time::sleep(Duration::from_millis(30)).await;
        }

        if request.prompt.contains("FAIL") {
            return Err(Error::backend("fake-image", "HTTP 400: content filtered"));
        }
        Ok(encode(request.prompt.as_bytes()))
    }

    fn name(&self) -> &str {
        "fake-image"
    }
}

enum VoiceBehavior {
    Succeed,
    TimeOut,
    Reject,
}

struct FakeVoice {
    behavior: VoiceBehavior,
    calls: AtomicU32,
}

impl FakeVoice {
    fn new(behavior: VoiceBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl VoiceGenerator for FakeVoice {
    async fn synthesize(&self, request: &VoiceRequest) -> Result<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            VoiceBehavior::Succeed => Ok(Bytes::from(format!("mp3:{}", request.text))),
            VoiceBehavior::TimeOut => Err(Error::timeout("connect timed out")),
            VoiceBehavior::Reject => Err(Error::backend("fake-voice", "HTTP 401")),
        }
    }

    fn name(&self) -> &str {
        "fake-voice"
    }
}

fn test_config() -> StoryConfig {
    let mut config = StoryConfig::default();
    config.story.locale = Some(Locale::English);
    config.story.parts = 3;
    config.voice.enabled = false;
    config.processing.parallel_parts = Some(3);
    config
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy::from_config(&RetryConfig {
        max_attempts: 3,
        backoff: BackoffStrategy::Fixed,
        initial_delay_ms: 0,
        max_delay_ms: 0,
        attempt_timeout_secs: 0,
    })
}

fn pipeline(
    config: StoryConfig,
    text: Arc<FakeText>,
    image: Arc<FakeImage>,
    voice: Option<Arc<FakeVoice>>,
) -> StoryPipeline {
    let voice = voice.map(|v| v as Arc<dyn VoiceGenerator>);
    StoryPipeline::new(config, text, image, voice)
        .unwrap()
        .with_retry_policy(fast_retry())
}

#[tokio::test]
async fn test_three_parts_in_story_order() {
    let text = Arc::new(FakeText::parts(&["One", "Two", "Three"]));
    let image = Arc::new(FakeImage::default());
    let pipeline = pipeline(test_config(), text.clone(), image.clone(), None);

    let report = pipeline.run_pages("roads.txt", &[LESSON]).await;

    assert_eq!(report.stage, DocumentStage::Complete);
    assert!(report.failure.is_none());
    assert_eq!(report.parts_extracted, 3);
    let stories: Vec<&str> = report.records.iter().map(|r| r.story.as_str()).collect();
    assert_eq!(stories, vec!["One", "Two", "Three"]);
    assert_eq!(report.records[0].img, encode(b"picture of One"));
    assert!(report.records.iter().all(|r| r.audio.is_none()));
    // one story call plus one image prompt call per part
    assert_eq!(text.calls.load(Ordering::SeqCst), 4);
    assert!(!report.chunks.is_empty());
}

#[tokio::test]
async fn test_image_failure_drops_only_that_part() {
    let text = Arc::new(FakeText::parts(&["One", "Two FAIL", "Three"]));
    let image = Arc::new(FakeImage::default());
    let pipeline = pipeline(test_config(), text, image.clone(), None);

    let report = pipeline.run_pages("roads.txt", &[LESSON]).await;

    assert!(report.is_complete());
    let stories: Vec<&str> = report.records.iter().map(|r| r.story.as_str()).collect();
    assert_eq!(stories, vec!["One", "Three"]);
    assert_eq!(report.dropped.len(), 1);
    assert_eq!(report.dropped[0].index, 2);
    assert_eq!(report.dropped[0].stage, PartStage::ImageGenerated);
    // permanent failure, tried once
    assert_eq!(image.prompts.lock().len(), 3);
}

#[tokio::test]
async fn test_image_retries_draw_a_fresh_seed() {
    let text = Arc::new(FakeText::parts(&["Only FLAKY part"]));
    let image = Arc::new(FakeImage::default());
    let pipeline = pipeline(test_config(), text, image.clone(), None);

    let report = pipeline.run_pages("roads.txt", &[LESSON]).await;

    assert_eq!(report.records.len(), 1);
    assert!(report.dropped.is_empty());
    let seeds = image.seeds.lock().clone();
    assert_eq!(seeds.len(), 3);
    assert!(
        seeds.iter().any(|s| *s != seeds[0]),
        "every attempt reused seed {}",
        seeds[0]
    );
}

#[tokio::test]
async fn test_voice_timeouts_are_retried_then_part_dropped() {
    let mut config = test_config();
    config.voice.enabled = true;
    let text = Arc::new(FakeText::parts(&["Only part"]));
    let voice = Arc::new(FakeVoice::new(VoiceBehavior::TimeOut));
    let pipeline = pipeline(config, text, Arc::new(FakeImage::default()), Some(voice.clone()));

    let report = pipeline.run_pages("roads.txt", &[LESSON]).await;

    assert_eq!(voice.calls.load(Ordering::SeqCst), 3);
    assert!(report.records.is_empty());
    assert_eq!(report.dropped.len(), 1);
    assert_eq!(report.dropped[0].stage, PartStage::AudioGenerated);
    assert!(matches!(
        report.dropped[0].error,
        Error::RetriesExhausted { attempts: 3, .. }
    ));
    assert!(report.is_complete());
}

#[tokio::test]
async fn test_voice_permanent_error_is_not_retried() {
    let mut config = test_config();
    config.voice.enabled = true;
    let text = Arc::new(FakeText::parts(&["Only part"]));
    let voice = Arc::new(FakeVoice::new(VoiceBehavior::Reject));
    let pipeline = pipeline(config, text, Arc::new(FakeImage::default()), Some(voice.clone()));

    let report = pipeline.run_pages("roads.txt", &[LESSON]).await;

    assert_eq!(voice.calls.load(Ordering::SeqCst), 1);
    assert!(matches!(report.dropped[0].error, Error::Backend { .. }));
}

#[tokio::test]
async fn test_audio_is_base64_of_synthesized_bytes() {
    let mut config = test_config();
    config.voice.enabled = true;
    let text = Arc::new(FakeText::parts(&["One", "Two"]));
    let voice = Arc::new(FakeVoice::new(VoiceBehavior::Succeed));
    let pipeline = pipeline(config, text, Arc::new(FakeImage::default()), Some(voice));

    let report = pipeline.run_pages("roads.txt", &[LESSON]).await;

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[1].audio.as_deref(), Some(encode(b"mp3:Two").as_str()));
}

#[tokio::test]
async fn test_disabled_voice_ignores_voice_backend() {
    let text = Arc::new(FakeText::parts(&["One"]));
    let voice = Arc::new(FakeVoice::new(VoiceBehavior::Succeed));
    let pipeline = pipeline(test_config(), text, Arc::new(FakeImage::default()), Some(voice.clone()));

    let report = pipeline.run_pages("roads.txt", &[LESSON]).await;

    assert_eq!(voice.calls.load(Ordering::SeqCst), 0);
    assert!(report.records[0].audio.is_none());
}

#[tokio::test]
async fn test_story_without_tags_completes_with_zero_records() {
    let text = Arc::new(FakeText::story("I could not follow the format, sorry."));
    let image = Arc::new(FakeImage::default());
    let pipeline = pipeline(test_config(), text, image.clone(), None);

    let report = pipeline.run_pages("roads.txt", &[LESSON]).await;

    assert_eq!(report.stage, DocumentStage::Complete);
    assert_eq!(report.parts_extracted, 0);
    assert!(report.records.is_empty());
    assert!(image.prompts.lock().is_empty());
}

#[tokio::test]
async fn test_missing_image_prompt_tag_uses_sentinel() {
    let mut fake = FakeText::parts(&["One", "Two"]);
    fake.tag_image_prompts = false;
    let image = Arc::new(FakeImage::default());
    let pipeline = pipeline(test_config(), Arc::new(fake), image.clone(), None);

    let report = pipeline.run_pages("roads.txt", &[LESSON]).await;

    assert_eq!(report.records.len(), 2);
    let prompts = image.prompts.lock();
    assert_eq!(prompts.len(), 2);
    assert!(prompts.iter().all(|p| p.as_str() == ImagePrompt::NOT_FOUND));
}

#[tokio::test]
async fn test_missing_image_prompt_tag_can_drop_part() {
    let mut config = test_config();
    config.story.skip_missing_image_prompts = true;
    let mut fake = FakeText::parts(&["One"]);
    fake.tag_image_prompts = false;
    let image = Arc::new(FakeImage::default());
    let pipeline = pipeline(config, Arc::new(fake), image.clone(), None);

    let report = pipeline.run_pages("roads.txt", &[LESSON]).await;

    assert!(report.records.is_empty());
    assert_eq!(report.dropped[0].stage, PartStage::ImagePromptGenerated);
    assert!(image.prompts.lock().is_empty());
}

#[tokio::test]
async fn test_unsupported_language_aborts_before_generation() {
    let mut config = test_config();
    config.story.locale = None;
    let text = Arc::new(FakeText::parts(&["One"]));
    let pipeline = pipeline(config, text.clone(), Arc::new(FakeImage::default()), None);

    let german = "Die Römer bauten lange und gerade Straßen durch ihr ganzes Reich. \
        Soldaten und Händler reisten jeden Tag auf diesen Straßen, und viele dieser \
        Straßen werden noch heute benutzt.";
    let report = pipeline.run_pages("strassen.txt", &[german]).await;

    assert_eq!(report.stage, DocumentStage::Aborted);
    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.stage, DocumentStage::LanguageKnown);
    assert!(matches!(failure.error, Error::UnsupportedLanguage(_)));
    assert_eq!(text.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_detected_language_drives_templates() {
    let mut config = test_config();
    config.story.locale = None;
    let text = Arc::new(FakeText::parts(&["Um"]));
    let pipeline = pipeline(config, text, Arc::new(FakeImage::default()), None);

    let portuguese = "Os romanos construíram estradas longas e retas por todo o império. \
        Soldados e comerciantes viajavam por essas estradas todos os dias, e muitas \
        delas ainda são usadas hoje.";
    let report = pipeline.run_pages("estradas.txt", &[portuguese]).await;

    assert_eq!(report.locale, Some(Locale::Portuguese));
    assert_eq!(report.records.len(), 1);
}

#[tokio::test]
async fn test_empty_text_aborts() {
    let text = Arc::new(FakeText::parts(&["One"]));
    let pipeline = pipeline(test_config(), text.clone(), Arc::new(FakeImage::default()), None);

    let report = pipeline.run_pages("blank.txt", &["   \n\t ", "@@@ ###"]).await;

    assert_eq!(report.stage, DocumentStage::Aborted);
    assert!(matches!(
        report.failure.as_ref().map(|f| &f.error),
        Some(Error::EmptyInput(_))
    ));
    assert_eq!(text.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_story_generation_failure_aborts() {
    let text = Arc::new(FakeText {
        story: Err(Error::backend("fake-text", "down")),
        tag_image_prompts: true,
        calls: AtomicU32::new(0),
    });
    let pipeline = pipeline(test_config(), text.clone(), Arc::new(FakeImage::default()), None);

    let report = pipeline.run_pages("roads.txt", &[LESSON]).await;

    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.stage, DocumentStage::StoryGenerated);
    assert!(report.records.is_empty());
    // permanent backend error, no retry
    assert_eq!(text.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_run_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roads.md");
    std::fs::write(&path, format!("# Roads\n\n{}", LESSON)).unwrap();

    let text = Arc::new(FakeText::parts(&["One", "Two"]));
    let pipeline = pipeline(test_config(), text, Arc::new(FakeImage::default()), None);

    let report = pipeline.run(&path).await;

    assert!(report.is_complete());
    let document = report.document.as_ref().unwrap();
    assert_eq!(document.filename, "roads.md");
    assert_eq!(document.page_count, 1);
    assert!(report.chunks.iter().all(|c| c.source_filename == "roads.md"));
    assert_eq!(report.records.len(), 2);
}

#[tokio::test]
async fn test_missing_file_aborts_at_extraction() {
    let text = Arc::new(FakeText::parts(&["One"]));
    let pipeline = pipeline(test_config(), text, Arc::new(FakeImage::default()), None);

    let report = pipeline.run("/no/such/lesson.pdf").await;

    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.stage, DocumentStage::Extracted);
    assert!(matches!(failure.error, Error::Io(_)));
}

#[test]
fn test_invalid_chunking_rejected_at_construction() {
    let mut config = test_config();
    config.chunking.chunk_size = 100;
    config.chunking.chunk_overlap = 100;
    let text = Arc::new(FakeText::parts(&["One"]));

    let result = StoryPipeline::new(config, text.clone(), Arc::new(FakeImage::default()), None);

    assert!(matches!(result, Err(Error::Config(_))));
    assert_eq!(text.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_blocking_run_with_tokio_test() {
    let text = Arc::new(FakeText::parts(&["One"]));
    let pipeline = pipeline(test_config(), text, Arc::new(FakeImage::default()), None);

    let report = tokio_test::block_on(pipeline.run_pages("roads.txt", &[LESSON]));

    assert_eq!(report.records.len(), 1);
}
