//! In-process image service for offline runs and tests.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::{
    error::{LuminaError, Result},
    models::{AspectRatio, EncodedImage},
    service::ImageService,
};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Clone)]
enum AnalysisBehavior {
    Reply(String),
    Empty,
    Fail,
}

/// Deterministic stand-in for a remote service.
///
/// Generation calls are numbered from zero in the order they reach the
/// service. Chosen call numbers can be scripted to fail or to come back
/// without an image. Call counts and the peak number of overlapping calls are
/// recorded.
#[derive(Debug)]
pub struct MockImageService {
    latency: Duration,
    failing_calls: HashSet<usize>,
    imageless_calls: HashSet<usize>,
    fail_all: bool,
    analysis: AnalysisBehavior,
    generate_calls: AtomicUsize,
    analyze_calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl Default for MockImageService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockImageService {
    pub fn new() -> Self {
        Self {
            latency: Duration::from_millis(0),
            failing_calls: HashSet::new(),
            imageless_calls: HashSet::new(),
            fail_all: false,
            analysis: AnalysisBehavior::Reply(
                "A cinematic portrait in soft golden-hour light, shallow depth of field, \
                 eye-level camera angle, the subject framed against a blurred city street"
                    .to_string(),
            ),
            generate_calls: AtomicUsize::new(0),
            analyze_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_failing_calls(mut self, calls: impl IntoIterator<Item = usize>) -> Self {
        self.failing_calls.extend(calls);
        self
    }

    pub fn with_imageless_calls(mut self, calls: impl IntoIterator<Item = usize>) -> Self {
        self.imageless_calls.extend(calls);
        self
    }

    pub fn failing_everything(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn with_analysis(mut self, text: impl Into<String>) -> Self {
        self.analysis = AnalysisBehavior::Reply(text.into());
        self
    }

    pub fn with_empty_analysis(mut self) -> Self {
        self.analysis = AnalysisBehavior::Empty;
        self
    }

    pub fn with_failing_analysis(mut self) -> Self {
        self.analysis = AnalysisBehavior::Fail;
        self
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.generate_calls() + self.analyze_calls()
    }

    /// Highest number of generation calls that were running at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if self.latency.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl ImageService for MockImageService {
    async fn analyze(&self, image: &EncodedImage, _instruction: &str) -> Result<String> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        match &self.analysis {
            AnalysisBehavior::Reply(text) => {
                log::debug!("Mock analysis of {} byte {}", image.len(), image.media_type);
                Ok(text.clone())
            }
            AnalysisBehavior::Empty => Ok(String::new()),
            AnalysisBehavior::Fail => Err(LuminaError::TransportError(
                "mock analysis endpoint unavailable".into(),
            )),
        }
    }

    async fn generate(
        &self,
        prompt: &str,
        references: &[EncodedImage],
        aspect_ratio: AspectRatio,
    ) -> Result<Option<EncodedImage>> {
        let call = self.generate_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        self.simulate_latency().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_all || self.failing_calls.contains(&call) {
            return Err(LuminaError::TransportError(format!(
                "mock generation call {} failed",
                call
            )));
        }
        if self.imageless_calls.contains(&call) {
            return Ok(None);
        }

        log::trace!(
            "Mock generation {} for '{}' ({} references, {})",
            call,
            prompt,
            references.len(),
            aspect_ratio
        );

        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&(call as u64).to_be_bytes());
        Ok(Some(EncodedImage::new(data, "image/png")))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
