use std::time::Duration;

use crate::{
    analyzer,
    assembler::assemble_batch,
    config::Config,
    cost,
    error::{LuminaError, Result},
    executor::BoundedExecutor,
    logger,
    models::{
        CostEstimate, EncodedImage, GenerationBatch, GenerationOutcome, GenerationRequest,
        PlanControls, MAX_UNITS,
    },
    planner::{plan_batch, GroupSizer},
    service::ImageService,
};

/// Plans a run, fans it out to the image service and assembles the batch.
///
/// Holds no state between runs; history belongs to the caller.
pub struct BatchOrchestrator<S> {
    service: S,
    executor: BoundedExecutor,
    unit_timeout: Option<Duration>,
}

impl<S: ImageService> BatchOrchestrator<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            executor: BoundedExecutor::default(),
            unit_timeout: None,
        }
    }

    pub fn from_config(service: S, config: &Config) -> Self {
        let mut orchestrator = Self::new(service).with_concurrency(config.max_concurrency);
        orchestrator.unit_timeout = config.unit_timeout;
        orchestrator
    }

    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.executor = BoundedExecutor::new(limit);
        self
    }

    /// Units still pending after `timeout` are recorded as failures.
    pub fn with_unit_timeout(mut self, timeout: Duration) -> Self {
        self.unit_timeout = Some(timeout);
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn concurrency(&self) -> usize {
        self.executor.limit()
    }

    pub fn estimate_cost(&self, controls: &PlanControls) -> CostEstimate {
        cost::estimate_cost(controls)
    }

    /// Prompt suggestion for a fresh upload; see [`analyzer::autofill_prompt`].
    pub async fn suggest_prompt(
        &self,
        current_prompt: &str,
        uploaded: &[EncodedImage],
    ) -> Option<String> {
        analyzer::autofill_prompt(&self.service, current_prompt, uploaded).await
    }

    pub async fn plan_and_generate(
        &self,
        request: &GenerationRequest,
        controls: &PlanControls,
        sizer: &mut dyn GroupSizer,
    ) -> Result<GenerationBatch> {
        request.validate()?;

        let plan = plan_batch(controls, sizer);
        if plan.was_capped() {
            log::warn!(
                "Requested {} images, capped at {}",
                plan.requested_units(),
                plan.unit_count
            );
        }

        self.generate(request, plan.unit_count as usize).await
    }

    /// Runs `unit_count` units for an already planned request, capped at the
    /// batch ceiling.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        unit_count: usize,
    ) -> Result<GenerationBatch> {
        request.validate()?;
        let unit_count = cap_units(unit_count);

        let _timer = logger::timer("batch generation");
        log::info!(
            "Generating {} images ({}, {}, {} references) via {}",
            unit_count,
            request.mode,
            request.aspect_ratio,
            request.references.len(),
            self.service.name()
        );

        let outcomes = self.run_units(request, unit_count).await;
        let failures = outcomes.iter().filter(|o| !o.is_success()).count();
        let urls: Vec<String> = outcomes
            .into_iter()
            .filter_map(GenerationOutcome::into_url)
            .collect();

        if urls.is_empty() {
            log::error!("All {} generation units failed", unit_count);
        } else if failures > 0 {
            log::warn!("{} of {} units failed", failures, unit_count);
        }

        assemble_batch(
            &request.prompt,
            request.mode,
            request.aspect_ratio,
            request.references.len(),
            unit_count,
            urls,
        )
    }

    /// Every unit settles to an outcome; nothing here returns early. At most
    /// `MAX_UNITS` units are dispatched.
    pub async fn run_units(
        &self,
        request: &GenerationRequest,
        unit_count: usize,
    ) -> Vec<GenerationOutcome> {
        let unit_count = cap_units(unit_count);
        let step = (unit_count / 10).max(1);
        self.executor
            .run_with_progress(
                (0..unit_count).collect::<Vec<usize>>(),
                |index, _| self.generate_unit(index, request),
                |done, total| {
                    if done == total || done % step == 0 {
                        log::info!("Settled {}/{} units", done, total);
                    }
                },
            )
            .await
    }

    async fn generate_unit(&self, index: usize, request: &GenerationRequest) -> GenerationOutcome {
        let call = self
            .service
            .generate(&request.prompt, &request.references, request.aspect_ratio);

        let result = match self.unit_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(LuminaError::TransportError(format!(
                    "timed out after {:?}",
                    timeout
                ))),
            },
            None => call.await,
        };

        match result {
            Ok(Some(image)) => GenerationOutcome::Success(image.to_data_url()),
            Ok(None) => {
                log::warn!("Unit {} returned no image data", index);
                GenerationOutcome::Failure("response contained no image".to_string())
            }
            Err(e) => {
                log::warn!("Failed to generate image {}: {}", index, e);
                GenerationOutcome::Failure(e.to_string())
            }
        }
    }
}

fn cap_units(unit_count: usize) -> usize {
    let ceiling = MAX_UNITS as usize;
    if unit_count > ceiling {
        log::warn!("Requested {} images, capped at {}", unit_count, ceiling);
        ceiling
    } else {
        unit_count
    }
}
