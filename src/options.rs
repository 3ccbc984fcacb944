// src/options.rs
use crate::error::{SdeError, SdeResult};
use crate::events::{EventFunction, EventLocation};
use crate::rng::RandomSource;
use bitflags::bitflags;

bitflags! {
    /// Optional outputs on top of the trajectory, which is always produced
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OutputRequest: u32 {
        const NONE   = 0;
        const NOISE  = 1 << 0;
        const EVENTS = 1 << 1;
    }
}

/// Per-run configuration
pub struct SdeOptions {
    /// Seed for the default standard-normal source; entropy when `None`
    pub seed: Option<u64>,
    /// Replaces the default source, e.g. for deterministic tests
    pub rand_fn: Option<Box<dyn RandomSource>>,
    pub events: Option<Box<dyn EventFunction>>,
    pub event_location: EventLocation,
    pub outputs: OutputRequest,
    /// Accepted for interface parity; additive noise makes it a no-op
    pub stratonovich: bool,
}

impl SdeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_rand_fn<R: RandomSource + 'static>(mut self, source: R) -> Self {
        self.rand_fn = Some(Box::new(source));
        self
    }

    pub fn with_events<E: EventFunction + 'static>(mut self, events: E) -> Self {
        self.events = Some(Box::new(events));
        self
    }

    pub fn with_event_location(mut self, location: EventLocation) -> Self {
        self.event_location = location;
        self
    }

    pub fn with_outputs(mut self, outputs: OutputRequest) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_stratonovich(mut self, stratonovich: bool) -> Self {
        self.stratonovich = stratonovich;
        self
    }

    /// True when draws come from a caller-supplied source
    pub fn user_generator(&self) -> bool {
        self.rand_fn
            .as_ref()
            .map_or(false, |source| source.is_user_supplied())
    }

    /// Validate the requested outputs against what is configured
    pub fn validate(&self) -> SdeResult<()> {
        if self.outputs.contains(OutputRequest::EVENTS) && self.events.is_none() {
            return Err(SdeError::TooManyOutputsRequested {
                requested: "events".to_string(),
                reason: "no event function is configured".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for SdeOptions {
    fn default() -> Self {
        SdeOptions {
            seed: None,
            rand_fn: None,
            events: None,
            event_location: EventLocation::Sample,
            outputs: OutputRequest::NONE,
            stratonovich: false,
        }
    }
}
