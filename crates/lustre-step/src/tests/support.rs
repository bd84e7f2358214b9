//! Shared fixtures for step tests.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rstest::fixture;

use crate::{BoxError, FileContext, Formatter, FormatterFunc, Lint, StandardStep, StepError};

/// Counts how often each lazy phase of a step runs.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    computed: AtomicUsize,
    built: AtomicUsize,
    released: AtomicUsize,
}

impl Counters {
    pub(crate) fn computed(&self) -> usize {
        self.computed.load(Ordering::SeqCst)
    }

    pub(crate) fn built(&self) -> usize {
        self.built.load(Ordering::SeqCst)
    }

    pub(crate) fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub(crate) fn record_computation(&self) {
        self.computed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_build(&self) {
        self.built.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn releaser(self: &Arc<Self>) -> impl FnOnce() + Send + 'static {
        let shared = Arc::clone(self);
        move || {
            shared.released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[fixture]
pub(crate) fn counters() -> Arc<Counters> {
    Arc::new(Counters::default())
}

/// Appends a suffix to the text; rejects input containing `bad`; flags tabs
/// when linting.
#[derive(Debug, Clone)]
pub(crate) struct Suffix(pub(crate) String);

impl FormatterFunc for Suffix {
    fn apply(&self, text: &str, _file: &FileContext) -> Result<String, StepError> {
        if text.contains("bad") {
            return Err(StepError::transform("input rejected"));
        }
        if text.ends_with(self.0.as_str()) {
            return Ok(text.to_owned());
        }
        Ok(format!("{text}{}", self.0))
    }

    fn lint(&self, text: &str, _file: &FileContext) -> Result<Vec<Lint>, StepError> {
        let mut lints = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.contains('\t') {
                let number = u32::try_from(index + 1).map_err(StepError::transform)?;
                lints.push(Lint::at_line(number, "no-tabs", "tab character found")?);
            }
        }
        Ok(lints)
    }
}

/// A step whose state is `suffix` and whose formatter appends it.
pub(crate) fn suffix_step(
    name: &str,
    counters: &Arc<Counters>,
    suffix: &str,
    closeable: bool,
) -> StandardStep<String> {
    let configured = suffix.to_owned();
    let computations = Arc::clone(counters);
    let builds = Arc::clone(counters);
    StandardStep::new(
        name,
        move || {
            computations.record_computation();
            Ok(configured.clone())
        },
        move |state: &String| {
            builds.record_build();
            let func = Suffix(state.clone());
            let formatter = if closeable {
                Formatter::closeable(func, builds.releaser())
            } else {
                Formatter::new(func)
            };
            Ok::<Formatter, BoxError>(formatter)
        },
    )
    .expect("valid step")
}

pub(crate) fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
