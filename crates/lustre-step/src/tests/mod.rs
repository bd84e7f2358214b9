//! Test suites for lustre-step.

mod filtering;
pub(crate) mod support;
