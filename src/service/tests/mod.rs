//! Service test suites, organised by component

mod groups;
mod helpers;
mod metrics;
