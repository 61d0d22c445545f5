//! Cross-module tests for the ingest and answer flows.

mod pipeline_flow;
