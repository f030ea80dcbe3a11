//! Mock implementations for testing.
//!
//! These mocks implement the [`Encoder`](crate::encoder::Encoder) and
//! [`ClipAnalyzer`](crate::analysis::ClipAnalyzer) traits with controllable
//! behavior so scheduler and front-end tests can run without the external
//! tools installed.

mod mock_analyzer;
mod mock_encoder;

pub use mock_analyzer::MockAnalyzer;
pub use mock_encoder::MockEncoder;
