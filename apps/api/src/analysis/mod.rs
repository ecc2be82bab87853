// Resume analysis: one document in, one ResumeAnalysisResult out.
// All model calls go through llm_client — no direct HTTP here.

pub mod client;
pub mod prompts;
pub mod schema;

pub use client::{AnalysisError, GeminiResumeAnalyzer, ResumeAnalyzer};
