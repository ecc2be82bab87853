// Shared prompt fragments. Each service that calls the model defines its own
// prompts.rs alongside it and appends these where needed.

/// Closing line for any prompt paired with a `responseSchema`.
pub const STRICT_JSON_INSTRUCTION: &str =
    "Return the result strictly in JSON format matching the provided schema.";

/// Temperature for extraction-style calls: factual, consistent JSON over creativity.
pub const EXTRACTION_TEMPERATURE: f32 = 0.4;
