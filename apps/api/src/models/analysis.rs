use serde::{Deserialize, Serialize};

/// Upper bound of `matchScore`.
pub const MAX_MATCH_SCORE: u8 = 100;

/// A synthesized job listing as returned by the model.
/// Every field is required; content is taken at face value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub employment_type: String,
    pub work_mode: String,
    pub salary: String,
    pub match_score: u8, // 0 – 100
    pub match_reason: String,
    pub posted_at: String, // relative, e.g. "2 days ago"
}

/// The structured output of one successful analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAnalysisResult {
    pub candidate_name: String,
    pub professional_summary: String,
    pub extracted_skills: Vec<String>,
    pub recommended_jobs: Vec<JobListing>,
}

/// How strongly a listing matches, as shown on the job card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Top,    // ≥ 90
    Strong, // 75 – 89
    Fair,
}

impl MatchTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => MatchTier::Top,
            75..=89 => MatchTier::Strong,
            _ => MatchTier::Fair,
        }
    }
}
