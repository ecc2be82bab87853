//! View model served to the browser page. The page draws exactly what is
//! here; no state is derived client-side.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::analysis::{JobListing, MatchTier, ResumeAnalysisResult};
use crate::view::controller::ViewState;

/// Shown when the model could not find a name on the resume.
const FALLBACK_NAME: &str = "Candidate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Analyzing,
    Results,
    Error,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub state: Phase,
    pub analysis_id: Option<Uuid>,
    pub file_name: Option<String>,
    pub message: Option<String>,
    /// False while analyzing or showing results; the page disables its uploader.
    pub accepts_upload: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub results: Option<ResultsView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
    pub profile: ProfileView,
    pub jobs: Vec<JobCardView>,
    pub skill_count: usize,
    pub job_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub greeting_name: String,
    pub summary: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCardView {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location_line: String,
    pub employment_type: String,
    pub salary: String,
    pub match_score: u8,
    pub match_tier: MatchTier,
    pub top_match: bool,
    pub match_reason: String,
    pub posted_at: String,
}

pub fn render(state: &ViewState) -> ViewModel {
    let mut view = ViewModel {
        state: Phase::Idle,
        analysis_id: None,
        file_name: None,
        message: None,
        accepts_upload: state.accepts_upload(),
        started_at: None,
        finished_at: None,
        results: None,
    };

    match state {
        ViewState::Idle => {}
        ViewState::Analyzing {
            ticket,
            file_name,
            started_at,
        } => {
            view.state = Phase::Analyzing;
            view.analysis_id = Some(*ticket);
            view.file_name = file_name.clone();
            view.started_at = Some(*started_at);
        }
        ViewState::Results {
            ticket,
            file_name,
            result,
            started_at,
            finished_at,
        } => {
            view.state = Phase::Results;
            view.analysis_id = Some(*ticket);
            view.file_name = file_name.clone();
            view.started_at = Some(*started_at);
            view.finished_at = Some(*finished_at);
            view.results = Some(render_results(result));
        }
        ViewState::Error { message } => {
            view.state = Phase::Error;
            view.message = Some(message.clone());
        }
    }

    view
}

fn render_results(result: &ResumeAnalysisResult) -> ResultsView {
    let greeting_name = match result.candidate_name.trim() {
        "" => FALLBACK_NAME.to_string(),
        name => name.to_string(),
    };

    ResultsView {
        profile: ProfileView {
            greeting_name,
            summary: result.professional_summary.clone(),
            skills: result.extracted_skills.clone(),
        },
        jobs: result.recommended_jobs.iter().map(render_job).collect(),
        skill_count: result.extracted_skills.len(),
        job_count: result.recommended_jobs.len(),
    }
}

fn render_job(job: &JobListing) -> JobCardView {
    let match_tier = MatchTier::from_score(job.match_score);
    JobCardView {
        id: job.id.clone(),
        title: job.title.clone(),
        company: job.company.clone(),
        location_line: format!("{} ({})", job.location, job.work_mode),
        employment_type: job.employment_type.clone(),
        salary: job.salary.clone(),
        match_score: job.match_score,
        match_tier,
        top_match: match_tier == MatchTier::Top,
        match_reason: job.match_reason.clone(),
        posted_at: job.posted_at.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::client::fixtures::analysis_json;
    use crate::analysis::client::parse_analysis;
    use std::sync::Arc;

    fn results_state(name: &str) -> ViewState {
        let mut value = analysis_json(12, 7);
        value["candidateName"] = name.into();
        ViewState::Results {
            ticket: Uuid::new_v4(),
            file_name: Some("resume.pdf".to_string()),
            result: Arc::new(parse_analysis(&value.to_string()).unwrap()),
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_results_counts() {
        let view = render(&results_state("Ada Lovelace"));
        assert_eq!(view.state, Phase::Results);
        assert!(!view.accepts_upload);

        let results = view.results.unwrap();
        assert_eq!(results.skill_count, 12);
        assert_eq!(results.profile.skills.len(), 12);
        assert_eq!(results.job_count, 7);
        assert_eq!(results.jobs.len(), 7);
        assert_eq!(results.profile.greeting_name, "Ada Lovelace");
    }

    #[test]
    fn test_render_keeps_job_order_and_tiers() {
        let results = render(&results_state("Ada")).results.unwrap();
        let ids: Vec<&str> = results.jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(
            ids,
            ["job-0", "job-1", "job-2", "job-3", "job-4", "job-5", "job-6"]
        );

        // Fixture scores run 70, 74, 78, …, 94.
        assert_eq!(results.jobs[0].match_tier, MatchTier::Fair);
        assert_eq!(results.jobs[2].match_tier, MatchTier::Strong);
        assert!(results.jobs[6].top_match);
        assert_eq!(results.jobs[0].location_line, "Remote (Remote)");
    }

    #[test]
    fn test_render_blank_name_falls_back() {
        let results = render(&results_state("  ")).results.unwrap();
        assert_eq!(results.profile.greeting_name, "Candidate");
    }

    #[test]
    fn test_render_error_and_idle() {
        let view = render(&ViewState::Error {
            message: "Error reading file.".to_string(),
        });
        assert_eq!(view.state, Phase::Error);
        assert!(view.accepts_upload);
        assert_eq!(view.message.as_deref(), Some("Error reading file."));
        assert!(view.results.is_none());

        let view = render(&ViewState::Idle);
        assert_eq!(view.state, Phase::Idle);
        assert!(view.message.is_none());
    }

    #[test]
    fn test_render_json_is_camel_case() {
        let json = serde_json::to_value(render(&results_state("Ada"))).unwrap();
        assert_eq!(json["state"], "results");
        assert_eq!(json["results"]["jobCount"], 7);
        assert_eq!(json["results"]["jobs"][6]["matchTier"], "top");
    }
}
