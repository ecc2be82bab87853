//! Response schema handed to the model alongside the instruction.
//! Mirrors `ResumeAnalysisResult` / `JobListing` field for field.

use serde_json::{json, Value};

pub const SKILLS_MIN: usize = 10;
pub const SKILLS_MAX: usize = 15;
pub const JOBS_MIN: usize = 6;
pub const JOBS_MAX: usize = 8;

/// Top-level keys the model must return.
pub const REQUIRED_FIELDS: [&str; 4] = [
    "candidateName",
    "professionalSummary",
    "extractedSkills",
    "recommendedJobs",
];

/// Keys every job object must carry.
pub const JOB_FIELDS: [&str; 10] = [
    "id",
    "title",
    "company",
    "location",
    "type",
    "workMode",
    "salary",
    "matchScore",
    "matchReason",
    "postedAt",
];

pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "candidateName": {
                "type": "STRING",
                "description": "The name of the candidate found in the resume."
            },
            "professionalSummary": {
                "type": "STRING",
                "description": "A brief 2-3 sentence professional summary based on the resume."
            },
            "extractedSkills": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "minItems": SKILLS_MIN,
                "maxItems": SKILLS_MAX,
                "description": "List of top 10-15 key technical and soft skills extracted from the resume."
            },
            "recommendedJobs": {
                "type": "ARRAY",
                "items": job_schema(),
                "minItems": JOBS_MIN,
                "maxItems": JOBS_MAX,
                "description": "A list of 6 to 8 hypothetical but realistic job listings that match the candidate's skills."
            }
        },
        "required": REQUIRED_FIELDS
    })
}

fn job_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING" },
            "title": { "type": "STRING" },
            "company": { "type": "STRING" },
            "location": { "type": "STRING" },
            "type": { "type": "STRING", "description": "e.g. Full-time, Contract" },
            "workMode": { "type": "STRING", "description": "e.g. Remote, Hybrid, On-site" },
            "salary": { "type": "STRING" },
            "matchScore": {
                "type": "INTEGER",
                "minimum": 0,
                "maximum": 100,
                "description": "Match percentage from 0 to 100 based on skills."
            },
            "matchReason": {
                "type": "STRING",
                "description": "A short explanation of why this job fits the candidate's profile."
            },
            "postedAt": {
                "type": "STRING",
                "description": "Relative time, e.g. '2 days ago'"
            }
        },
        "required": JOB_FIELDS
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_top_level_fields() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, REQUIRED_FIELDS);
    }

    #[test]
    fn test_every_required_field_is_declared() {
        let schema = response_schema();
        for field in REQUIRED_FIELDS {
            assert!(schema["properties"].get(field).is_some(), "{field} missing");
        }
        let job = &schema["properties"]["recommendedJobs"]["items"];
        for field in JOB_FIELDS {
            assert!(job["properties"].get(field).is_some(), "{field} missing");
        }
    }

    #[test]
    fn test_match_score_is_integer() {
        let schema = response_schema();
        let score = &schema["properties"]["recommendedJobs"]["items"]["properties"]["matchScore"];
        assert_eq!(score["type"], "INTEGER");
        assert_eq!(score["maximum"], 100);
    }

    #[test]
    fn test_list_bounds() {
        let schema = response_schema();
        assert_eq!(schema["properties"]["extractedSkills"]["minItems"], 10);
        assert_eq!(schema["properties"]["recommendedJobs"]["maxItems"], 8);
    }
}
