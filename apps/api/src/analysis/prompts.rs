// Instruction sent with every resume document.

/// Extraction + job synthesis instruction. Append `STRICT_JSON_INSTRUCTION`.
pub const RESUME_ANALYSIS_PROMPT: &str = r#"You are an expert technical recruiter and AI job matching engine.

Task:
1. Analyze the attached resume document carefully.
2. Extract the candidate's name, a brief 2-3 sentence professional summary, and their top 10-15 key technical and soft skills.
3. Based on their specific skills and experience level, generate a list of 6 to 8 relevant job openings.
   Imagine you are searching a live global database of high-quality jobs.
   Ensure the jobs vary slightly in nature (e.g., startups vs corporate, remote vs onsite) but are all relevant.
4. Calculate a match score (0-100) for each job based on the resume content.
5. Provide a specific reason why each job is a match."#;

pub fn build_instruction() -> String {
    format!(
        "{RESUME_ANALYSIS_PROMPT}\n\n{}",
        crate::llm_client::prompts::STRICT_JSON_INSTRUCTION
    )
}
