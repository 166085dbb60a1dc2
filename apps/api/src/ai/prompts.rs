// All LLM prompt constants for the AI module.
// Structured prompts get their output contract from llm_client::prompts::json_system_prompt.

/// Role for job-posting extraction.
pub const JOB_PARSE_ROLE: &str = "\
You are a job description parser. Extract structured information from job postings.";

/// Job extraction prompt. Replace `{raw_text}` before sending.
pub const JOB_PARSE_PROMPT_TEMPLATE: &str = r#"Parse this job posting and return JSON with these exact fields:
{
  "title": "job title",
  "company": "company name",
  "description": "job description summary (max 500 chars)",
  "requirements": "key requirements as comma-separated list",
  "salary_min": null or number in IDR,
  "salary_max": null or number in IDR,
  "platform": "detected platform (linkedin/glints/jobstreet/etc)"
}

Job posting:
{raw_text}"#;

/// Role for CV-vs-requirements gap analysis. The blunt tone is part of the product.
pub const GAP_ANALYSIS_ROLE: &str = "\
You are a brutally honest career advisor.
Analyze the gap between a candidate's CV and job requirements.";

/// Gap analysis prompt. Replace `{cv_text}` and `{requirements}` before sending.
pub const GAP_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze this CV against the job requirements.
Return JSON with these exact fields:
{
  "match_percentage": number 0-100,
  "strengths": ["strength1", "strength2", "strength3"],
  "gaps": ["gap1", "gap2", "gap3"],
  "suggestion": "one specific actionable suggestion",
  "verdict": "one honest sentence about their chances"
}

CV:
{cv_text}

Job Requirements:
{requirements}"#;

/// System prompt for follow-up emails. Output is prose, not JSON.
pub const FOLLOW_UP_SYSTEM: &str = "\
You are a professional career coach.
Write concise, professional follow-up emails for job applications.
Keep it under 150 words. Be direct, not desperate.";

/// Follow-up prompt. Replace `{applicant}`, `{role}`, `{company}`, `{days}` before sending.
pub const FOLLOW_UP_PROMPT_TEMPLATE: &str = "Write a follow-up email for:
- Applicant: {applicant}
- Position: {role}
- Company: {company}
- Applied: {days} days ago

Return only the email body, no subject line.";
