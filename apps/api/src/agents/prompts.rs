// All LLM prompt templates for the agents.
// Placeholders are `{name}` and are filled with `str::replace` by each agent.
// JSON templates end with `{json_only}`, which receives llm_client::prompts::JSON_ONLY_INSTRUCTION.

/// Replace: {input_text}
pub const PROFILE_SUMMARY_TEMPLATE: &str = r#"You are a professional career analyst.

Given the following user profile, generate a detailed competency-based summary only.

Do NOT include: name, email, phone number, address, or any personal information.
DO include: technical skills, soft skills, tools, leadership, certifications, achievements, and experience area.

User profile:
{input_text}"#;

/// Replace: {summary}, {single_value}
pub const LATEST_ROLE_TEMPLATE: &str = r#"You are an expert in resume analysis.

From the following CV text, extract the title of the latest job held. Only return the job title, nothing else.

CV:
{summary}

{single_value}"#;

/// Replace: {summary}, {single_value}
pub const CURRENT_TITLE_TEMPLATE: &str = r#"From the following user profile summary, identify the user's current job title or role.

Summary:
{summary}

Respond ONLY with the job title (e.g., Data Scientist, Software Engineer, HR Manager).
Do NOT include location, company, or extra text.
{single_value}"#;

/// Replace: {role}, {competency_list}
pub const ROLE_COMPETENCY_TEMPLATE: &str = r#"You are a career development expert.

From the list of competencies below, select the 5 to 10 most relevant competencies for the job role: {role}.

List only the competency names, comma-separated, with no explanation.

Available competencies:
{competency_list}"#;

/// Replace: {summary}, {competency}
pub const LEVEL_ESTIMATE_TEMPLATE: &str = r#"Given this summary of a user's professional experience:

{summary}

Estimate the user's level (1 to 5) for the following competency:
{competency}

Reply with ONLY a single digit from 1 to 5. No explanation."#;

/// Replace: {cv_text}, {competency_list}, {json_only}
pub const CV_STRENGTHS_TEMPLATE: &str = r#"You are a professional HR analyst.

Analyze the user's CV and extract the top 5 strongest competencies from the list below, based on their skills, experiences, and years of practice.

Output ONLY a valid JSON array using this format:
[
  { "competency": "Competency Name", "level": 4 }
]

CV Text:
{cv_text}

Available Competencies:
{competency_list}

{json_only}"#;

/// Replace: {competencies_json}, {json_only}
pub const JOB_RECOMMENDATION_TEMPLATE: &str = r#"You are a career advisor AI.

Based on the following list of user competencies and levels, recommend 3 suitable job titles with level and short fit reasons.

Competencies:
{competencies_json}

Return in this JSON format:
[
  {
    "title": "Data Analyst",
    "level": "Senior",
    "fit_reason": "Strong match on Data Analytics, SQL, and visualization skills."
  }
]

{json_only}"#;

/// Replace: {summary}, {jobs_json}, {json_only}
pub const JOB_ENRICHMENT_TEMPLATE: &str = r#"You are a job matching assistant.

Given a user's profile and a list of job posts, return for each job, in the same order:
- role
- company
- company_type (e.g., Private, Government, Startup)
- location
- industry
- pay_usd (estimated salary range per month)
- fit_reason (why this job matches the user's profile)
- match_score (0 to 100)
- description (brief 1-2 sentence summary)
- link (application or view link)

User Profile:
{summary}

Jobs (raw):
{jobs_json}

Respond only in JSON format:
[
  {
    "role": "Job Title",
    "company": "Company Name",
    "company_type": "Private / Government / etc.",
    "location": "City, Country",
    "industry": "Field",
    "pay_usd": "Approx USD/month",
    "fit_reason": "Why this fits the user",
    "match_score": 75,
    "description": "1-2 sentence job summary",
    "link": "Direct job link"
  }
]

{json_only}"#;

/// Replace: {job_description}, {summary}, {json_only}
pub const REQUIREMENTS_TEMPLATE: &str = r#"You are an AI job analyst.
Extract the key job requirements from the following job description.
For each requirement, identify:
- Requirement text
- Category: one of ['technical skill', 'soft skill', 'tool', 'experience', 'education', 'certification']
- Reason: a short justification why it's considered important
- Match score: score from 0 to 100 showing how well the requirement is fulfilled based on the CV summary
- Match explanation: a short reasoning based on user's CV summary

Return the result in the following JSON format:
{
  "requirements": [
    {
      "requirement": "<exact phrasing from job post>",
      "category": "<one of the categories>",
      "reason": "<why this requirement matters>",
      "match_score": 80,
      "match_explanation": "<brief justification from CV match>"
    }
  ]
}

Job Description:
{job_description}

User CV Summary:
{summary}

{json_only}"#;

/// Replace: {max_gaps}, {job_json}, {summary}, {competencies_json}, {json_only}
pub const GAP_ANALYSIS_TEMPLATE: &str = r#"You are a career coach AI.

Compare a job's requirements with a user's current competencies and summarized CV.
Return up to {max_gaps} relevant skills or experience gaps, even those with 0 gap if important.
For each gap include:
- type: 'skill' or 'experience'
- competency: name of the competency or experience
- current_level (only if skill)
- required_level (only if skill)
- explanation: short reasoning why this gap matters
- recommendation: how the user can improve or fill the gap
- suggested_learning_mode: "video", "project", "community", "internship", etc.

Respond in this JSON format:
{
  "job_title": "<job title>",
  "gaps": [
    {
      "type": "skill",
      "competency": "<name>",
      "current_level": 2,
      "required_level": 4,
      "explanation": "<why this matters>",
      "recommendation": "<actionable advice>",
      "suggested_learning_mode": "<mode>"
    },
    {
      "type": "experience",
      "competency": "<experience area>",
      "explanation": "<missing experience>",
      "recommendation": "<how to get experience>",
      "suggested_learning_mode": "<mode>"
    }
  ]
}

Job Info:
{job_json}

User Summary:
{summary}

User Competency Input:
{competencies_json}

{json_only}"#;

/// Replace: {job_json}, {summary}, {gaps_json}, {requirements_json}, {json_only}
pub const LEARNING_PLAN_TEMPLATE: &str = r#"You are a learning coach AI. Based on the following job, user's profile, identified competency gaps, and job requirements:

Generate a 4-week personalized learning plan to improve the user's readiness.
For each week include:
- Week Number (1 to 4)
- Focus area (based on gaps or job requirement category)
- Objectives
- Activities (e.g. YouTube videos, free courses, articles, coding challenges, events, internships, community involvement)
- Resource links (max 3 per week, must be clickable/valid)
- Rationale: why these activities help close the user's gap

Respond in this JSON format:
{
  "plan": [
    {
      "week": 1,
      "focus_area": "<e.g. Backend Development>",
      "objectives": "<learning goal>",
      "activities": ["<course/article/video/challenge>"],
      "resources": ["<url1>", "<url2>", "<url3>"],
      "rationale": "<why this week matters>"
    }
  ]
}

Job:
{job_json}

User Summary:
{summary}

Competency Gaps:
{gaps_json}

Job Requirements:
{requirements_json}

{json_only}"#;
