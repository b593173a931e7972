// Prompts for the narrative job analysis.

/// System prompt for narrative analysis. Enforces JSON-only output.
pub const NARRATIVE_SYSTEM: &str = "You are an expert job matching analyst and career advisor. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Replace `{resume_excerpt}`, `{skills}` and `{jobs}` before sending.
pub const NARRATIVE_PROMPT_TEMPLATE: &str = r#"Analyze these job opportunities against the candidate's resume and skills.

RESUME SUMMARY:
{resume_excerpt}

CANDIDATE SKILLS:
{skills}

For each job provide an overall fit assessment (0-100), key strengths and
potential challenges, growth opportunities, cultural fit, and specific
recommendations for the application.

JOB OPPORTUNITIES:
{jobs}

Return a JSON object with this EXACT schema:
{
  "overall_assessment": {
    "fit_score": 0,
    "summary": "string"
  },
  "job_analysis": [
    {
      "job_title": "string",
      "company": "string",
      "fit_score": 0,
      "strengths": ["string"],
      "challenges": ["string"],
      "growth_opportunities": ["string"],
      "cultural_fit": "string",
      "recommendations": ["string"]
    }
  ],
  "career_insights": {
    "skill_gaps": ["string"],
    "growth_areas": ["string"],
    "industry_trends": ["string"]
  }
}"#;
