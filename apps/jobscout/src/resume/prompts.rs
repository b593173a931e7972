// Prompts for entity-based skill extraction.

/// Entity extraction prompt template. Replace `{resume_text}` before sending.
pub const ENTITY_PROMPT_TEMPLATE: &str = r#"Extract named entities from the resume below.

Return a JSON object with this EXACT schema (no extra fields):
{
  "entities": [
    {"text": "PostgreSQL", "label": "PRODUCT"}
  ]
}

Label each entity with one of:
- "PRODUCT": software products, languages, frameworks, tools, platforms
- "ORG": companies, institutions, organizations
- "GPE": countries, cities, states
- "OTHER": anything else

Copy entity text exactly as written in the resume. Do not invent entities.

RESUME:
{resume_text}"#;
