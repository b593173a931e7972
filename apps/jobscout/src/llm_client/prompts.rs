// Prompt fragments shared by every LLM caller. Feature prompts live next to
// the feature (resume/prompts.rs, report/prompts.rs).

/// System prompt for calls whose reply is parsed with `parse_json_payload`.
pub const JSON_ONLY_SYSTEM: &str = "You extract structured data from resumes and job postings. \
    Reply with a single valid JSON object and nothing else: \
    no prose before or after it and no markdown code fences.";
