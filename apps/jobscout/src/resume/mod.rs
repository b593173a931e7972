// Resume profile extraction: document text plus the run's skill set.

pub mod prompts;
pub mod skills;
pub mod text;

pub use skills::{
    extract_skill_set, CompositeSkillExtractor, EntitySkillExtractor, PatternSkillExtractor,
    SkillExtractor,
};
pub use text::extract_text;
