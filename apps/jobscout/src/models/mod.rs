// Core records shared by the collector, scorer and report builder.

pub mod posting;
pub mod skill_set;

pub use posting::{Posting, ScoredPosting};
pub use skill_set::SkillSet;
