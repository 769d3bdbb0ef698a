//! Field extraction engine: pattern cascades, amount resolution, spatial
//! layout fallbacks and the rule-driven provider extractor.

pub mod amount;
pub mod cascade;
pub mod extractor;
pub mod layout;
pub mod rules;

pub use amount::{candidate_amounts, clean_amount, pick_preferred_total, CleanAmount};
pub use cascade::{first_match, window_after, window_around};
pub use extractor::BillExtractor;
pub use layout::{LineIndex, PositionedWord, Table};
pub use rules::{rules_for, ProviderRules};
