//! Campaign orchestration: renders every format for a campaign with
//! all-or-nothing semantics, generates copy suggestions with static
//! fallbacks, checks copy compliance and exports the results.

pub mod compliance;
pub mod export;
pub mod gemini;
pub mod orchestrator;
pub mod session;
pub mod suggestions;

pub use compliance::check_compliance;
pub use gemini::GeminiClient;
pub use orchestrator::{CampaignOrchestrator, CreativeSet};
pub use session::CampaignSession;
pub use suggestions::{SuggestionEngine, SuggestionKind, SuggestionServiceError, TextSuggestionService};
