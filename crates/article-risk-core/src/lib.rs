pub mod analysis;
pub mod client;
pub mod report;
pub mod session;

pub use analysis::{
    extractor::extract_summary,
    normalizer::{classify, classify_aggregate, Category, Classification, Tier, TierStyle},
    AnalysisRequest, AnalysisResponse, AnalysisService, Breakdown, CategoryReport, FoundUrl,
    RequestValidationError, RiskLevel,
};
pub use client::{HttpAnalysisClient, ServiceError, ServiceSettings};
pub use report::{render_report, DisplayModel, OutputFormat};
pub use session::{AnalysisSession, SubmissionState, FALLBACK_ERROR_MESSAGE};
