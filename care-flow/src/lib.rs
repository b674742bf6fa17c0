pub mod document;
pub mod error;
pub mod normalizer;
pub mod reader;
pub mod recommend;
pub mod runner;
pub mod session;
pub mod signals;
pub mod storage;

// Re-export commonly used types
pub use document::{DocumentKind, DocumentUpload, ParsedDocument, Section};
pub use error::{CareError, Result};
pub use normalizer::Normalizer;
pub use reader::{PageTextReader, PdfTextReader, SheetRows, TabularReader, WorkbookReader};
pub use recommend::{
    FitnessEngine, FitnessRecommendation, MedicineEngine, MedicineRecommendation,
    RecommendationEngine,
};
pub use runner::{CareRunner, IngestOutcome};
pub use session::{EmergencyNotice, EmergencyRequest, FallMonitor, SessionState, UploadMeta};
pub use signals::{HealthSummary, Metrics, SignalField, VitalSigns, extract};
pub use storage::{InMemorySessionStorage, SessionStorage};
