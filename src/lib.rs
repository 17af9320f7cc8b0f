pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::document_store::{DocumentStore, LocalDocumentStore, MemoryDocumentStore};
pub use adapters::http::{router, AppState};
pub use adapters::repository::DocumentUomRepository;
pub use config::AppConfig;
pub use crate::core::uom_service::UomService;
pub use domain::decimal::PreciseDecimal;
pub use domain::model::{
    AdditionalInfo, BaseUom, MeasureType, PrintedNameType, Uom, UomBuilder, UomRules,
};
pub use domain::ports::{IdGenerator, UomRepository, UuidGenerator};
pub use utils::error::{ErrorCategory, Result, UomError};
