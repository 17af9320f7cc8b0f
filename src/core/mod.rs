pub mod uom_service;

pub use crate::domain::model::{BaseUom, Uom, UomRules};
pub use crate::domain::ports::{IdGenerator, UomRepository, UuidGenerator};
pub use crate::utils::error::Result;
