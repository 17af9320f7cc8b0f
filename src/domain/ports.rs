use crate::domain::model::Uom;
use crate::utils::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Persistence port for Uom records, implemented by storage adapters.
///
/// "Not found" is an ordinary outcome (`Ok(None)`), never an error; errors
/// are reserved for backend or transport failures.
#[async_trait]
pub trait UomRepository: Send + Sync {
    /// Upsert by `uom.id`.
    async fn save(&self, uom: &Uom) -> Result<()>;
    async fn get_by_id(&self, id: &str) -> Result<Option<Uom>>;
    async fn get_all(&self) -> Result<Vec<Uom>>;
    async fn delete(&self, id: &str) -> Result<()>;
}

pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Result<String>;
}

/// Random (v4) UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> Result<String> {
        Ok(Uuid::new_v4().to_string())
    }
}
