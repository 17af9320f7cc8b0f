use async_trait::async_trait;
use okra_uom::{
    BaseUom, DocumentUomRepository, IdGenerator, MeasureType, MemoryDocumentStore,
    PreciseDecimal, PrintedNameType, Uom, UomBuilder, UomError, UomRepository, UomRules,
    UomService,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn memory_service() -> UomService<DocumentUomRepository<MemoryDocumentStore>> {
    UomService::new(DocumentUomRepository::new(MemoryDocumentStore::new()))
}

fn payload(value: serde_json::Value) -> BaseUom {
    serde_json::from_value(value).unwrap()
}

fn teaspoon() -> BaseUom {
    payload(serde_json::json!({
        "label": "teaspoon",
        "enabled": true,
        "measure_type": "volume",
        "snap_amount": ["0.25"],
        "default_name_type": "short"
    }))
}

/// Records writes and can be told to fail every call.
#[derive(Default)]
struct RecordingRepository {
    stored: Mutex<Vec<Uom>>,
    saves: AtomicUsize,
    deletes: AtomicUsize,
    fail: bool,
}

impl RecordingRepository {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn check(&self) -> okra_uom::Result<()> {
        if self.fail {
            Err(UomError::persistence("backend unavailable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UomRepository for RecordingRepository {
    async fn save(&self, uom: &Uom) -> okra_uom::Result<()> {
        self.check()?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        let mut stored = self.stored.lock().unwrap();
        stored.retain(|u| u.id != uom.id);
        stored.push(uom.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> okra_uom::Result<Option<Uom>> {
        self.check()?;
        Ok(self.stored.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn get_all(&self) -> okra_uom::Result<Vec<Uom>> {
        self.check()?;
        Ok(self.stored.lock().unwrap().clone())
    }

    async fn delete(&self, id: &str) -> okra_uom::Result<()> {
        self.check()?;
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.stored.lock().unwrap().retain(|u| u.id != id);
        Ok(())
    }
}

struct FixedIds(&'static str);

impl IdGenerator for FixedIds {
    fn generate(&self) -> okra_uom::Result<String> {
        Ok(self.0.to_string())
    }
}

struct BrokenIds;

impl IdGenerator for BrokenIds {
    fn generate(&self) -> okra_uom::Result<String> {
        Err(UomError::IdGeneration {
            message: "entropy source unavailable".into(),
        })
    }
}

#[tokio::test]
async fn test_create_get_delete_lifecycle() {
    let service = memory_service();

    let created = service.create_uom(teaspoon()).await.unwrap();
    assert!(!created.id.is_empty());
    assert_eq!(created.base, teaspoon());

    let fetched = service.get_uom_by_id(&created.id).await.unwrap();
    assert_eq!(fetched, created);

    service.delete_uom(&created.id).await.unwrap();

    let err = service.get_uom_by_id(&created.id).await.unwrap_err();
    assert!(matches!(err, UomError::NotFound { ref id } if *id == created.id));
}

#[tokio::test]
async fn test_built_uom_reads_back_equal_to_created() {
    let service = memory_service();
    let base = UomBuilder::new(
        "pinch",
        MeasureType::Volume,
        vec![PreciseDecimal::new(0.1234567)],
        PrintedNameType::Short,
    )
    .snap_select(0.3333333.into())
    .build()
    .unwrap();

    let created = service.create_uom(base).await.unwrap();
    assert_eq!(created.base.snap_amount, vec![PreciseDecimal::new(0.123457)]);

    let fetched = service.get_uom_by_id(&created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_never_reuses_ids() {
    let service = memory_service();
    let mut ids = std::collections::HashSet::new();
    for _ in 0..50 {
        let uom = service.create_uom(teaspoon()).await.unwrap();
        assert!(ids.insert(uom.id));
    }
    assert_eq!(service.get_all_uoms().await.unwrap().len(), 50);
}

#[tokio::test]
async fn test_create_with_bogus_measure_type_is_validation_error() {
    let service = memory_service();
    let mut body = serde_json::to_value(teaspoon()).unwrap();
    body["measure_type"] = "bogus".into();

    let err = service.create_uom(payload(body)).await.unwrap_err();
    let errors = err.validation_errors().expect("validation error");
    assert!(errors.contains_field("measure_type"));
    assert!(service.get_all_uoms().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_conflict_when_generated_id_exists() {
    let service = UomService::new(RecordingRepository::default())
        .with_id_generator(Arc::new(FixedIds("fixed-id")));

    service.create_uom(teaspoon()).await.unwrap();
    let err = service.create_uom(teaspoon()).await.unwrap_err();

    assert!(matches!(err, UomError::Conflict { ref id } if id == "fixed-id"));
    assert_eq!(service.repository().saves.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_create_surfaces_id_generation_failure() {
    let service =
        UomService::new(RecordingRepository::default()).with_id_generator(Arc::new(BrokenIds));

    let err = service.create_uom(teaspoon()).await.unwrap_err();
    assert!(matches!(err, UomError::IdGeneration { .. }));
    assert_eq!(service.repository().saves.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_update_replaces_payload_under_same_id() {
    let service = memory_service();
    let created = service.create_uom(teaspoon()).await.unwrap();

    let mut changed = teaspoon();
    changed.label = "tsp".into();
    changed.snap_amount = vec![PreciseDecimal::new(0.125), PreciseDecimal::new(0.25)];
    changed.match_names_recipe = vec!["tsp".into(), "t".into()];

    let updated = service.update_uom(&created.id, changed.clone()).await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.base, changed);
    assert_eq!(service.get_uom_by_id(&created.id).await.unwrap(), updated);
    assert_eq!(service.get_all_uoms().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_with_empty_snap_amount_leaves_record_unchanged() {
    let service = memory_service();
    let created = service.create_uom(teaspoon()).await.unwrap();

    let mut invalid = teaspoon();
    invalid.label = "renamed".into();
    invalid.snap_amount.clear();

    let err = service.update_uom(&created.id, invalid).await.unwrap_err();
    assert!(err.validation_errors().unwrap().contains_field("snap_amount"));
    assert_eq!(service.get_uom_by_id(&created.id).await.unwrap(), created);
}

#[tokio::test]
async fn test_update_absent_id_is_not_found_without_write() {
    let service = UomService::new(RecordingRepository::default());

    let err = service.update_uom("missing", teaspoon()).await.unwrap_err();
    assert!(matches!(err, UomError::NotFound { .. }));

    // absent wins over invalid
    let err = service
        .update_uom("missing", BaseUom::default())
        .await
        .unwrap_err();
    assert!(matches!(err, UomError::NotFound { .. }));
    assert_eq!(service.repository().saves.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_delete_absent_id_is_not_found_without_delete_call() {
    let service = UomService::new(RecordingRepository::default());

    let err = service.delete_uom("missing").await.unwrap_err();
    assert!(matches!(err, UomError::NotFound { .. }));
    assert_eq!(service.repository().deletes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_backend_failures_surface_as_persistence_errors() {
    let service = UomService::new(RecordingRepository::failing());

    for err in [
        service.create_uom(teaspoon()).await.unwrap_err(),
        service.get_uom_by_id("x").await.unwrap_err(),
        service.get_all_uoms().await.unwrap_err(),
        service.update_uom("x", teaspoon()).await.unwrap_err(),
        service.delete_uom("x").await.unwrap_err(),
    ] {
        assert!(matches!(err, UomError::Persistence { .. }), "got {:?}", err);
    }
}

#[tokio::test]
async fn test_disabled_uoms_follow_configured_rules() {
    let mut disabled = teaspoon();
    disabled.enabled = false;

    let strict = memory_service();
    let err = strict.create_uom(disabled.clone()).await.unwrap_err();
    assert!(err.validation_errors().unwrap().contains_field("enabled"));

    let relaxed = memory_service().with_rules(UomRules {
        require_enabled: false,
    });
    let created = relaxed.create_uom(disabled).await.unwrap();
    assert!(!created.base.enabled);
}
