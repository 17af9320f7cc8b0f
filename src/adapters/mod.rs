// Adapters layer: concrete implementations for external systems (document stores, http).

pub mod document_store;
pub mod http;
pub mod repository;
