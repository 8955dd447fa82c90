pub mod ingestion;
pub mod matchups;
pub mod processing;
