pub mod ingest;
pub mod recommend;
pub mod status;
