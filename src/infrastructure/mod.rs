pub mod database;
pub mod ingest;
pub mod repositories;
