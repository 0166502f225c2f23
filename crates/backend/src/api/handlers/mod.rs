// Aggregate handlers
pub mod a001_sync_settings;

// Journal handlers
pub mod journal;

// UseCase handlers
pub mod usecases;
