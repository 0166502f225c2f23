pub mod a001_sync_settings;
