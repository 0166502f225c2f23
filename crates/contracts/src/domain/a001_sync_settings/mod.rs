pub mod aggregate;

pub use aggregate::{
    Campaign, KeyTestRequest, KeyTestResult, MappingRow, MappingRowDto, ProductRef,
    SaveSettingsResponse, SettingsEditorView, SyncSettings, SyncSettingsDto,
};
