pub mod settings;

pub use settings::{ServerSettings, Settings, StoreBackend, StoreSettings, SyncSettings};
