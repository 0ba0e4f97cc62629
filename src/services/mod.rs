// Video Hunter services
// Transport, reconciliation, persistence and text services used by the App.

pub mod api_client;
pub mod debounce;
pub mod event_stream;
pub mod localization_engine;
pub mod reconciler;
pub mod settings_store;
