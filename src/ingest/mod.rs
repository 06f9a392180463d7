/// Data ingest adapters for the pond monitoring service.
///
/// Submodules:
/// - `rtdb` — REST client for the hosted realtime database the device
///   streams into.

pub mod rtdb;
