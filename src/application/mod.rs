// ============================================================
// Layer 2 — Application / Services
// ============================================================
// Composes a Trainer and a Storage into the train / predict /
// remove operations, producing the typed responses of the
// protocol.
//
// Rules for this layer:
//   - No HTTP or CLI types here
//   - User-code failures end here: they become Error variants
//   - Storage failures pass through untouched
//
//   service.rs         — capability traits and ModelService
//   dynamic_service.rs — all three capabilities, keyed storage
//   static_service.rs  — prediction only, one fixed model
//
// Reference: Clean Architecture pattern
//            Rust Book §17.2 (Trait Objects)

/// Capability traits and the composition-time service view
pub mod service;

/// Multi-model train / predict / remove over a storage
pub mod dynamic_service;

/// Single fixed model, prediction only
pub mod static_service;
