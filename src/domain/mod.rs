// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// The contracts every other layer programs against:
//
//   model.rs    — Model and Trainer traits. A Trainer turns a
//                 training input into a Model; a Model turns a
//                 prediction input into an output.
//
//   protocol.rs — Request values and the closed response enums
//                 for the train / predict / remove operations.
//
// Rules for this layer:
//   - NO storage, HTTP or CLI types
//   - NO serialization format assumptions
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §10 (Traits), §6 (Enums and Pattern Matching)

/// Model and Trainer contracts
pub mod model;

/// Train / predict / remove request and response values
pub mod protocol;
