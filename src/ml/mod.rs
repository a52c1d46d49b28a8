// ============================================================
// Layer 5 — Trainer Resolution
// ============================================================
// Everything needed to go from "a reference to a trainer" to a
// trainer the transport can drive with JSON:
//
//   loader.rs — EntrypointLoader and ModuleInfo
//   erased.rs — JsonTrainer / JsonModel type erasure
//   demo.rs   — built-in scaled-square trainers
//
// Reference: Rust Book §17.2 (Trait Objects)

/// Entrypoint registry and resolution
pub mod loader;

/// serde_json-based erasure of trainer and model types
pub mod erased;

/// Demo trainers available out of the box
pub mod demo;
