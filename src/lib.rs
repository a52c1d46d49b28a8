// ============================================================
// model-serve — library root
// ============================================================
// Turns a trainer (a function producing models) into a service
// that can train, predict with and remove models by key.
//
//   domain/       — Model, Trainer, and the request/response protocol
//   infra/        — Storage contract, backends, decorators, config
//   application/  — Dynamic and static model services
//   ml/           — Entrypoint registry, JSON erasure, demo trainers
//   transport/    — Service runners (HTTP)
//   cli/          — Command-line surface used by the binary

pub mod application;
pub mod cli;
pub mod domain;
pub mod infra;
pub mod ml;
pub mod transport;

pub use application::dynamic_service::DynamicModelService;
pub use application::service::{
    Addressing, Capabilities, ModelService, PredictionService, RemovingService, TrainingService,
};
pub use application::static_service::StaticModelService;
pub use domain::model::{FnModel, Model, SharedModel, Trainer};
pub use domain::protocol::{
    PredictRequest, PredictResponse, RemoveRequest, RemoveResponse, TrainRequest, TrainResponse,
};
pub use infra::storage::{Storage, StorageError, StorageResult};
pub use ml::loader::{EntrypointLoader, ModuleInfo, ResolveError};
