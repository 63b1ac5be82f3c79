//! Organization-specific stack generators
//!
//! Each stack contributes a service skeleton under `services/<slug>/`. The
//! [`GeneratorRegistry`] maps organization keys to the ordered stacks they use.

mod dotnet_service;
mod go_service;
mod id;
mod java_gradle;
mod java_maven;
mod node_service;
mod python_api;
mod registry;
mod rust_service;
mod swift_package;

pub use dotnet_service::DotnetServiceGenerator;
pub use go_service::GoServiceGenerator;
pub use id::StackId;
pub use java_gradle::JavaGradleGenerator;
pub use java_maven::JavaMavenGenerator;
pub use node_service::NodeServiceGenerator;
pub use python_api::PythonApiGenerator;
pub use registry::{GenerationTask, GeneratorRegistry};
pub use rust_service::RustServiceGenerator;
pub use swift_package::SwiftPackageGenerator;

use crate::scaffold::{GeneratedFile, GenerationContext};
use std::path::PathBuf;

/// A generator strategy for one stack
pub trait StackGenerator: Send + Sync {
    fn id(&self) -> StackId;

    /// Payload files, relative to the framework directory
    fn files(&self, ctx: &GenerationContext) -> Vec<GeneratedFile>;
}

/// `services/<slug>/<name>`
pub(crate) fn service_path(id: StackId, name: &str) -> PathBuf {
    PathBuf::from("services").join(id.slug()).join(name)
}
