use super::{service_path, StackGenerator, StackId};
use crate::scaffold::{GeneratedFile, GenerationContext};

const CARGO_TOML: &str = include_str!("../../templates/stacks/rust-service/Cargo.toml.tmpl");
const MAIN_RS: &str = include_str!("../../templates/stacks/rust-service/main.rs");

pub struct RustServiceGenerator;

impl StackGenerator for RustServiceGenerator {
    fn id(&self) -> StackId {
        StackId::RustService
    }

    fn files(&self, ctx: &GenerationContext) -> Vec<GeneratedFile> {
        vec![
            GeneratedFile::new(service_path(self.id(), "Cargo.toml"), ctx.render(CARGO_TOML)),
            GeneratedFile::new(service_path(self.id(), "src/main.rs"), ctx.render(MAIN_RS)),
        ]
    }
}
