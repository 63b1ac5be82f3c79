//! Go HTTP service skeleton

use super::{service_path, StackGenerator, StackId};
use crate::scaffold::{GeneratedFile, GenerationContext};

const GO_MOD: &str = include_str!("../../templates/stacks/go-service/go.mod");
const MAIN_GO: &str = include_str!("../../templates/stacks/go-service/main.go");
const DOCKERFILE: &str = include_str!("../../templates/stacks/go-service/Dockerfile");

pub struct GoServiceGenerator;

impl StackGenerator for GoServiceGenerator {
    fn id(&self) -> StackId {
        StackId::GoService
    }

    fn files(&self, ctx: &GenerationContext) -> Vec<GeneratedFile> {
        vec![
            GeneratedFile::new(service_path(self.id(), "go.mod"), ctx.render(GO_MOD)),
            GeneratedFile::new(service_path(self.id(), "main.go"), ctx.render(MAIN_GO)),
            GeneratedFile::new(service_path(self.id(), "Dockerfile"), ctx.render(DOCKERFILE)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_module_path_uses_org_slug() {
        let ctx = GenerationContext::new("/tmp/GOOGLE_enterprise_framework", "Google", "v1.0.0");
        let files = GoServiceGenerator.files(&ctx);

        let go_mod = files
            .iter()
            .find(|f| f.path == PathBuf::from("services/go-service/go.mod"))
            .unwrap();
        assert!(go_mod
            .contents
            .starts_with("module github.com/google/framework/services/go-service"));
    }
}
