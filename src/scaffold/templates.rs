//! Organization-independent payloads

use super::{GeneratedFile, GenerationContext};
use std::path::PathBuf;

const BUILD_SH: &str = include_str!("../../templates/common/build.sh");
const MAKEFILE: &str = include_str!("../../templates/common/Makefile");
const DOCKERFILE: &str = include_str!("../../templates/common/Dockerfile");
const MAIN_TF: &str = include_str!("../../templates/common/main.tf");
const PLAYBOOK_YML: &str = include_str!("../../templates/common/playbook.yml");
const SERVICE_UNIT: &str = include_str!("../../templates/common/framework.service");
const CI_YML: &str = include_str!("../../templates/common/ci.yml");
const MAINTENANCE_CRON: &str = include_str!("../../templates/common/maintenance.cron");
const README_MD: &str = include_str!("../../templates/common/README.md");
const ARCHITECTURE_MD: &str = include_str!("../../templates/common/ARCHITECTURE.md");
const LICENSE: &str = include_str!("../../templates/common/LICENSE");
const PITCH_MD: &str = include_str!("../../templates/common/PITCH.md");

/// Build entrypoint run by the build stage
pub const BUILD_ENTRYPOINT: &str = "build.sh";
pub const PLAYBOOK_PATH: &str = "automation/playbook.yml";
pub const DOCKERFILE_PATH: &str = "Dockerfile";

pub fn common_files(ctx: &GenerationContext) -> Vec<GeneratedFile> {
    let slug = ctx.org_slug();
    vec![
        GeneratedFile::executable(BUILD_ENTRYPOINT, ctx.render(BUILD_SH)),
        GeneratedFile::new("Makefile", ctx.render(MAKEFILE)),
        GeneratedFile::new(DOCKERFILE_PATH, ctx.render(DOCKERFILE)),
        GeneratedFile::new("infrastructure/main.tf", ctx.render(MAIN_TF)),
        GeneratedFile::new(PLAYBOOK_PATH, ctx.render(PLAYBOOK_YML)),
        GeneratedFile::new(
            PathBuf::from("deploy").join(format!("{}-framework.service", slug)),
            ctx.render(SERVICE_UNIT),
        ),
        GeneratedFile::new(".github/workflows/ci.yml", ctx.render(CI_YML)),
        GeneratedFile::new(
            PathBuf::from("cron").join(format!("{}-maintenance.cron", slug)),
            ctx.render(MAINTENANCE_CRON),
        ),
        GeneratedFile::new("README.md", ctx.render(README_MD)),
        GeneratedFile::new("docs/ARCHITECTURE.md", ctx.render(ARCHITECTURE_MD)),
        GeneratedFile::new("LICENSE", ctx.render(LICENSE)),
        GeneratedFile::new("docs/PITCH.md", ctx.render(PITCH_MD)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_makefile_recipes_are_tab_indented() {
        assert!(MAKEFILE.contains("setup:\n\tmkdir -p build logs"));
        assert!(MAKEFILE.contains("build: setup\n\tbash build.sh"));
    }

    #[test]
    fn test_only_build_entrypoint_is_executable() {
        let ctx = GenerationContext::new("/tmp/META_enterprise_framework", "Meta", "v1.0.0");
        let executables: Vec<_> = common_files(&ctx)
            .into_iter()
            .filter(|f| f.executable)
            .map(|f| f.path)
            .collect();
        assert_eq!(executables, vec![PathBuf::from("build.sh")]);
    }

    #[test]
    fn test_placeholders_are_rendered() {
        let ctx = GenerationContext::new("/tmp/META_enterprise_framework", "Meta", "v2.0.0");
        for file in common_files(&ctx) {
            for token in ["{{org}}", "{{org_slug}}", "{{organization}}", "{{version}}", "{{framework}}"] {
                assert!(!file.contents.contains(token), "{:?} left {}", file.path, token);
            }
        }
    }

    #[test]
    fn test_playbook_keeps_jinja_expressions() {
        let ctx = GenerationContext::new("/tmp/META_enterprise_framework", "Meta", "v1.0.0");
        let playbook = common_files(&ctx)
            .into_iter()
            .find(|f| f.path == PathBuf::from(PLAYBOOK_PATH))
            .unwrap();
        assert!(playbook.contents.contains("\"{{ framework_root }}\""));
        assert!(playbook.contents.contains("meta-framework.service"));
    }
}
