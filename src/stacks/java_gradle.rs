use super::{service_path, StackGenerator, StackId};
use crate::scaffold::{GeneratedFile, GenerationContext};

const BUILD_GRADLE: &str = include_str!("../../templates/stacks/java-gradle/build.gradle");
const SETTINGS_GRADLE: &str = include_str!("../../templates/stacks/java-gradle/settings.gradle");
// Same entrypoint as the Maven skeleton, only the build tool differs
const APPLICATION_JAVA: &str = include_str!("../../templates/stacks/java-maven/Application.java");

pub struct JavaGradleGenerator;

impl StackGenerator for JavaGradleGenerator {
    fn id(&self) -> StackId {
        StackId::JavaGradle
    }

    fn files(&self, ctx: &GenerationContext) -> Vec<GeneratedFile> {
        let id = self.id();
        let source = format!(
            "src/main/java/com/{}/framework/Application.java",
            ctx.org_slug()
        );
        vec![
            GeneratedFile::new(service_path(id, "build.gradle"), ctx.render(BUILD_GRADLE)),
            GeneratedFile::new(service_path(id, "settings.gradle"), SETTINGS_GRADLE),
            GeneratedFile::new(service_path(id, &source), ctx.render(APPLICATION_JAVA)),
        ]
    }
}
