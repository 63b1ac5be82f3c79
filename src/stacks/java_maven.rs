//! Maven project skeleton

use super::{service_path, StackGenerator, StackId};
use crate::scaffold::{GeneratedFile, GenerationContext};

const POM_XML: &str = include_str!("../../templates/stacks/java-maven/pom.xml");
const APPLICATION_JAVA: &str = include_str!("../../templates/stacks/java-maven/Application.java");

pub struct JavaMavenGenerator;

impl StackGenerator for JavaMavenGenerator {
    fn id(&self) -> StackId {
        StackId::JavaMaven
    }

    fn files(&self, ctx: &GenerationContext) -> Vec<GeneratedFile> {
        let id = self.id();
        let source = format!(
            "src/main/java/com/{}/framework/Application.java",
            ctx.org_slug()
        );
        vec![
            GeneratedFile::new(service_path(id, "pom.xml"), ctx.render(POM_XML)),
            GeneratedFile::new(service_path(id, &source), ctx.render(APPLICATION_JAVA)),
        ]
    }
}
