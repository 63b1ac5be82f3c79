use super::{service_path, StackGenerator, StackId};
use crate::scaffold::{GeneratedFile, GenerationContext};

const CSPROJ: &str = include_str!("../../templates/stacks/dotnet-service/Service.csproj");
const PROGRAM_CS: &str = include_str!("../../templates/stacks/dotnet-service/Program.cs");

pub struct DotnetServiceGenerator;

impl StackGenerator for DotnetServiceGenerator {
    fn id(&self) -> StackId {
        StackId::DotnetService
    }

    fn files(&self, ctx: &GenerationContext) -> Vec<GeneratedFile> {
        let project = format!("{}.Framework.csproj", ctx.org_key);
        vec![
            GeneratedFile::new(service_path(self.id(), &project), ctx.render(CSPROJ)),
            GeneratedFile::new(service_path(self.id(), "Program.cs"), ctx.render(PROGRAM_CS)),
        ]
    }
}
