use super::{service_path, StackGenerator, StackId};
use crate::scaffold::{GeneratedFile, GenerationContext};

const SERVER_JS: &str = include_str!("../../templates/stacks/node-service/server.js");
const NPMRC: &str = include_str!("../../templates/stacks/node-service/.npmrc");

pub struct NodeServiceGenerator;

impl StackGenerator for NodeServiceGenerator {
    fn id(&self) -> StackId {
        StackId::NodeService
    }

    fn files(&self, ctx: &GenerationContext) -> Vec<GeneratedFile> {
        vec![
            GeneratedFile::new(service_path(self.id(), "server.js"), ctx.render(SERVER_JS)),
            GeneratedFile::new(service_path(self.id(), ".npmrc"), NPMRC),
        ]
    }
}
