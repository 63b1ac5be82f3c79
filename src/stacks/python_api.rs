use super::{service_path, StackGenerator, StackId};
use crate::scaffold::{GeneratedFile, GenerationContext};

const APP_PY: &str = include_str!("../../templates/stacks/python-api/app.py");
const REQUIREMENTS: &str = include_str!("../../templates/stacks/python-api/requirements.txt");
const TEST_APP_PY: &str = include_str!("../../templates/stacks/python-api/test_app.py");

pub struct PythonApiGenerator;

impl StackGenerator for PythonApiGenerator {
    fn id(&self) -> StackId {
        StackId::PythonApi
    }

    fn files(&self, ctx: &GenerationContext) -> Vec<GeneratedFile> {
        let id = self.id();
        vec![
            GeneratedFile::new(service_path(id, "app.py"), ctx.render(APP_PY)),
            GeneratedFile::new(service_path(id, "requirements.txt"), REQUIREMENTS),
            GeneratedFile::new(service_path(id, "tests/test_app.py"), TEST_APP_PY),
        ]
    }
}
