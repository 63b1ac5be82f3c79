//! SwiftPM executable package

use super::{service_path, StackGenerator, StackId};
use crate::scaffold::{GeneratedFile, GenerationContext};

const PACKAGE_SWIFT: &str = include_str!("../../templates/stacks/swift-package/Package.swift");
const MAIN_SWIFT: &str = include_str!("../../templates/stacks/swift-package/main.swift");

pub struct SwiftPackageGenerator;

impl StackGenerator for SwiftPackageGenerator {
    fn id(&self) -> StackId {
        StackId::SwiftPackage
    }

    fn files(&self, ctx: &GenerationContext) -> Vec<GeneratedFile> {
        vec![
            GeneratedFile::new(service_path(self.id(), "Package.swift"), ctx.render(PACKAGE_SWIFT)),
            GeneratedFile::new(service_path(self.id(), "Sources/main.swift"), ctx.render(MAIN_SWIFT)),
        ]
    }
}
