/// Declares a closed identifier enum with a wire slug and a display name.
#[macro_export]
macro_rules! define_stack_ids {
    (
        $(#[$enum_meta:meta])*
        $enum_name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $slug:literal : $display_name:literal
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $enum_name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl serde::Serialize for $enum_name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.slug())
            }
        }

        impl $enum_name {
            pub fn slug(&self) -> &'static str {
                match self {
                    $(
                        Self::$variant => $slug,
                    )*
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(
                        Self::$variant => $display_name,
                    )*
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.slug())
            }
        }
    };
}

crate::define_stack_ids! {
    /// Language or build stack a generator strategy produces
    StackId {
        GoService => "go-service" : "Go service",
        PythonApi => "python-api" : "Python API",
        JavaMaven => "java-maven" : "Java (Maven)",
        JavaGradle => "java-gradle" : "Java (Gradle)",
        NodeService => "node-service" : "Node.js service",
        DotnetService => "dotnet-service" : ".NET service",
        SwiftPackage => "swift-package" : "Swift package",
        RustService => "rust-service" : "Rust service",
    }
}
