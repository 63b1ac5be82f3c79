use clap::Parser;

/// Generate and package an organization's enterprise deployment framework
#[derive(Parser, Debug)]
#[command(
    name = "framesmith",
    about = "Generate and package an organization's enterprise deployment framework",
    version,
    long_about = "framesmith generates the deployment framework tree for an organization \
                  (build entrypoints, container, IaC, CI and service stubs plus one skeleton \
                  per configured stack), runs its setup and build with retries, applies \
                  best-effort repairs and packages the tree as zip and tar.gz archives.\n\n\
                  Settings come from the environment: FRAMESMITH_ROOT, FRAMESMITH_VERSION, \
                  FRAMESMITH_MAX_ATTEMPTS, FRAMESMITH_INITIAL_BACKOFF_MS and \
                  FRAMESMITH_LOG_LEVEL.\n\n\
                  Examples:\n  \
                  framesmith Google\n  \
                  FRAMESMITH_ROOT=/srv/frameworks framesmith netflix"
)]
pub struct CliArgs {
    #[arg(
        value_name = "ORGANIZATION",
        help = "Organization to generate the framework for (case-insensitive)"
    )]
    pub organization: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_single_positional_argument() {
        let args = CliArgs::try_parse_from(["framesmith", "Google"]).unwrap();
        assert_eq!(args.organization, "Google");
    }

    #[test]
    fn test_missing_organization_is_an_error() {
        assert!(CliArgs::try_parse_from(["framesmith"]).is_err());
    }

    #[test]
    fn test_extra_arguments_are_rejected() {
        assert!(CliArgs::try_parse_from(["framesmith", "Google", "Amazon"]).is_err());
        assert!(CliArgs::try_parse_from(["framesmith", "--verbose", "Google"]).is_err());
    }
}
