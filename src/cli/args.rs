use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone, PartialEq, Eq)]
#[command(name = "pyconsole")]
#[command(
    about = "Incrementally-compiled interactive Python console",
    long_about = "Incrementally-compiled interactive Python console\n\nConfig file loading:\n  - --config <path> (explicit file, overrides default path discovery)\n  - Default probe path when --config is not provided:\n    1. $XDG_CONFIG_HOME/pyconsole/config.toml\n    2. ~/.config/pyconsole/config.toml"
)]
pub struct CliArgs {
    /// Load config from this file path instead of the default discovery path.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Initialize the interpreter session, run a self-check, and exit.
    #[arg(long)]
    pub smoke_python: bool,
}

#[cfg(test)]
mod tests {
    use super::CliArgs;
    use clap::Parser;

    #[test]
    fn parse_defaults() {
        let args = CliArgs::try_parse_from(["pyconsole"]).expect("should parse");
        assert_eq!(args.config, None);
        assert!(!args.smoke_python);
    }

    #[test]
    fn parse_config_flag() {
        let args =
            CliArgs::try_parse_from(["pyconsole", "--config", "/tmp/custom.toml"]).expect("parse");
        assert_eq!(
            args.config.as_deref(),
            Some(std::path::Path::new("/tmp/custom.toml"))
        );
    }

    #[test]
    fn parse_smoke_python_flag() {
        let args = CliArgs::try_parse_from(["pyconsole", "--smoke-python"]).expect("parse");
        assert!(args.smoke_python);
    }
}
