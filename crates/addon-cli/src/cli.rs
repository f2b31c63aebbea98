//! CLI argument parsing using clap derive

use std::path::PathBuf;

use addon_registry::{DEFAULT_ECOSYSTEM, InstallableFilter};
use clap::{Args, Parser, Subcommand};

/// Addon Manager - Discover addon modules and resolve their dependencies
#[derive(Parser, Debug)]
#[command(name = "addons")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options file to read and edit
    #[arg(short, long, env = "ADDONS_RC", global = true)]
    pub config: Option<PathBuf>,

    /// Base installation; its `addons` directory is always searched
    #[arg(long, env = "ADDONS_BASE_PATH", global = true)]
    pub base_path: Option<PathBuf>,

    /// Extra search locations, separated like PATH
    #[arg(long, env = "ADDONS_EXTRA_PATHS", global = true)]
    pub extra_paths: Option<String>,

    /// Ignore modules of the base installation
    #[arg(long, global = true)]
    pub exclude_base: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List, inspect and resolve modules
    Module {
        #[command(subcommand)]
        action: ModuleAction,
    },

    /// Inspect and edit module search paths
    Path {
        #[command(subcommand)]
        action: PathAction,
    },

    /// Read and write the options file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Platform information
    Platform {
        #[command(subcommand)]
        action: PlatformAction,
    },
}

/// Installable state selection shared by listing commands
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallableArgs {
    /// Only installable modules
    #[arg(long, conflicts_with = "non_installable")]
    pub installable: bool,

    /// Only non-installable modules
    #[arg(long)]
    pub non_installable: bool,
}

impl InstallableArgs {
    pub fn filter(&self) -> InstallableFilter {
        if self.installable {
            InstallableFilter::Installable
        } else if self.non_installable {
            InstallableFilter::NonInstallable
        } else {
            InstallableFilter::Any
        }
    }
}

/// Output selection shared by listing commands
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputArgs {
    /// Print technical names only
    #[arg(long, visible_alias = "without-version")]
    pub only_name: bool,

    /// Join entries with commas on one line
    #[arg(long, conflicts_with = "json")]
    pub csv: bool,

    /// Print module details as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ModuleAction {
    /// List discovered modules
    ///
    /// Examples:
    ///   addons module ls                      # name==version per line
    ///   addons module ls --only-name --csv    # a,b,c
    ///   addons module ls -p ./vendor --sorted # include another tree
    Ls {
        /// Additional directories to search
        #[arg(short, long = "path")]
        paths: Vec<PathBuf>,

        /// Restrict to these technical names
        #[arg(short, long = "module")]
        modules: Vec<String>,

        #[command(flatten)]
        installable: InstallableArgs,

        /// Only server-wide modules
        #[arg(long, conflicts_with = "no_server_wide")]
        server_wide: bool,

        /// Hide server-wide modules
        #[arg(long)]
        no_server_wide: bool,

        /// Sort by technical name instead of discovery order
        #[arg(long)]
        sorted: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show one module as JSON
    Show {
        /// Technical name
        name: String,

        /// Also consider non-installable modules
        #[arg(long)]
        all: bool,
    },

    /// Print the dependencies of modules in installation order
    ///
    /// Examples:
    ///   addons module deps -m sale               # what sale needs
    ///   addons module deps -m sale --auto --csv  # plus auto-installed modules
    Deps {
        /// Modules to resolve
        #[arg(short, long = "module", required = true)]
        modules: Vec<String>,

        /// Additional directories to search
        #[arg(short, long = "path")]
        paths: Vec<PathBuf>,

        /// Include auto-install modules whose dependencies are met
        #[arg(long)]
        auto: bool,

        /// Also print the requested modules themselves
        #[arg(long)]
        include_requested: bool,

        #[command(flatten)]
        installable: InstallableArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print external package requirements of modules
    Requirements {
        /// Restrict to these technical names
        #[arg(short, long = "module")]
        modules: Vec<String>,

        /// Additional directories to search
        #[arg(short, long = "path")]
        paths: Vec<PathBuf>,

        /// Packaging ecosystem key of external_dependencies
        #[arg(long, default_value = DEFAULT_ECOSYSTEM)]
        ecosystem: String,

        /// Sort the package names
        #[arg(long)]
        sort: bool,

        /// Keep package names as declared instead of lowercasing
        #[arg(long)]
        preserve_case: bool,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PathAction {
    /// List effective search roots
    Ls {
        /// Additional directories to search
        paths: Vec<PathBuf>,

        /// Sort by path
        #[arg(long)]
        sorted: bool,
    },

    /// Add every addons directory found under PATH to addons_path
    Add { path: PathBuf },

    /// Remove addons_path entries located under PATH
    Rm { path: PathBuf },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print a value; KEY is `section.key`, a bare key means `options.key`
    Get { key: String },

    /// Set a value
    Set { key: String, value: String },

    /// List all values
    Ls,

    /// Print the options file location
    Path,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PlatformAction {
    /// Print the CPU architecture in container-image naming
    Arch,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_no_args() {
        let cli = Cli::parse_from(["addons"]);
        assert!(!cli.verbose);
        assert!(!cli.exclude_base);
        assert!(cli.command.is_none());
    }

    #[test]
    fn parse_global_flags_before_subcommand() {
        let cli = Cli::parse_from([
            "addons",
            "--exclude-base",
            "-c",
            "/tmp/addons.toml",
            "module",
            "ls",
            "--only-name",
        ]);
        assert!(cli.exclude_base);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/addons.toml")));
        assert!(matches!(
            cli.command,
            Some(Commands::Module {
                action: ModuleAction::Ls { ref output, .. }
            }) if output.only_name
        ));
    }

    #[test]
    fn parse_without_version_alias() {
        let cli = Cli::parse_from(["addons", "module", "ls", "--without-version"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Module {
                action: ModuleAction::Ls { ref output, .. }
            }) if output.only_name
        ));
    }

    #[test]
    fn parse_deps_command() {
        let cli = Cli::parse_from(["addons", "module", "deps", "-m", "f", "-m", "g", "--auto", "--csv"]);
        match cli.command {
            Some(Commands::Module {
                action:
                    ModuleAction::Deps {
                        modules,
                        auto,
                        output,
                        ..
                    },
            }) => {
                assert_eq!(modules, vec!["f", "g"]);
                assert!(auto);
                assert!(output.csv);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_deps_requires_module() {
        assert!(Cli::try_parse_from(["addons", "module", "deps"]).is_err());
    }

    #[test]
    fn parse_conflicting_installable_flags() {
        let result = Cli::try_parse_from([
            "addons",
            "module",
            "ls",
            "--installable",
            "--non-installable",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_requirements_defaults() {
        let cli = Cli::parse_from(["addons", "module", "requirements"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Module {
                action: ModuleAction::Requirements { ref ecosystem, sort: false, preserve_case: false, .. }
            }) if ecosystem == DEFAULT_ECOSYSTEM
        ));
    }

    #[test]
    fn installable_args_filter() {
        assert_eq!(InstallableArgs::default().filter(), InstallableFilter::Any);
        let only = InstallableArgs {
            installable: true,
            non_installable: false,
        };
        assert_eq!(only.filter(), InstallableFilter::Installable);
    }

    #[test]
    fn parse_config_set() {
        let cli = Cli::parse_from(["addons", "config", "set", "data_dir", "/var/lib/app"]);
        assert_eq!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Set {
                    key: "data_dir".into(),
                    value: "/var/lib/app".into(),
                }
            })
        );
    }
}
