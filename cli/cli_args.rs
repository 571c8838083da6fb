use clap::Parser;
use std::path::PathBuf;

const AFTER_HELP: &str = "\
DEFAULT EXCLUSIONS:
  Hidden files and directories (names starting with '.') unless --include-hidden
  VCS and dependency directories: .git/, .svn/, .hg/, node_modules/, .venv/, venv/, __pycache__/
  Build output: dist/, build/, out/, target/, .next/, coverage/
  Lock files, .env files (except .env.example), *.log, OS metadata files
  Binary files by extension (images, audio, video, archives, fonts, executables)
  Patterns from the project's ignore file (default: .gitignore)
  The output file itself

SYMBOLIC LINKS:
  Links to files are read as files. Links to directories are not followed,
  and dangling links are skipped.

EXAMPLES:
  packcode
  packcode -o context.txt --include-hidden
  packcode --project-root ~/src/app -s";

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "packcode",
    author,
    version,
    about = "Bundle a project's text files into one file with a structure preview.",
    long_about = "packcode walks the project directory, skips excluded and binary files, \nand writes every remaining text file into a single artifact preceded by a \nrendered directory tree.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = AFTER_HELP
)]
pub struct Cli {
    #[arg(
        short,
        long,
        help = "Name of the output file, relative to the project root (default: codebase.txt).",
        value_name = "FILENAME",
        help_heading = "Output"
    )]
    pub output: Option<String>,

    #[arg(
        short,
        long,
        help = "Suppress progress and success messages. Warnings, errors and the summary still print.",
        help_heading = "Output"
    )]
    pub silent: bool,

    #[arg(
        long,
        help = "Include hidden files and directories.",
        help_heading = "Filtering"
    )]
    pub include_hidden: bool,

    #[arg(
        long,
        help = "Ignore file to read from the project root (default: .gitignore).",
        value_name = "FILE",
        help_heading = "Filtering"
    )]
    pub ignore_file: Option<String>,

    #[arg(
        long,
        help = "Match ignore patterns case-insensitively (default: follow the host filesystem).",
        help_heading = "Filtering"
    )]
    pub ignore_case: bool,

    #[arg(
        long,
        help = "Specify the target project directory (default: $PROJECT_ROOT or current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Specify path/filename of the TOML config file (default: .packcode.toml).",
        value_name = "CONFIG_FILE",
        conflicts_with = "no_config",
        help_heading = "Project Setup"
    )]
    pub config: Option<String>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "config",
        help_heading = "Project Setup"
    )]
    pub no_config: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase diagnostic verbosity (-v, -vv, -vvv).")]
    pub verbose: u8,
}
