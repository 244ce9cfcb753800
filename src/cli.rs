use clap::Parser;
use flate2::Compression;

#[derive(Parser, Debug)]
#[command(name = "memzip")]
#[command(version)]
#[command(about = "Extract and create ZIP archives", long_about = None)]
#[command(after_help = "Examples:\n  \
  memzip data.zip -d out           extract every file of data.zip into out/\n  \
  memzip -p data.zip notes.txt     print notes.txt from data.zip\n  \
  memzip -c backup.zip a.txt b.txt create backup.zip from two files")]
pub struct Cli {
    /// ZIP archive path
    #[arg(value_name = "ARCHIVE")]
    pub archive: String,

    /// Entries to extract, or files to add with -c (default: all entries)
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// Create ARCHIVE from FILES
    #[arg(short = 'c')]
    pub create: bool,

    /// List files (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Extract files to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Extract files into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Overwrite existing files WITHOUT prompting
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Deflate level used with -c (0-9)
    #[arg(long, value_name = "N", default_value_t = 6, value_parser = clap::value_parser!(u32).range(0..=9))]
    pub level: u32,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    pub fn compression(&self) -> Compression {
        Compression::new(self.level)
    }

    /// Whether an archive entry was asked for on the command line.
    ///
    /// Matches the full entry name or just its last path segment.
    pub fn wants(&self, entry_name: &str) -> bool {
        if self.files.is_empty() {
            return true;
        }
        let basename = entry_name.rsplit('/').next().unwrap_or(entry_name);
        self.files
            .iter()
            .any(|f| f == entry_name || f == basename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_mode() {
        let cli = Cli::try_parse_from(["memzip", "-c", "--level", "9", "out.zip", "a", "b"]).unwrap();
        assert!(cli.create);
        assert_eq!(cli.archive, "out.zip");
        assert_eq!(cli.files, ["a", "b"]);
        assert_eq!(cli.compression(), Compression::best());
    }

    #[test]
    fn rejects_bad_level() {
        assert!(Cli::try_parse_from(["memzip", "--level", "10", "x.zip"]).is_err());
    }

    #[test]
    fn entry_selection() {
        let cli = Cli::try_parse_from(["memzip", "-qq", "x.zip", "b.txt", "dir/c"]).unwrap();
        assert!(cli.is_very_quiet());
        assert!(cli.wants("b.txt"));
        assert!(cli.wants("deep/b.txt"));
        assert!(cli.wants("dir/c"));
        assert!(!cli.wants("other/dir/c"));
        assert!(!cli.wants("a.txt"));

        let all = Cli::try_parse_from(["memzip", "x.zip"]).unwrap();
        assert!(all.wants("anything"));
        assert!(!all.is_quiet());
    }
}
