use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic: what happened and,
/// where there is one, how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::BackupMismatch { backup, original } => format!("\
# Error: Backup Mismatch

`{}` does not match `{}` byte for byte. The document was not modified.

## Fix

Check free disk space and permissions in the target directory, then run again.
", backup.display(), original.display()),

        Error::FileNotFound { path } => format!("\
# Error: File Not Found

`{}` does not exist.

## Fix

Pass the exported map explicitly:

    appearance-patch modify path/to/index.html
", path.display()),

        Error::Io(err) => format!("\
# Error: I/O

{err}

The backup written before this step is intact; restore from it if the
document looks truncated.
"),

        Error::Json(err) => format!("\
# Error: JSON Serialization

{err}
"),

        Error::Pattern(err) => format!("\
# Error: Invalid Pattern

{err}
"),

        Error::TomlDe(err) => format!("\
# Error: Invalid TOML

{err}

## Fix

Correct or remove `.appearance.toml` next to the target file.
"),
    };
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn backup_mismatch_names_both_files() {
        let md = render_error(&Error::BackupMismatch {
            backup: PathBuf::from("maps/index.backup_20261019_142501.html"),
            original: PathBuf::from("maps/index.html"),
        });
        assert!(md.starts_with("# Error: Backup Mismatch"));
        assert!(md.contains("`maps/index.backup_20261019_142501.html` does not match `maps/index.html`"));
        assert!(md.contains("The document was not modified."));
    }

    #[test]
    fn missing_file_names_the_path() {
        let md = render_error(&Error::FileNotFound { path: PathBuf::from("maps/index.html") });
        assert!(md.starts_with("# Error: File Not Found"));
        assert!(md.contains("`maps/index.html` does not exist."));
    }

    #[test]
    fn toml_errors_point_at_config() {
        let err = toml::from_str::<toml::Table>("= broken").unwrap_err();
        let md = render_error(&Error::TomlDe(err));
        assert!(md.contains(".appearance.toml"));
    }
}
