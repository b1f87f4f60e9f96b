// src/shell/redirection.rs
use crate::shell::command_parser::Directive;
use crate::shell::executor::{LaunchError, StreamKind};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::process::Stdio;

const OUTPUT_MODE: u32 = 0o644;

/// Standard streams a launched process will inherit.
pub struct StreamBindings {
    pub stdin: Stdio,
    pub stdout: Stdio,
}

/// Opens the directive's redirection targets. Background processes with no
/// explicit target are bound to /dev/null so they never touch the terminal.
pub fn resolve(directive: &Directive) -> Result<StreamBindings, LaunchError> {
    let stdin = match &directive.input_redirect {
        Some(path) => Stdio::from(open_input(path)?),
        None if directive.background => Stdio::null(),
        None => Stdio::inherit(),
    };

    let stdout = match &directive.output_redirect {
        Some(path) => Stdio::from(open_output(path)?),
        None if directive.background => Stdio::null(),
        None => Stdio::inherit(),
    };

    Ok(StreamBindings { stdin, stdout })
}

fn open_input(path: &str) -> Result<File, LaunchError> {
    File::open(path).map_err(|source| LaunchError::Redirect {
        kind: StreamKind::Input,
        path: path.to_string(),
        source,
    })
}

fn open_output(path: &str) -> Result<File, LaunchError> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(OUTPUT_MODE)
        .open(path)
        .map_err(|source| LaunchError::Redirect {
            kind: StreamKind::Output,
            path: path.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn directive(input: Option<&str>, output: Option<&str>, background: bool) -> Directive {
        Directive {
            program: "cat".to_string(),
            args: vec!["cat".to_string()],
            input_redirect: input.map(String::from),
            output_redirect: output.map(String::from),
            background,
        }
    }

    #[test]
    fn test_missing_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        let missing = missing.to_str().unwrap();

        match resolve(&directive(Some(missing), None, false)) {
            Err(LaunchError::Redirect { kind, path, .. }) => {
                assert_eq!(kind, StreamKind::Input);
                assert_eq!(path, missing);
            }
            _ => panic!("Expected input redirection failure"),
        }
    }

    #[test]
    fn test_output_file_is_created_and_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        fs::write(&out, "stale contents").unwrap();

        resolve(&directive(None, Some(out.to_str().unwrap()), false)).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "");

        let fresh = dir.path().join("fresh.txt");
        resolve(&directive(None, Some(fresh.to_str().unwrap()), true)).unwrap();
        let mode = fs::metadata(&fresh).unwrap().permissions().mode();
        // umask may only clear bits
        assert_eq!(mode & !OUTPUT_MODE & 0o777, 0);
    }

    #[test]
    fn test_output_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("no/such/dir/out.txt");

        match resolve(&directive(None, Some(out.to_str().unwrap()), false)) {
            Err(LaunchError::Redirect { kind, .. }) => assert_eq!(kind, StreamKind::Output),
            _ => panic!("Expected output redirection failure"),
        }
    }

    #[test]
    fn test_defaults_resolve_without_files() {
        assert!(resolve(&directive(None, None, false)).is_ok());
        assert!(resolve(&directive(None, None, true)).is_ok());
    }
}
