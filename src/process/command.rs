//! Command description and captured result

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// External command to run: program plus argv, no shell involved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program name as shown in diagnostics
    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.is_empty() || arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Result of a command that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// None when the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// stdout and stderr interleaved in arrival order
    pub output: String,
    pub duration: Duration,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_empty_and_spaced_args() {
        let spec = CommandSpec::new("cmd")
            .args(["/C", "start", "/wait", ""])
            .arg("C:\\Users\\Jo Doe\\miniconda.exe");
        assert_eq!(
            spec.to_string(),
            "cmd /C start /wait \"\" \"C:\\Users\\Jo Doe\\miniconda.exe\""
        );
    }

    #[test]
    fn test_output_success() {
        let ok = CommandOutput {
            exit_code: Some(0),
            output: String::new(),
            duration: Duration::ZERO,
        };
        assert!(ok.success());

        let killed = CommandOutput {
            exit_code: None,
            ..ok
        };
        assert!(!killed.success());
    }
}
