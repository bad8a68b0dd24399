use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Stdin, Stdout};
use crate::env::Environment;
use crate::external;
use crate::interpreter::Factory;
use anyhow::{Context, Result, bail};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::ffi::OsStr;
use std::io::{Read, Write};
use std::path::PathBuf;

/// The closed set of command names handled in-process.
///
/// Lookup is exact and case-sensitive. `type` consults this table, and
/// [`crate::Interpreter`] registers one factory per entry ahead of the
/// external launcher, which is what gives builtins priority over external
/// executables of the same name.
pub(crate) const BUILTIN_NAMES: &[&str] = &["cd", "echo", "exit", "pwd", "type"];

pub(crate) fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed
/// directly in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Executes the command using provided IO streams and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(
        self,
        stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        mut stdin: Box<dyn Stdin>,
        mut stdout: Box<dyn Stdout>,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        match T::execute(*self, &mut stdin, &mut stdout, env) {
            Ok(x) => Ok(x),
            // Builtin failures are user errors, not loop errors: report on
            // stderr (never into a redirected stdout) and keep the loop alive.
            Err(e) => {
                eprintln!("{e}");
                Ok(1)
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        _stdin: Box<dyn Stdin>,
        mut stdout: Box<dyn Stdout>,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        stdout.write_all(self.output.as_bytes())?;
        Ok(if self.is_error { 1 } else { 0 })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        writeln!(stdout, "{}", env.current_dir.display())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// With no target, changes to the directory named by HOME; a leading tilde
/// is expanded to the same place.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory. Defaults to $HOME when omitted.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        _stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let target = match self.target.as_deref() {
            Some(t) if !t.is_empty() => {
                PathBuf::from(shellexpand::tilde_with_context(t, || env.home()).as_ref())
            }
            _ => match env.home() {
                Some(home) => PathBuf::from(home),
                None => bail!("cd: HOME not set"),
            },
        };

        let new_dir = if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        };

        // Distinguish the two common failures by kind; anything else carries
        // the underlying OS error. The working directory is only touched on
        // the success path.
        if !new_dir.exists() {
            bail!("cd: {}: No such file or directory", new_dir.display());
        }
        if !new_dir.is_dir() {
            bail!("cd: {}: Not a directory", new_dir.display());
        }

        let canonical = std::fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: {}", new_dir.display()))?;
        env::set_current_dir(&canonical).with_context(|| format!("cd: {}", canonical.display()))?;
        env.current_dir = canonical;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Terminate the shell with the given status, 0 when omitted.
pub struct Exit {
    #[argh(positional)]
    /// numeric exit status; a malformed value exits with status 1.
    pub code: Option<String>,
}

impl Exit {
    /// Status the process will exit with: 0 with no argument, the parsed
    /// value for a well-formed integer, 1 for anything malformed.
    fn status(&self) -> ExitCode {
        match self.code.as_deref() {
            None => 0,
            Some(raw) => raw.parse().unwrap_or(1),
        }
    }
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        _stdout: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        // The one builtin whose effect is process termination.
        std::process::exit(self.status())
    }
}

#[derive(FromArgs)]
/// Write the arguments to standard output, separated by spaces.
/// By default, a trailing newline is printed.
pub struct Echo {
    #[argh(switch, short = 'n')]
    /// do not output the trailing newline.
    pub no_newline: bool,

    #[argh(positional, greedy)]
    /// values to print as-is, separated by spaces.
    pub args: Vec<String>,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        let s = self.args.join(" ");
        if self.no_newline {
            write!(stdout, "{}", s)?;
        } else {
            writeln!(stdout, "{}", s)?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Report how a command name would be interpreted: as a shell builtin, as an
/// executable found on PATH, or not at all.
pub struct Type {
    #[argh(positional)]
    /// command name to look up.
    pub name: String,
}

impl BuiltinCommand for Type {
    fn name() -> &'static str {
        "type"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        if is_builtin(&self.name) {
            writeln!(stdout, "{} is a shell builtin", self.name)?;
            return Ok(0);
        }

        let search_paths = env.get_var("PATH").unwrap_or_default();
        match external::resolve(OsStr::new(&search_paths), &self.name) {
            Some(path) => {
                writeln!(stdout, "{} is {}", self.name, path.display())?;
                Ok(0)
            }
            None => {
                writeln!(stdout, "{}: not found", self.name)?;
                Ok(1)
            }
        }
    }
}
