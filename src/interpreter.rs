use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Stdin, Stdout};
use crate::env::Environment;
use crate::lexer;
use crate::redirect::{self, Redirect};
use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fs::File;
use std::io::Read;
use std::process::Stdio;

const PROMPT: &str = "$ ";

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate — BuiltinCommand and ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal shell interpreter that can execute built-in and external commands.
///
/// The interpreter maintains an [`Environment`] and a list of [`CommandFactory`]
/// objects that are queried in order to create commands by name; the builtin
/// factories are registered ahead of the external launcher, so a builtin always
/// wins over an executable of the same name. See [`Default`] for the factories
/// included out of the box.
///
/// Example
/// ```
/// use minsh::Interpreter;
/// let mut sh = Interpreter::default();
/// let code = sh.run("echo", &["hello", "world"]).unwrap();
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            commands,
        }
    }

    /// Run a single command invocation by name with arguments, writing to the
    /// process's standard output.
    ///
    /// Returns the command's exit code, or an error if the command cannot be
    /// found or fails to execute.
    pub fn run(&mut self, name: &str, args: &[&str]) -> Result<ExitCode> {
        self.run_with_output(name, args, Box::new(std::io::stdout()))
    }

    fn run_with_output(
        &mut self,
        name: &str,
        args: &[&str],
        stdout: Box<dyn Stdout>,
    ) -> Result<ExitCode> {
        match self.create_command(name, args) {
            Some(cmd) => cmd.execute(inherited_stdin(), stdout, &mut self.env),
            None => Err(anyhow::anyhow!("{name}: command not found")),
        }
    }

    /// Ask each factory in registration order for a command with this name.
    fn create_command(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>> {
        self.commands
            .iter()
            .find_map(|factory| factory.try_create(&self.env, name, args))
    }

    /// The interactive Read-Eval-Print Loop.
    ///
    /// Prompts with `"$ "`, reads one line at a time and executes it. Ctrl-C
    /// only discards the line being edited; end-of-input ends the loop with
    /// exit status 0. No failure while executing a line ends the loop — the
    /// `exit` builtin terminates the process directly.
    pub fn repl(&mut self) -> Result<ExitCode> {
        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let _ = rl.add_history_entry(line.as_str());
                    self.execute_line(&line);
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(0),
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Tokenize, extract redirection and dispatch a single input line.
    ///
    /// Every failure is reported on stderr and recovered locally; this
    /// function never aborts the loop.
    fn execute_line(&mut self, line: &str) {
        let tokens = match lexer::tokenize(line) {
            Ok(tokens) => tokens,
            Err(e) => {
                eprintln!("{e}");
                return;
            }
        };
        if tokens.is_empty() {
            return;
        }

        let (argv, redirect) = redirect::extract(tokens);

        // Opening the target happens before dispatch so that the command's
        // whole output lands in the file. The handle is scoped to this one
        // command: it drops when execution finishes, on every path, and the
        // real stdout is never replaced. On any redirection error the command
        // still runs unredirected (one policy, applied uniformly).
        let stdout: Box<dyn Stdout> = match redirect {
            Some(Redirect::File(path)) => match File::create(&path) {
                Ok(file) => Box::new(file),
                Err(e) => {
                    eprintln!("{}: {e}", path.display());
                    Box::new(std::io::stdout())
                }
            },
            Some(Redirect::Dangling) => {
                eprintln!("syntax error: expected a file name after '>'");
                Box::new(std::io::stdout())
            }
            None => Box::new(std::io::stdout()),
        };

        // A line that was only a redirection has already created the file.
        let Some((name, args)) = argv.split_first() else {
            return;
        };
        let args: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

        match self.create_command(name, &args) {
            Some(cmd) => {
                if let Err(e) = cmd.execute(inherited_stdin(), stdout, &mut self.env) {
                    // e.g. the executable vanished between resolution and spawn
                    eprintln!("{name}: {e}");
                }
            }
            None => eprintln!("{name}: command not found"),
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands: the builtins
    /// `cd`, `echo`, `exit`, `pwd` and `type`, then the external launcher.
    fn default() -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(vec![
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Echo>::default()),
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Pwd>::default()),
            Box::new(Factory::<Type>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}

fn inherited_stdin() -> Box<dyn Stdin> {
    Box::new(InheritedStdin(std::io::stdin().lock()))
}

struct InheritedStdin(std::io::StdinLock<'static>);

impl Read for InheritedStdin {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.0.read(buf)
    }
}

impl Stdin for InheritedStdin {
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::inherit()
    }
}
