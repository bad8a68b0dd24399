use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Stdin, Stdout};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::Result;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Command that is not a builtin: a separate executable, spawned and waited on.
pub struct ExternalCommand {
    path: OsString,
    args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(path: OsString, args: Vec<OsString>) -> Self {
        Self { path, args }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        // PATH is re-read on every resolution, so a changed search path takes
        // effect immediately instead of being cached at startup.
        let search_paths = env.get_var("PATH").unwrap_or_default();
        let executable = resolve(OsStr::new(&search_paths), name)?;
        Some(Box::new(ExternalCommand::new(
            executable.into_os_string(),
            args.iter().map(|x| x.into()).collect(),
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        stdin: Box<dyn Stdin>,
        stdout: Box<dyn Stdout>,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let mut child = std::process::Command::new(&self.path)
            .args(&self.args)
            .stdin(stdin.stdio())
            .stdout(stdout.stdio())
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir)
            .spawn()?;
        let exit_status = child.wait()?;
        match exit_status.code() {
            Some(x) => Ok(x),
            None => Ok(terminated_by_signal(exit_status)),
        }
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command name to an executable path.
///
/// A name containing a path separator is taken as a path and checked
/// directly, so `./prog` and `/usr/bin/prog` run without a PATH entry.
/// A bare name is searched for in each directory of `search_paths`, in
/// order; non-directories are skipped and the candidate must be a regular,
/// executable file. The first match wins — earlier PATH entries shadow
/// later ones. `None` is a lookup miss, not an error.
pub fn resolve(search_paths: &OsStr, name: &str) -> Option<PathBuf> {
    let as_path = Path::new(name);
    if as_path.components().count() > 1 || as_path.is_absolute() {
        return runnable(as_path.to_path_buf());
    }

    for dir in std::env::split_paths(search_paths) {
        if !dir.is_dir() {
            continue;
        }
        if let Some(found) = runnable(dir.join(name)) {
            return Some(found);
        }
    }
    None
}

fn runnable(candidate: PathBuf) -> Option<PathBuf> {
    if candidate.is_file() && is_executable(&candidate) {
        Some(candidate)
    } else {
        None
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::fs::File;

    struct TempDirs {
        base: PathBuf,
    }

    impl TempDirs {
        fn new(tag: &str) -> Self {
            let base =
                std::env::temp_dir().join(format!("minsh_resolve_{}_{}", std::process::id(), tag));
            let _ = fs::remove_dir_all(&base);
            fs::create_dir_all(&base).expect("create temp base");
            Self { base }
        }

        fn dir(&self, name: &str) -> PathBuf {
            let d = self.base.join(name);
            fs::create_dir_all(&d).expect("create temp dir");
            d
        }
    }

    impl Drop for TempDirs {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.base);
        }
    }

    #[cfg(unix)]
    fn touch_executable(dir: &Path, name: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        File::create(&path).expect("touch");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
        path
    }

    fn join_paths(dirs: &[&Path]) -> OsString {
        std::env::join_paths(dirs.iter().copied()).expect("join paths")
    }

    #[test]
    #[cfg(unix)]
    fn bare_name_found_in_path() {
        let tmp = TempDirs::new("hit");
        let bin = tmp.dir("bin");
        let expected = touch_executable(&bin, "frobnicate");

        let found = resolve(&join_paths(&[&bin]), "frobnicate");
        assert_eq!(found, Some(expected));
    }

    #[test]
    #[cfg(unix)]
    fn bare_name_not_in_path_is_a_miss() {
        let tmp = TempDirs::new("miss");
        let bin = tmp.dir("bin");
        assert_eq!(resolve(&join_paths(&[&bin]), "no_such_tool"), None);
    }

    #[test]
    #[cfg(unix)]
    fn earlier_path_entries_shadow_later_ones() {
        let tmp = TempDirs::new("order");
        let first = tmp.dir("first");
        let second = tmp.dir("second");
        let winner = touch_executable(&first, "tool");
        touch_executable(&second, "tool");

        let found = resolve(&join_paths(&[&first, &second]), "tool");
        assert_eq!(found, Some(winner));
    }

    #[test]
    #[cfg(unix)]
    fn non_executable_files_are_skipped() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = TempDirs::new("noexec");
        let first = tmp.dir("first");
        let second = tmp.dir("second");
        let plain = first.join("tool");
        File::create(&plain).expect("touch");
        fs::set_permissions(&plain, fs::Permissions::from_mode(0o644)).expect("chmod");
        let exec = touch_executable(&second, "tool");

        let found = resolve(&join_paths(&[&first, &second]), "tool");
        assert_eq!(found, Some(exec));
    }

    #[test]
    #[cfg(unix)]
    fn path_entries_that_are_not_directories_are_skipped() {
        let tmp = TempDirs::new("notdir");
        let not_a_dir = tmp.base.join("file_entry");
        File::create(&not_a_dir).expect("touch");
        let bin = tmp.dir("bin");
        let expected = touch_executable(&bin, "tool");

        let found = resolve(&join_paths(&[&not_a_dir, &bin]), "tool");
        assert_eq!(found, Some(expected));
    }

    #[test]
    #[cfg(unix)]
    fn names_with_separators_bypass_the_path_walk() {
        let tmp = TempDirs::new("direct");
        let bin = tmp.dir("bin");
        let direct = touch_executable(&bin, "tool");

        // Empty search path; the explicit path still resolves.
        let found = resolve(OsStr::new(""), direct.to_str().unwrap());
        assert_eq!(found, Some(direct));
    }

    #[test]
    #[cfg(unix)]
    fn directories_are_not_runnable() {
        let tmp = TempDirs::new("dir_candidate");
        let bin = tmp.dir("bin");
        tmp.dir("bin/tool");
        assert_eq!(resolve(&join_paths(&[&bin]), "tool"), None);
    }
}
