//! Separation of the stdout redirection marker from a token sequence.
//!
//! Two surface forms are recognized, each also in the explicit-stream
//! spelling: a standalone `>` or `1>` token followed by the file name, and
//! the marker glued to the file name (`>out.txt`, `1>out.txt`). Only stdout
//! redirection exists in this shell; there is no append mode, no input
//! redirection and no stderr redirection.

use std::path::PathBuf;

/// Result of finding a redirection marker in a token sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// Standard output goes to this file, created or truncated.
    File(PathBuf),
    /// A marker was present as the last token, with no file name after it.
    Dangling,
}

/// Split a token sequence into command arguments and an optional redirection.
///
/// Only the first marker is honored: tokens before it form the command,
/// tokens after the marker and its file name are discarded (this shell has a
/// single-redirection-per-line model). A marker with no following file name
/// yields [`Redirect::Dangling`]; the caller decides how to report it.
pub fn extract(tokens: Vec<String>) -> (Vec<String>, Option<Redirect>) {
    for (i, token) in tokens.iter().enumerate() {
        let glued = if token == ">" || token == "1>" {
            None
        } else if let Some(rest) = token.strip_prefix("1>") {
            Some(rest)
        } else if let Some(rest) = token.strip_prefix('>') {
            Some(rest)
        } else {
            continue;
        };

        let redirect = match glued {
            Some(target) => Redirect::File(PathBuf::from(target)),
            None => match tokens.get(i + 1) {
                Some(target) => Redirect::File(PathBuf::from(target)),
                None => Redirect::Dangling,
            },
        };
        let argv = tokens[..i].to_vec();
        return (argv, Some(redirect));
    }
    (tokens, None)
}
