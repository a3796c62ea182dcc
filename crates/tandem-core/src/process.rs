//! Running external tools with their output streams merged.

use std::io::{self, Read};
use std::process::{Command, ExitStatus, Stdio};

/// Exit status and combined output of a finished tool.
#[derive(Debug)]
pub(crate) struct MergedOutput {
    pub status: ExitStatus,

    /// stdout and stderr interleaved in the order the tool wrote them
    pub text: String,
}

/// Run `cmd` to completion with stdout and stderr sharing one pipe.
pub(crate) fn output_merged(mut cmd: Command) -> io::Result<MergedOutput> {
    let (mut reader, writer) = io::pipe()?;
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(writer.try_clone()?)
        .stderr(writer)
        .spawn()?;

    // The command keeps its copies of the write end open until dropped.
    drop(cmd);

    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let status = child.wait()?;

    Ok(MergedOutput {
        status,
        text: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_streams_keep_emission_order() {
        let mut cmd = Command::new("/bin/sh");
        cmd.arg("-c")
            .arg("echo one; echo two >&2; echo three; echo four >&2; exit 2");

        let output = output_merged(cmd).unwrap();
        assert_eq!(output.text, "one\ntwo\nthree\nfour\n");
        assert_eq!(output.status.code(), Some(2));
    }

    #[test]
    fn test_missing_program() {
        let err = output_merged(Command::new("/nonexistent/tandem-tool")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
