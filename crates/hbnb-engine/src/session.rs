//! The read-line loop
//!
//! One line is one command. The loop ends on `quit`, `EOF` or end of input.
//! Banners and the prompt are only written in interactive mode, so piped
//! sessions produce nothing but command output. Bytes that are not valid
//! UTF-8 are replaced rather than ending the session.

use std::io::{self, BufRead, Write};

use crate::commands::console::{Console, Control};
use crate::commands::help::{FAREWELL_BANNER, WELCOME_BANNER};

/// Drive `console` from `input` until the session ends
///
/// # Errors
///
/// Returns read errors on `input` and write errors on `out`.
pub fn run_session<R: BufRead, W: Write>(
    console: &mut Console,
    mut input: R,
    out: &mut W,
    interactive: bool,
) -> io::Result<()> {
    if interactive {
        for line in WELCOME_BANNER {
            writeln!(out, "{}", line)?;
        }
    }

    let mut buf = Vec::new();
    loop {
        if interactive {
            write!(out, "{}", console.prompt())?;
            out.flush()?;
        }

        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            if interactive {
                writeln!(out)?;
            }
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        if console.execute_line(&line, &mut *out)? == Control::Exit {
            break;
        }
        out.flush()?;
    }

    if interactive {
        for line in FAREWELL_BANNER {
            writeln!(out, "{}", line)?;
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbnb_store::FileStorage;
    use tempfile::TempDir;

    fn console_in(dir: &TempDir) -> Console {
        Console::new(Box::new(FileStorage::new(dir.path().join("file.json"))))
    }

    fn session(console: &mut Console, script: &str, interactive: bool) -> String {
        session_bytes(console, script.as_bytes(), interactive)
    }

    fn session_bytes(console: &mut Console, script: &[u8], interactive: bool) -> String {
        let mut out = Vec::new();
        run_session(console, script, &mut out, interactive).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_piped_session_prints_only_output() {
        let dir = TempDir::new().unwrap();
        let mut console = console_in(&dir);

        let output = session(&mut console, "count User\nshow\n", false);

        assert_eq!(output, "0\n** class name missing **\n");
    }

    #[test]
    fn test_interactive_session_has_banners_and_prompt() {
        let dir = TempDir::new().unwrap();
        let mut console = console_in(&dir);

        let output = session(&mut console, "all\n", true);

        assert!(output.starts_with(WELCOME_BANNER[0]));
        assert!(output.contains("|    Welcome to hbnb CLI!    |"));
        assert!(output.contains("(hbnb) \n(hbnb) \n"));
        assert!(output.ends_with(&format!("{}\n", FAREWELL_BANNER[2])));
    }

    #[test]
    fn test_invalid_utf8_line_does_not_end_session() {
        let dir = TempDir::new().unwrap();
        let mut console = console_in(&dir);

        let script = b"count User\nshow User \xff\xfe\ncount User\n";
        let output = session_bytes(&mut console, script, false);

        assert_eq!(output, "0\n** no instance found **\n0\n");
    }

    #[test]
    fn test_quit_stops_reading() {
        let dir = TempDir::new().unwrap();
        let mut console = console_in(&dir);

        let output = session(&mut console, "quit\ncount User\n", false);

        assert!(output.is_empty());
    }
}
