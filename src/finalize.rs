//! End-of-sequence handoff: write the closing note and open it in a viewer.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread::{self, JoinHandle};

use tracing::{info, warn};

use crate::error::Result;

/// Title line and completion line written when the sequence ends.
pub const FINAL_NOTE: &str = "MOGGADO pelo jodismiu\r\nFim da sequência.";

pub const FINAL_NOTE_FILE: &str = "moggado_final.txt";

/// Receives the final text once the last phase is done.
pub trait Handoff {
    fn deliver(&mut self, text: &str) -> Result<()>;
}

/// Writes the note to a file and opens it with the platform's text viewer.
#[derive(Debug, Clone)]
pub struct TextFileHandoff {
    path: PathBuf,
    launch_viewer: bool,
}

impl TextFileHandoff {
    pub fn new(path: impl Into<PathBuf>, launch_viewer: bool) -> Self {
        Self {
            path: path.into(),
            launch_viewer,
        }
    }

    /// `<temp>/moggado_final.txt`
    pub fn default_path() -> PathBuf {
        std::env::temp_dir().join(FINAL_NOTE_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Handoff for TextFileHandoff {
    fn deliver(&mut self, text: &str) -> Result<()> {
        fs::write(&self.path, text)?;
        info!(path = %self.path.display(), "final note written");
        if self.launch_viewer {
            spawn_reaped(viewer_command(&self.path))?;
        }
        Ok(())
    }
}

fn viewer_command(path: &Path) -> Command {
    let program = if cfg!(target_os = "windows") {
        "notepad.exe"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    let mut cmd = Command::new(program);
    cmd.arg(path);
    cmd
}

/// Start `cmd` detached from the render loop; a helper thread waits on it so
/// the child is reaped when the viewer exits.
fn spawn_reaped(mut cmd: Command) -> Result<JoinHandle<()>> {
    let mut child = cmd.spawn()?;
    Ok(thread::spawn(move || {
        if let Err(err) = child.wait() {
            warn!(%err, "viewer did not exit cleanly");
        }
    }))
}

/// Runs the handoff at most once; failures are logged and swallowed.
pub struct Finalizer {
    handoff: Box<dyn Handoff>,
    done: bool,
}

impl Finalizer {
    pub fn new(handoff: Box<dyn Handoff>) -> Self {
        Self { handoff, done: false }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Returns `false` when the handoff already ran.
    pub fn run(&mut self) -> bool {
        if self.done {
            return false;
        }
        self.done = true;
        if let Err(err) = self.handoff.deliver(FINAL_NOTE) {
            warn!(%err, "final handoff failed; ignoring");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Failing(Rc<Cell<u32>>);

    impl Handoff for Failing {
        fn deliver(&mut self, _text: &str) -> Result<()> {
            self.0.set(self.0.get() + 1);
            Err(Error::Handoff(std::io::Error::other("viewer missing")))
        }
    }

    #[test]
    fn runs_once_and_swallows_failures() {
        let calls = Rc::new(Cell::new(0));
        let mut finalizer = Finalizer::new(Box::new(Failing(calls.clone())));
        assert!(finalizer.run());
        assert!(finalizer.is_done());
        assert!(!finalizer.run());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn text_file_handoff_writes_the_note() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(FINAL_NOTE_FILE);
        let mut handoff = TextFileHandoff::new(&path, false);
        handoff.deliver(FINAL_NOTE).expect("deliver");
        let written = fs::read_to_string(&path).expect("read back");
        assert_eq!(written, "MOGGADO pelo jodismiu\r\nFim da sequência.");
    }

    #[test]
    fn text_file_handoff_reports_unwritable_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join(FINAL_NOTE_FILE);
        let mut handoff = TextFileHandoff::new(path, false);
        assert!(matches!(handoff.deliver("x"), Err(Error::Handoff(_))));
    }

    #[cfg(unix)]
    #[test]
    fn viewer_child_is_waited_on() {
        let waiter = spawn_reaped(Command::new("true")).expect("spawn");
        waiter.join().expect("waiter thread");
    }

    #[test]
    fn missing_viewer_is_a_handoff_error() {
        let cmd = Command::new("melt-screen-no-such-viewer");
        assert!(matches!(spawn_reaped(cmd), Err(Error::Handoff(_))));
    }

    #[test]
    fn default_path_lives_in_the_temp_dir() {
        let path = TextFileHandoff::default_path();
        assert!(path.starts_with(std::env::temp_dir()));
        assert!(path.ends_with(FINAL_NOTE_FILE));
    }
}
