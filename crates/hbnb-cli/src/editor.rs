use std::io::Write;

use anyhow::anyhow;
use hbnb_console::{Console, Control};
use hbnb_store::StorageBackend;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;

/// Where interactive lines come from.
pub trait LineSource {
    /// The next line typed at `prompt`, or `None` at end of input.
    fn next_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>>;
}

/// Line editing with in-session history. Ctrl-C abandons the current line.
impl LineSource for DefaultEditor {
    fn next_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        loop {
            match self.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        self.add_history_entry(line.as_str())
                            .map_err(|e| anyhow!("failed to record history: {e}"))?;
                    }
                    return Ok(Some(line));
                }
                Err(ReadlineError::Eof) => return Ok(None),
                Err(ReadlineError::Interrupted) => continue,
                Err(e) => return Err(anyhow!("readline error: {e}")),
            }
        }
    }
}

/// Drive `console` from a terminal with line editing.
pub fn run_terminal<B: StorageBackend, W: Write>(
    console: &mut Console<B>,
    out: &mut W,
) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new().map_err(|e| anyhow!("failed to init rustyline: {e}"))?;
    run_with(console, &mut editor, out)
}

/// Read, dispatch, repeat until the console exits. End of input is `EOF`.
pub fn run_with<B, L, W>(console: &mut Console<B>, source: &mut L, out: &mut W) -> anyhow::Result<()>
where
    B: StorageBackend,
    L: LineSource,
    W: Write,
{
    info!("interactive session started");
    loop {
        let line = source.next_line(console.prompt())?;
        let command = line.as_deref().unwrap_or("EOF");
        if console.onecmd(command, out)? == Control::Exit {
            info!("interactive session finished");
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use hbnb_console::Dispatcher;
    use hbnb_store::{InMemoryBackend, ObjectStore};
    use hbnb_types::ClassRegistry;

    use super::*;

    /// Scripted input that records the prompts it was shown.
    struct Typed {
        lines: VecDeque<String>,
        prompts: Vec<String>,
    }

    impl Typed {
        fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|l| l.to_string()).collect(),
                prompts: Vec::new(),
            }
        }
    }

    impl LineSource for Typed {
        fn next_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
            self.prompts.push(prompt.to_string());
            Ok(self.lines.pop_front())
        }
    }

    fn console() -> Console<InMemoryBackend> {
        let store = ObjectStore::new(InMemoryBackend::new(), ClassRegistry::standard());
        Console::new(Dispatcher::new(store)).with_prompt("hbnb> ")
    }

    #[test]
    fn lines_are_dispatched_until_quit() {
        let mut console = console();
        let mut typed = Typed::new(&["create Amenity", "count Amenity", "quit", "count Amenity"]);
        let mut out = Vec::new();
        run_with(&mut console, &mut typed, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("\n1\n\n"));
        assert_eq!(typed.lines.len(), 1);
        assert_eq!(console.dispatcher().store().len(), 1);
    }

    #[test]
    fn end_of_input_is_eof() {
        let mut console = console();
        let mut typed = Typed::new(&["count User"]);
        let mut out = Vec::new();
        run_with(&mut console, &mut typed, &mut out).unwrap();
        assert_eq!(out, b"0\n\n");
        assert_eq!(typed.prompts, ["hbnb> ", "hbnb> "]);
    }

    #[test]
    fn source_errors_end_the_session() {
        struct Broken;
        impl LineSource for Broken {
            fn next_line(&mut self, _prompt: &str) -> anyhow::Result<Option<String>> {
                Err(anyhow!("readline error: terminal went away"))
            }
        }
        let mut console = console();
        let err = run_with(&mut console, &mut Broken, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("terminal went away"));
    }
}
