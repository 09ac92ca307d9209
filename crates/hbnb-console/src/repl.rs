use std::io::{BufRead, Write};

use hbnb_store::StorageBackend;
use tracing::info;

use crate::dispatcher::{Control, Dispatcher};
use crate::error::ConsoleResult;

/// Default console prompt.
pub const DEFAULT_PROMPT: &str = "(hbnb) ";

/// Line-oriented front end over a [`Dispatcher`].
pub struct Console<B> {
    dispatcher: Dispatcher<B>,
    prompt: String,
}

impl<B: StorageBackend> Console<B> {
    pub fn new(dispatcher: Dispatcher<B>) -> Self {
        Self {
            dispatcher,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn dispatcher(&self) -> &Dispatcher<B> {
        &self.dispatcher
    }

    /// Dispatch one line and flush whatever it printed.
    ///
    /// Line-editing front ends drive the console through this.
    pub fn onecmd<W: Write>(&mut self, line: &str, out: &mut W) -> ConsoleResult<Control> {
        let control = self.dispatcher.onecmd(line, out)?;
        out.flush()?;
        Ok(control)
    }

    /// Prompt, read, dispatch until `quit` or end of input.
    ///
    /// End of input is dispatched as `EOF`.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> ConsoleResult<()> {
        info!(prompt = %self.prompt, "console session started");
        let mut line = String::new();
        loop {
            write!(out, "{}", self.prompt)?;
            out.flush()?;

            line.clear();
            let command = if input.read_line(&mut line)? == 0 {
                "EOF"
            } else {
                line.trim_end_matches(['\n', '\r'])
            };

            if self.onecmd(command, out)? == Control::Exit {
                info!("console session finished");
                return Ok(());
            }
        }
    }

    /// Dispatch a fixed list of commands without prompting.
    ///
    /// Stops early when a command asks to exit.
    pub fn run_script<I, S, W>(&mut self, commands: I, out: &mut W) -> ConsoleResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        W: Write,
    {
        for command in commands {
            if self.dispatcher.onecmd(command.as_ref(), out)? == Control::Exit {
                break;
            }
        }
        out.flush()?;
        Ok(())
    }
}
