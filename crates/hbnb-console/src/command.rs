//! Console verbs and the two surface syntaxes that reach them.

use std::fmt;

/// A console command verb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    Quit,
    Eof,
    Help,
    Create,
    Show,
    Destroy,
    All,
    Count,
    Update,
}

impl Verb {
    /// Every verb, in help-listing order.
    pub const ALL: [Verb; 9] = [
        Verb::Eof,
        Verb::All,
        Verb::Count,
        Verb::Create,
        Verb::Destroy,
        Verb::Help,
        Verb::Quit,
        Verb::Show,
        Verb::Update,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::Eof => "EOF",
            Self::Help => "help",
            Self::Create => "create",
            Self::Show => "show",
            Self::Destroy => "destroy",
            Self::All => "all",
            Self::Count => "count",
            Self::Update => "update",
        }
    }

    /// Whether the verb may be invoked as `<ClassName>.<verb>(<args>)`.
    pub fn accepts_dotted_call(&self) -> bool {
        matches!(
            self,
            Self::All | Self::Show | Self::Destroy | Self::Count | Self::Update
        )
    }

    /// Help text shown by `help <verb>`.
    pub fn usage(&self) -> &'static str {
        match self {
            Self::Quit => "Quit command to exit the program.",
            Self::Eof => "End of input (Ctrl-D) exits the program.",
            Self::Help => "List available commands with \"help\" or detailed help with \"help <command>\".",
            Self::Create => "Usage: create <class>\n\
                Create a new instance of <class>, save it, and print its id.",
            Self::Show => "Usage: show <class> <id> or <class>.show(<id>)\n\
                Print the representation of the instance with the given id.",
            Self::Destroy => "Usage: destroy <class> <id> or <class>.destroy(<id>)\n\
                Delete the instance with the given id and save the change.",
            Self::All => "Usage: all or all <class> or <class>.all()\n\
                Print the representations of every instance of <class>,\n\
                or of every instance when no class is given.",
            Self::Count => "Usage: count <class> or <class>.count()\n\
                Print the number of instances of <class>.",
            Self::Update => "Usage: update <class> <id> <attribute_name> <attribute_value> or\n\
                <class>.update(<id>, <attribute_name>, <attribute_value>) or\n\
                <class>.update(<id>, <dictionary>)\n\
                Set one attribute, or every pair of a dictionary, on the instance\n\
                with the given id, then save it.",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Split a verb-first line into its leading command word and the rest.
///
/// The command word is the longest prefix of identifier characters; `?` is
/// shorthand for `help`.
pub fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix('?') {
        return ("help", rest.trim());
    }
    let end = line
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map_or(line.len(), |(i, _)| i);
    (&line[..end], line[end..].trim())
}

/// A `<ClassName>.<verb>(<args>)` call, before verb validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DottedCall<'a> {
    pub class_name: &'a str,
    pub verb: &'a str,
    pub args: &'a str,
}

impl<'a> DottedCall<'a> {
    /// Recognize the dotted form: a `.` followed by a parenthesized span.
    ///
    /// The class name is everything before the first `.`. Arguments run from
    /// the first `(` to the end of the line, minus trailing `)` characters.
    pub fn parse(line: &'a str) -> Option<Self> {
        let (class_name, call) = line.split_once('.')?;
        let open = call.find('(')?;
        call[open..].find(')')?;
        let (verb, rest) = call.split_at(open);
        Some(Self {
            class_name,
            verb: verb.trim(),
            args: rest[1..].trim_end_matches(')'),
        })
    }

    /// The equivalent verb-first argument string: `<ClassName> <args>`.
    pub fn to_args(&self) -> String {
        format!("{} {}", self.class_name, self.args)
    }
}
