use std::io::Write;

use hbnb_store::{ObjectStore, StorageBackend};
use hbnb_types::repr::repr_str_list;
use hbnb_types::{composite_key, AttrValue, EntityClass};
use tracing::{debug, warn};

use crate::command::{split_command, DottedCall, Verb};
use crate::error::{ConsoleResult, Rejection};
use crate::literal::parse_literal;
use crate::parser::{is_dict_literal, parse_line};

/// What the loop should do after a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

/// Outcome of a single handler: either done, or rejected with a diagnostic.
type Handled = Result<(), Rejection>;

/// Translates console lines into store operations.
///
/// Holds no state between commands besides the store it was given.
pub struct Dispatcher<B> {
    store: ObjectStore<B>,
}

impl<B: StorageBackend> Dispatcher<B> {
    pub fn new(store: ObjectStore<B>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ObjectStore<B> {
        &self.store
    }

    /// Execute one line, writing console output to `out`.
    ///
    /// User-input problems are reported on `out` and never returned as
    /// errors; `Err` means the store or the output failed.
    pub fn onecmd<W: Write>(&mut self, line: &str, out: &mut W) -> ConsoleResult<Control> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Control::Continue);
        }
        let (word, args) = split_command(line);
        match Verb::from_name(word) {
            Some(verb) => self.execute(verb, args, out),
            None => self.dotted(line, out),
        }
    }

    fn dotted<W: Write>(&mut self, line: &str, out: &mut W) -> ConsoleResult<Control> {
        if let Some(call) = DottedCall::parse(line) {
            if let Some(verb) = Verb::from_name(call.verb).filter(Verb::accepts_dotted_call) {
                return self.execute(verb, &call.to_args(), out);
            }
        }
        writeln!(out, "*** Unknown syntax: {line}")?;
        Ok(Control::Continue)
    }

    fn execute<W: Write>(&mut self, verb: Verb, args: &str, out: &mut W) -> ConsoleResult<Control> {
        debug!(%verb, args, "dispatch");
        match verb {
            Verb::Quit | Verb::Eof => {
                writeln!(out)?;
                return Ok(Control::Exit);
            }
            Verb::Help => {
                self.help(args.trim(), out)?;
                return Ok(Control::Continue);
            }
            _ => {}
        }

        let tokens = match parse_line(args) {
            Ok(tokens) => tokens,
            Err(e) => {
                writeln!(out, "*** {e}")?;
                return Ok(Control::Continue);
            }
        };

        let handled = match verb {
            Verb::Create => self.create(&tokens, out)?,
            Verb::Show => self.show(&tokens, out)?,
            Verb::Destroy => self.destroy(&tokens)?,
            Verb::All => self.all(&tokens, out)?,
            Verb::Count => self.count(&tokens, out)?,
            Verb::Update => self.update(&tokens, out)?,
            Verb::Quit | Verb::Eof | Verb::Help => Ok(()),
        };
        if let Err(rejection) = handled {
            writeln!(out, "{rejection}")?;
        }
        Ok(Control::Continue)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    fn class_of(&self, tokens: &[String]) -> Result<EntityClass, Rejection> {
        let name = tokens.first().ok_or(Rejection::ClassNameMissing)?;
        self.store
            .registry()
            .resolve(name)
            .ok_or(Rejection::UnknownClass)
    }

    /// Class, id, and instance existence, in that order. Returns the key.
    fn target(&self, tokens: &[String]) -> Result<String, Rejection> {
        let class = self.class_of(tokens)?;
        let id = tokens.get(1).ok_or(Rejection::InstanceIdMissing)?;
        let key = composite_key(class, id);
        if !self.store.contains(&key) {
            return Err(Rejection::NoInstance);
        }
        Ok(key)
    }

    // -----------------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------------

    fn create<W: Write>(&mut self, tokens: &[String], out: &mut W) -> ConsoleResult<Handled> {
        let class = match self.class_of(tokens) {
            Ok(class) => class,
            Err(r) => return Ok(Err(r)),
        };
        let id = self.store.create(class).id().clone();
        writeln!(out, "{id}")?;
        self.store.persist()?;
        Ok(Ok(()))
    }

    fn show<W: Write>(&self, tokens: &[String], out: &mut W) -> ConsoleResult<Handled> {
        let key = match self.target(tokens) {
            Ok(key) => key,
            Err(r) => return Ok(Err(r)),
        };
        if let Some(entity) = self.store.get(&key) {
            writeln!(out, "{entity}")?;
        }
        Ok(Ok(()))
    }

    fn destroy(&mut self, tokens: &[String]) -> ConsoleResult<Handled> {
        let key = match self.target(tokens) {
            Ok(key) => key,
            Err(r) => return Ok(Err(r)),
        };
        self.store.remove(&key);
        self.store.persist()?;
        debug!(%key, "entity destroyed");
        Ok(Ok(()))
    }

    fn all<W: Write>(&self, tokens: &[String], out: &mut W) -> ConsoleResult<Handled> {
        let filter = match tokens.first() {
            None => None,
            Some(name) => match self.store.registry().resolve(name) {
                Some(class) => Some(class),
                None => return Ok(Err(Rejection::UnknownClass)),
            },
        };
        let reprs: Vec<String> = self
            .store
            .all()
            .map(|(_, e)| e)
            .filter(|e| filter.map_or(true, |class| e.class() == class))
            .map(ToString::to_string)
            .collect();
        writeln!(out, "{}", repr_str_list(&reprs))?;
        Ok(Ok(()))
    }

    fn count<W: Write>(&self, tokens: &[String], out: &mut W) -> ConsoleResult<Handled> {
        let class = match self.class_of(tokens) {
            Ok(class) => class,
            Err(r) => return Ok(Err(r)),
        };
        writeln!(out, "{}", self.store.count_class(class))?;
        Ok(Ok(()))
    }

    fn update<W: Write>(&mut self, tokens: &[String], out: &mut W) -> ConsoleResult<Handled> {
        let key = match self.target(tokens) {
            Ok(key) => key,
            Err(r) => return Ok(Err(r)),
        };
        let changes = match tokens {
            [_, _] => return Ok(Err(Rejection::AttributeNameMissing)),
            [_, _, literal] if is_dict_literal(literal) => match parse_dictionary(literal) {
                Ok(pairs) => pairs,
                Err(reason) => {
                    warn!(%key, %reason, "rejected update dictionary");
                    writeln!(out, "Error parsing dictionary: {reason}")?;
                    return Ok(Ok(()));
                }
            },
            [_, _, _] => return Ok(Err(Rejection::ValueMissing)),
            [_, _, name, value, ..] => vec![(name.clone(), AttrValue::String(value.clone()))],
            _ => return Ok(Err(Rejection::InstanceIdMissing)),
        };

        let Some(entity) = self.store.get_mut(&key) else {
            return Ok(Err(Rejection::NoInstance));
        };
        let mut staged = entity.clone();
        for (name, value) in changes {
            if let Err(e) = staged.set(&name, value) {
                writeln!(out, "** {e} **")?;
                return Ok(Ok(()));
            }
        }
        *entity = staged;
        self.store.save(&key)?;
        Ok(Ok(()))
    }

    fn help<W: Write>(&self, topic: &str, out: &mut W) -> ConsoleResult<()> {
        if topic.is_empty() {
            let names: Vec<&str> = Verb::ALL.iter().map(Verb::name).collect();
            writeln!(out)?;
            writeln!(out, "Documented commands (type help <topic>):")?;
            writeln!(out, "========================================")?;
            writeln!(out, "{}", names.join("  "))?;
            writeln!(out)?;
            return Ok(());
        }
        match Verb::from_name(topic) {
            Some(verb) => writeln!(out, "{}", verb.usage())?,
            None => writeln!(out, "*** No help on {topic}")?,
        }
        Ok(())
    }
}

/// Parse a brace literal into ordered `(name, value)` pairs.
fn parse_dictionary(literal: &str) -> Result<Vec<(String, AttrValue)>, String> {
    match parse_literal(literal) {
        Ok(AttrValue::Object(map)) => Ok(map.into_iter().collect()),
        Ok(_) => Err("Invalid dictionary format".into()),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use hbnb_store::InMemoryBackend;
    use hbnb_types::{ClassRegistry, Timestamp};
    use serde_json::json;

    use super::*;

    fn dispatcher() -> Dispatcher<InMemoryBackend> {
        Dispatcher::new(ObjectStore::new(
            InMemoryBackend::new(),
            ClassRegistry::standard(),
        ))
    }

    /// Run a line and return (output, control).
    fn run(d: &mut Dispatcher<InMemoryBackend>, line: &str) -> (String, Control) {
        let mut out = Vec::new();
        let control = d.onecmd(line, &mut out).unwrap();
        (String::from_utf8(out).unwrap(), control)
    }

    fn output(d: &mut Dispatcher<InMemoryBackend>, line: &str) -> String {
        run(d, line).0
    }

    fn create(d: &mut Dispatcher<InMemoryBackend>, class: &str) -> String {
        output(d, &format!("create {class}")).trim_end().to_string()
    }

    // -----------------------------------------------------------------------
    // Loop control
    // -----------------------------------------------------------------------

    #[test]
    fn quit_and_eof_exit_with_blank_line() {
        let mut d = dispatcher();
        assert_eq!(run(&mut d, "quit"), ("\n".into(), Control::Exit));
        assert_eq!(run(&mut d, "EOF"), ("\n".into(), Control::Exit));
    }

    #[test]
    fn empty_line_does_nothing() {
        let mut d = dispatcher();
        assert_eq!(run(&mut d, "   "), (String::new(), Control::Continue));
    }

    #[test]
    fn unknown_syntax() {
        let mut d = dispatcher();
        assert_eq!(output(&mut d, "frobnicate"), "*** Unknown syntax: frobnicate\n");
        assert_eq!(output(&mut d, "User.create()"), "*** Unknown syntax: User.create()\n");
        assert_eq!(output(&mut d, "User.bogus()"), "*** Unknown syntax: User.bogus()\n");
        assert_eq!(output(&mut d, "User.all"), "*** Unknown syntax: User.all\n");
    }

    #[test]
    fn tokenizer_errors_are_reported() {
        let mut d = dispatcher();
        assert_eq!(
            output(&mut d, r#"show User "abc"#),
            "*** No closing quotation\n"
        );
    }

    // -----------------------------------------------------------------------
    // create / count
    // -----------------------------------------------------------------------

    #[test]
    fn create_prints_id_and_persists() {
        let mut d = dispatcher();
        let id = create(&mut d, "User");
        assert!(d.store().contains(&format!("User.{id}")));
        assert_eq!(d.store().backend().write_count(), 1);
    }

    #[test]
    fn create_validation() {
        let mut d = dispatcher();
        assert_eq!(output(&mut d, "create"), "** class name missing **\n");
        assert_eq!(output(&mut d, "create MyModel"), "** class doesn't exist **\n");
        assert_eq!(d.store().backend().write_count(), 0);
    }

    #[test]
    fn create_increments_count_by_one() {
        let mut d = dispatcher();
        let a = create(&mut d, "Place");
        assert_eq!(output(&mut d, "count Place"), "1\n");
        let b = create(&mut d, "Place");
        assert_ne!(a, b);
        assert_eq!(output(&mut d, "count Place"), "2\n");
        assert_eq!(output(&mut d, "Place.count()"), "2\n");
        assert_eq!(output(&mut d, "count User"), "0\n");
    }

    #[test]
    fn count_validation() {
        let mut d = dispatcher();
        assert_eq!(output(&mut d, "count"), "** class name missing **\n");
        assert_eq!(output(&mut d, "count Nope"), "** class doesn't exist **\n");
    }

    // -----------------------------------------------------------------------
    // show / destroy
    // -----------------------------------------------------------------------

    #[test]
    fn show_validation_order() {
        let mut d = dispatcher();
        assert_eq!(output(&mut d, "show"), "** class name missing **\n");
        assert_eq!(output(&mut d, "show BogusClass 123"), "** class doesn't exist **\n");
        assert_eq!(output(&mut d, "show User"), "** instance id missing **\n");
        assert_eq!(output(&mut d, "show User missing-id"), "** no instance found **\n");
    }

    #[test]
    fn show_prints_canonical_representation() {
        let mut d = dispatcher();
        let id = create(&mut d, "User");
        let expected = format!("{}\n", d.store().get(&format!("User.{id}")).unwrap());
        assert_eq!(output(&mut d, &format!("show User {id}")), expected);
        assert_eq!(output(&mut d, &format!("User.show(\"{id}\")")), expected);
        assert!(expected.starts_with(&format!("[User] ({id}) {{'id': '{id}'")));
    }

    #[test]
    fn show_is_class_scoped() {
        let mut d = dispatcher();
        let id = create(&mut d, "User");
        assert_eq!(output(&mut d, &format!("show Place {id}")), "** no instance found **\n");
    }

    #[test]
    fn destroy_removes_and_persists() {
        let mut d = dispatcher();
        let id = create(&mut d, "City");
        assert_eq!(output(&mut d, &format!("destroy City {id}")), "");
        assert_eq!(output(&mut d, "count City"), "0\n");
        assert_eq!(d.store().backend().write_count(), 2);
    }

    #[test]
    fn destroy_missing_does_not_write() {
        let mut d = dispatcher();
        assert_eq!(output(&mut d, "destroy User nope"), "** no instance found **\n");
        assert_eq!(output(&mut d, "destroy"), "** class name missing **\n");
        assert_eq!(output(&mut d, "destroy Nope 1"), "** class doesn't exist **\n");
        assert_eq!(output(&mut d, "destroy User"), "** instance id missing **\n");
        assert_eq!(d.store().backend().write_count(), 0);
    }

    #[test]
    fn dotted_destroy() {
        let mut d = dispatcher();
        let id = create(&mut d, "State");
        assert_eq!(output(&mut d, &format!("State.destroy(\"{id}\")")), "");
        assert!(d.store().is_empty());
    }

    // -----------------------------------------------------------------------
    // all
    // -----------------------------------------------------------------------

    #[test]
    fn all_lists_everything_or_one_class() {
        let mut d = dispatcher();
        assert_eq!(output(&mut d, "all"), "[]\n");
        let user = create(&mut d, "User");
        let place = create(&mut d, "Place");

        let all = output(&mut d, "all");
        assert!(all.contains(&format!("[User] ({user})")));
        assert!(all.contains(&format!("[Place] ({place})")));
        assert!(all.find("[User]").unwrap() < all.find("[Place]").unwrap());

        let users = output(&mut d, "all User");
        assert!(users.contains(&format!("[User] ({user})")));
        assert!(!users.contains("[Place]"));
        assert_eq!(output(&mut d, "User.all()"), users);
    }

    #[test]
    fn all_output_is_a_list_of_quoted_representations() {
        let mut d = dispatcher();
        let id = create(&mut d, "Amenity");
        let entity = d.store().get(&format!("Amenity.{id}")).unwrap().to_string();
        assert_eq!(output(&mut d, "all Amenity"), format!("[\"{entity}\"]\n"));
    }

    #[test]
    fn all_rejects_unknown_class() {
        let mut d = dispatcher();
        assert_eq!(output(&mut d, "all Nope"), "** class doesn't exist **\n");
    }

    // -----------------------------------------------------------------------
    // update
    // -----------------------------------------------------------------------

    #[test]
    fn update_validation_order() {
        let mut d = dispatcher();
        let id = create(&mut d, "User");
        assert_eq!(output(&mut d, "update"), "** class name missing **\n");
        assert_eq!(output(&mut d, "update Nope"), "** class doesn't exist **\n");
        assert_eq!(output(&mut d, "update User"), "** instance id missing **\n");
        assert_eq!(output(&mut d, "update User nope"), "** no instance found **\n");
        assert_eq!(
            output(&mut d, &format!("update User {id}")),
            "** attribute name missing **\n"
        );
        assert_eq!(
            output(&mut d, &format!("update User {id} first_name")),
            "** value missing **\n"
        );
        // Only the create wrote.
        assert_eq!(d.store().backend().write_count(), 1);
    }

    #[test]
    fn update_single_field_stores_text() {
        let mut d = dispatcher();
        let id = create(&mut d, "Place");
        let key = format!("Place.{id}");
        let before = d.store().get(&key).unwrap().updated_at();

        assert_eq!(output(&mut d, &format!("update Place {id} number_rooms 4")), "");
        let place = d.store().get(&key).unwrap();
        assert_eq!(place.get("number_rooms"), Some(json!("4")));
        assert!(place.updated_at() > before);
        assert_eq!(d.store().backend().write_count(), 2);
    }

    #[test]
    fn update_quoted_value_and_extra_tokens() {
        let mut d = dispatcher();
        let id = create(&mut d, "User");
        output(
            &mut d,
            &format!(r#"update User {id} first_name "Betty Holberton" ignored"#),
        );
        let user = d.store().get(&format!("User.{id}")).unwrap();
        assert_eq!(user.get("first_name"), Some(json!("Betty Holberton")));
        assert_eq!(user.get("ignored"), None);
    }

    #[test]
    fn update_with_dictionary_keeps_literal_types() {
        let mut d = dispatcher();
        let id = create(&mut d, "User");
        let key = format!("User.{id}");
        let before = d.store().get(&key).unwrap().updated_at();

        let line = format!(r#"User.update("{id}", {{"first_name": "Betty", "age": 98}})"#);
        assert_eq!(output(&mut d, &line), "");

        let user = d.store().get(&key).unwrap();
        assert_eq!(user.get("first_name"), Some(json!("Betty")));
        assert_eq!(user.get("age"), Some(json!(98)));
        assert!(user.updated_at() > before);
        // One create write plus exactly one save.
        assert_eq!(d.store().backend().write_count(), 2);
    }

    #[test]
    fn dotted_update_single_field() {
        let mut d = dispatcher();
        let id = create(&mut d, "User");
        output(&mut d, &format!(r#"User.update("{id}", "last_name", "Holberton")"#));
        let user = d.store().get(&format!("User.{id}")).unwrap();
        assert_eq!(user.get("last_name"), Some(json!("Holberton")));
    }

    #[test]
    fn malformed_dictionary_aborts_command() {
        let mut d = dispatcher();
        let id = create(&mut d, "User");
        let out = output(&mut d, &format!("update User {id} {{'a': os.system('ls')}}"));
        assert!(out.starts_with("Error parsing dictionary: "));
        assert!(d.store().get(&format!("User.{id}")).unwrap().attributes().is_empty());
        assert_eq!(d.store().backend().write_count(), 1);
    }

    #[test]
    fn dictionary_update_is_all_or_nothing() {
        let mut d = dispatcher();
        let id = create(&mut d, "User");
        let out = output(
            &mut d,
            &format!("update User {id} {{'first_name': 'A', 'created_at': 'later'}}"),
        );
        assert!(out.starts_with("** invalid timestamp"));
        assert!(d.store().get(&format!("User.{id}")).unwrap().attributes().is_empty());
        assert_eq!(d.store().backend().write_count(), 1);
    }

    #[test]
    fn update_may_overwrite_identity_fields() {
        // Permissive: `id` is not protected. The entity keeps its store key
        // until the next reload.
        let mut d = dispatcher();
        let id = create(&mut d, "User");
        output(&mut d, &format!("update User {id} id custom"));
        let user = d.store().get(&format!("User.{id}")).unwrap();
        assert_eq!(user.id().as_str(), "custom");
    }

    #[test]
    fn future_updated_at_is_replaced_by_now_on_save() {
        let mut d = dispatcher();
        let id = create(&mut d, "User");
        let before = Timestamp::now();
        assert_eq!(
            output(&mut d, &format!("update User {id} updated_at 2999-01-01T00:00:00.000000")),
            ""
        );
        let updated = d.store().get(&format!("User.{id}")).unwrap().updated_at();
        assert!(updated >= before);
        assert!(updated <= Timestamp::now());
    }

    #[test]
    fn updated_at_at_the_calendar_limit_is_saved() {
        let mut d = dispatcher();
        let id = create(&mut d, "User");
        let line = format!("update User {id} updated_at +262142-12-31T23:59:59.999999");
        assert_eq!(output(&mut d, &line), "");
        let updated = d.store().get(&format!("User.{id}")).unwrap().updated_at();
        assert!(updated <= Timestamp::now());
        assert_eq!(d.store().backend().write_count(), 2);
    }

    // -----------------------------------------------------------------------
    // help
    // -----------------------------------------------------------------------

    #[test]
    fn help_lists_commands() {
        let mut d = dispatcher();
        let out = output(&mut d, "help");
        assert!(out.contains("Documented commands"));
        assert!(out.contains("EOF  all  count  create  destroy  help  quit  show  update"));
    }

    #[test]
    fn help_topics() {
        let mut d = dispatcher();
        assert!(output(&mut d, "help create").starts_with("Usage: create <class>"));
        assert!(output(&mut d, "? update").starts_with("Usage: update"));
        assert_eq!(output(&mut d, "help nope"), "*** No help on nope\n");
    }
}
