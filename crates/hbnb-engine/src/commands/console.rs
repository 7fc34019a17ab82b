//! Console command execution
//!
//! Every failure is reported as one line on the output and aborts only the
//! command that caused it. Validation runs in a fixed order: class name
//! missing, class unknown, id missing, instance missing, attribute name
//! missing, value missing.

use std::io::{self, Write};

use hbnb_core::model::{entity_key, is_protected};
use hbnb_core::parse::parse_create_param;
use hbnb_core::storage::Storage;
use hbnb_core::{log_op_end, log_op_error, log_op_start};
use hbnb_core::{parse_line, Command, Entity, EntityKind, ExError, HbnbError, UpdatePayload};
use serde_json::Value;

use super::help::{self, AIRBNB_BANNER, ALTERNATE_PROMPT, DEFAULT_PROMPT};

/// What the session loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

/// Why a command was aborted
#[derive(Debug)]
enum Failure {
    /// Bad input; printed as its fixed message
    Invalid(HbnbError),
    /// The backend could not persist the change
    Storage(ExError),
}

impl From<HbnbError> for Failure {
    fn from(err: HbnbError) -> Self {
        Failure::Invalid(err)
    }
}

impl From<ExError> for Failure {
    fn from(err: ExError) -> Self {
        Failure::Storage(err)
    }
}

type Outcome = std::result::Result<Option<String>, Failure>;

/// Command interpreter bound to one storage backend
pub struct Console {
    storage: Box<dyn Storage>,
    prompt: &'static str,
}

impl Console {
    /// Wrap an already loaded storage backend
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            storage,
            prompt: DEFAULT_PROMPT,
        }
    }

    pub fn prompt(&self) -> &str {
        self.prompt
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Parse and execute one input line
    ///
    /// # Errors
    ///
    /// Only write failures on `out` are returned; command failures are
    /// printed.
    pub fn execute_line(&mut self, line: &str, out: &mut dyn Write) -> io::Result<Control> {
        self.execute(parse_line(line), out)
    }

    /// Execute one parsed command, writing its output to `out`
    ///
    /// # Errors
    ///
    /// Only write failures on `out` are returned; command failures are
    /// printed.
    pub fn execute(&mut self, command: Command, out: &mut dyn Write) -> io::Result<Control> {
        let verb = command.verb();

        let outcome = match command {
            Command::Empty => return Ok(Control::Continue),
            Command::Unknown { line } => {
                tracing::debug!(line = %line, "ignoring unrecognised input");
                return Ok(Control::Continue);
            }
            Command::Quit => return Ok(Control::Exit),
            Command::Eof => {
                writeln!(out)?;
                return Ok(Control::Exit);
            }
            Command::Help { topic } => Ok(Some(self.help(topic.as_deref()))),
            Command::Airbnb => Ok(Some(self.airbnb())),
            Command::Create { class_name, params } => {
                self.run(verb, |c| c.create(class_name.as_deref(), &params))
            }
            Command::Show { class_name, id } => {
                self.run(verb, |c| c.show(class_name.as_deref(), id.as_deref()))
            }
            Command::All { class_name } => self.run(verb, |c| c.all(class_name.as_deref())),
            Command::Count { class_name } => self.run(verb, |c| c.count(class_name.as_deref())),
            Command::Destroy { class_name, id } => {
                self.run(verb, |c| c.destroy(class_name.as_deref(), id.as_deref()))
            }
            Command::Update {
                class_name,
                id,
                payload,
            } => self.run(verb, |c| {
                c.update(class_name.as_deref(), id.as_deref(), payload)
            }),
        };

        match outcome {
            Ok(Some(text)) => writeln!(out, "{}", text)?,
            Ok(None) => {}
            Err(Failure::Invalid(err)) => writeln!(out, "{}", err)?,
            Err(Failure::Storage(err)) => writeln!(out, "** storage error: {} **", err.message())?,
        }
        Ok(Control::Continue)
    }

    /// Flush and release the backend
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the final flush fails.
    pub fn close(&mut self) -> hbnb_core::StorageResult<()> {
        self.storage.close()
    }

    fn run(&mut self, verb: &'static str, handler: impl FnOnce(&mut Self) -> Outcome) -> Outcome {
        log_op_start!("console_execute", verb = verb);
        let start = std::time::Instant::now();

        let outcome = handler(self);

        match &outcome {
            Ok(_) => {
                log_op_end!(
                    "console_execute",
                    duration_ms = start.elapsed().as_millis() as u64,
                    verb = verb
                );
            }
            Err(Failure::Invalid(err)) => {
                tracing::debug!(verb = verb, error = %err, "command rejected");
            }
            Err(Failure::Storage(err)) => {
                log_op_error!(
                    "console_execute",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    verb = verb
                );
            }
        }
        outcome
    }

    fn resolve_kind(&self, class_name: Option<&str>) -> Result<EntityKind, HbnbError> {
        let class_name = class_name.ok_or(HbnbError::ClassNameMissing)?;
        self.storage
            .kind_named(class_name)
            .ok_or_else(|| HbnbError::UnknownClass {
                class_name: class_name.to_string(),
            })
    }

    /// Validate class and id, returning the composite key of a live entity
    fn resolve_key(&self, class_name: Option<&str>, id: Option<&str>) -> Result<String, HbnbError> {
        let kind = self.resolve_kind(class_name)?;
        let id = id.ok_or(HbnbError::InstanceIdMissing)?;
        let key = entity_key(kind, id);
        if self.storage.get(&key).is_none() {
            return Err(HbnbError::InstanceNotFound { key });
        }
        Ok(key)
    }

    /// Persist, or put the registry back in line with durable state
    fn save_or_resync(&mut self) -> Result<(), ExError> {
        let err = match self.storage.save() {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };
        if let Err(reload_err) = self.storage.reload() {
            tracing::warn!(error = %reload_err, "registry resync failed");
        }
        Err(err)
    }

    fn create(&mut self, class_name: Option<&str>, params: &[String]) -> Outcome {
        let kind = self.resolve_kind(class_name)?;

        let mut entity = Entity::new(kind);
        for param in params {
            match parse_create_param(param) {
                Some((key, value)) => {
                    if !entity.set(key, value) {
                        tracing::debug!(param = %param, "protected attribute ignored");
                    }
                }
                None => tracing::debug!(param = %param, "malformed parameter skipped"),
            }
        }

        let id = entity.id.clone();
        let key = entity.key();
        self.storage.register(entity);
        if let Err(err) = self.storage.save() {
            self.storage.delete(&key);
            return Err(err.into());
        }

        Ok(Some(id))
    }

    fn show(&mut self, class_name: Option<&str>, id: Option<&str>) -> Outcome {
        let key = self.resolve_key(class_name, id)?;
        Ok(self.storage.get(&key).map(Entity::to_string))
    }

    fn all(&mut self, class_name: Option<&str>) -> Outcome {
        let kind = match class_name {
            Some(name) => Some(self.resolve_kind(Some(name))?),
            None => None,
        };

        let rendered: Vec<String> = self
            .storage
            .all(kind)
            .into_iter()
            .map(Entity::to_string)
            .collect();
        Ok(Some(rendered.join(", ")))
    }

    fn count(&mut self, class_name: Option<&str>) -> Outcome {
        let kind = self.resolve_kind(class_name)?;
        Ok(Some(self.storage.count(Some(kind)).to_string()))
    }

    fn destroy(&mut self, class_name: Option<&str>, id: Option<&str>) -> Outcome {
        let key = self.resolve_key(class_name, id)?;

        let removed = self.storage.delete(&key);
        tracing::debug!(entity_key = %key, entity_count = removed.len(), "entities removed");
        self.save_or_resync()?;

        Ok(None)
    }

    fn update(
        &mut self,
        class_name: Option<&str>,
        id: Option<&str>,
        payload: UpdatePayload,
    ) -> Outcome {
        let key = self.resolve_key(class_name, id)?;

        let pairs = match payload {
            UpdatePayload::Missing => return Err(HbnbError::AttributeNameMissing.into()),
            UpdatePayload::Name(_) => return Err(HbnbError::ValueMissing.into()),
            UpdatePayload::Dict(pairs) if pairs.is_empty() => {
                return Err(HbnbError::ValueMissing.into())
            }
            UpdatePayload::Dict(pairs) => pairs,
            UpdatePayload::Pair { name, value } => vec![(name, value)],
        };

        let entity = self
            .storage
            .get_mut(&key)
            .ok_or_else(|| HbnbError::InstanceNotFound { key: key.clone() })?;
        apply_pairs(entity, pairs);
        entity.touch();

        self.save_or_resync()?;
        Ok(None)
    }

    fn help(&self, topic: Option<&str>) -> String {
        match topic {
            None => help::overview(),
            Some(verb) => help::topic(verb)
                .map(str::to_string)
                .unwrap_or_else(|| format!("*** No help on {}", verb)),
        }
    }

    fn airbnb(&mut self) -> String {
        self.prompt = if self.prompt == DEFAULT_PROMPT {
            ALTERNATE_PROMPT
        } else {
            DEFAULT_PROMPT
        };
        AIRBNB_BANNER.join("\n")
    }
}

fn apply_pairs(entity: &mut Entity, pairs: Vec<(String, Value)>) {
    for (name, value) in pairs {
        if is_protected(&name) {
            tracing::debug!(attribute = %name, "protected attribute ignored");
            continue;
        }
        entity.set(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hbnb_core::Registry;
    use hbnb_core::StorageResult;
    use hbnb_core::Backend;

    /// In-memory backend whose saves can be made to fail
    #[derive(Default)]
    struct MemoryStorage {
        registry: Registry,
        fail_saves: bool,
        saves: usize,
    }

    impl Storage for MemoryStorage {
        fn backend(&self) -> Backend {
            Backend::File
        }

        fn catalog(&self) -> &[EntityKind] {
            &EntityKind::ALL
        }

        fn all(&self, kind: Option<EntityKind>) -> Vec<&Entity> {
            self.registry.all(kind)
        }

        fn get(&self, key: &str) -> Option<&Entity> {
            self.registry.get(key)
        }

        fn get_mut(&mut self, key: &str) -> Option<&mut Entity> {
            self.registry.get_mut(key)
        }

        fn register(&mut self, entity: Entity) {
            self.registry.insert(entity);
        }

        fn delete(&mut self, key: &str) -> Vec<Entity> {
            self.registry.remove(key).into_iter().collect()
        }

        fn save(&mut self) -> StorageResult<()> {
            if self.fail_saves {
                return Err(ExError::new(hbnb_core::ExErrorKind::Persistence)
                    .with_message("disk full"));
            }
            self.saves += 1;
            Ok(())
        }

        fn reload(&mut self) -> StorageResult<()> {
            Ok(())
        }
    }

    fn console() -> Console {
        Console::new(Box::<MemoryStorage>::default())
    }

    fn run(console: &mut Console, line: &str) -> String {
        let mut out = Vec::new();
        console.execute_line(line, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_create_prints_id() {
        let mut console = console();
        let id = run(&mut console, "create State name=\"California\"");
        let id = id.trim();

        assert_eq!(id.len(), 36);
        assert!(console.storage().get(&format!("State.{}", id)).is_some());
    }

    #[test]
    fn test_validation_order() {
        let mut console = console();
        assert_eq!(run(&mut console, "show"), "** class name missing **\n");
        assert_eq!(run(&mut console, "show Ghost"), "** class doesn't exist **\n");
        assert_eq!(run(&mut console, "show User"), "** instance id missing **\n");
        assert_eq!(run(&mut console, "show User 42"), "** no instance found **\n");

        let id = run(&mut console, "create User");
        let id = id.trim();
        assert_eq!(
            run(&mut console, &format!("update User {}", id)),
            "** attribute name missing **\n"
        );
        assert_eq!(
            run(&mut console, &format!("update User {} first_name", id)),
            "** value missing **\n"
        );
    }

    #[test]
    fn test_update_skips_protected_attributes() {
        let mut console = console();
        let id = run(&mut console, "create User");
        let id = id.trim().to_string();

        run(&mut console, &format!("update User {} id \"hijack\"", id));
        run(
            &mut console,
            &format!("update User {} {{'created_at': 'x', 'age': 30}}", id),
        );

        let user = console.storage().get(&format!("User.{}", id)).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.attributes.get("age"), Some(&serde_json::json!(30)));
        assert!(user.updated_at >= user.created_at);
    }

    #[test]
    fn test_empty_dict_is_value_missing() {
        let mut console = console();
        let id = run(&mut console, "create User");
        assert_eq!(
            run(&mut console, &format!("update User {} {{}}", id.trim())),
            "** value missing **\n"
        );
    }

    #[test]
    fn test_failed_create_is_unregistered() {
        let mut console = Console::new(Box::new(MemoryStorage {
            fail_saves: true,
            ..Default::default()
        }));

        let output = run(&mut console, "create Amenity");

        assert_eq!(output, "** storage error: disk full **\n");
        assert_eq!(console.storage().count(None), 0);
    }

    #[test]
    fn test_airbnb_toggles_prompt() {
        let mut console = console();
        assert_eq!(console.prompt(), DEFAULT_PROMPT);

        let banner = run(&mut console, "airbnb");
        assert!(banner.contains("|_||_)"));
        assert_eq!(console.prompt(), ALTERNATE_PROMPT);

        run(&mut console, "airbnb");
        assert_eq!(console.prompt(), DEFAULT_PROMPT);
    }

    #[test]
    fn test_quit_eof_and_unknown() {
        let mut console = console();
        let mut out = Vec::new();

        assert_eq!(console.execute_line("quit", &mut out).unwrap(), Control::Exit);
        assert!(out.is_empty());
        assert_eq!(console.execute_line("EOF", &mut out).unwrap(), Control::Exit);
        assert_eq!(out, b"\n");
        assert_eq!(
            console.execute_line("User.fly()", &mut out).unwrap(),
            Control::Continue
        );
        assert_eq!(out, b"\n");
    }

    #[test]
    fn test_help_unknown_topic() {
        let mut console = console();
        assert_eq!(run(&mut console, "help fly"), "*** No help on fly\n");
        assert!(run(&mut console, "help").contains("Documented commands"));
    }
}
