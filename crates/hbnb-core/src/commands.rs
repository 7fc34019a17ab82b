//! Console command inventory and the line parser
//!
//! Every input line becomes one `Command` variant. Both the plain form
//! (`show User 1234`) and the dotted form (`User.show("1234")`) land on the
//! same variants, so the console needs a single dispatch switch. The parser
//! only shapes arguments; class names and identifiers are validated against
//! live storage by the console.

use serde_json::Value;

use crate::model::EntityKind;
use crate::parse::{coerce_token, parse_dict_literal, plain, split_args, split_call_args};

/// Payload of an `update` command after the class and id
#[derive(Debug, Clone, PartialEq)]
pub enum UpdatePayload {
    /// Nothing after the identifier
    Missing,
    /// An attribute name without a value
    Name(String),
    /// One attribute and its coerced value
    Pair { name: String, value: Value },
    /// A well-formed dictionary literal
    Dict(Vec<(String, Value)>),
}

/// Command enum representing every console verb
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Create an instance, applying `key=value` params
    Create {
        class_name: Option<String>,
        params: Vec<String>,
    },

    /// Print one instance
    Show {
        class_name: Option<String>,
        id: Option<String>,
    },

    /// Print every instance, optionally of one class
    All { class_name: Option<String> },

    /// Print the number of instances of a class
    Count { class_name: Option<String> },

    /// Delete an instance
    Destroy {
        class_name: Option<String>,
        id: Option<String>,
    },

    /// Set one or more attributes on an instance
    Update {
        class_name: Option<String>,
        id: Option<String>,
        payload: UpdatePayload,
    },

    /// List verbs or describe one
    Help { topic: Option<String> },

    /// Print the banner and toggle the prompt
    Airbnb,

    Quit,

    /// End of input
    Eof,

    /// Blank line
    Empty,

    /// Anything unrecognised; ignored by the console
    Unknown { line: String },
}

impl Command {
    /// Verb name used in logs
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Create { .. } => "create",
            Command::Show { .. } => "show",
            Command::All { .. } => "all",
            Command::Count { .. } => "count",
            Command::Destroy { .. } => "destroy",
            Command::Update { .. } => "update",
            Command::Help { .. } => "help",
            Command::Airbnb => "airbnb",
            Command::Quit => "quit",
            Command::Eof => "EOF",
            Command::Empty => "empty",
            Command::Unknown { .. } => "unknown",
        }
    }
}

/// Parse one input line into a command
pub fn parse_line(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim_start()),
        None => (line, ""),
    };

    match verb {
        "create" => build("create", split_args(rest)),
        "show" => build("show", split_args(rest)),
        "all" => build("all", split_args(rest)),
        "count" => build("count", split_args(rest)),
        "destroy" => build("destroy", split_args(rest)),
        "update" => build("update", split_args(rest)),
        "quit" => Command::Quit,
        "EOF" => Command::Eof,
        "help" | "?" => Command::Help {
            topic: split_args(rest).into_iter().next(),
        },
        "airbnb" => Command::Airbnb,
        _ => parse_dotted(line).unwrap_or_else(|| Command::Unknown {
            line: line.to_string(),
        }),
    }
}

/// `Type.verb(args)`; `None` for anything that does not fit the shape
fn parse_dotted(line: &str) -> Option<Command> {
    let (class_name, call) = line.split_once('.')?;
    if class_name.parse::<EntityKind>().is_err() {
        return None;
    }
    let (verb, args) = call.split_once('(')?;
    let args = args.trim_end().strip_suffix(')')?;

    let mut tokens = vec![class_name.to_string()];
    tokens.extend(split_call_args(args));

    match verb {
        "create" | "show" | "all" | "count" | "destroy" | "update" => Some(build(verb, tokens)),
        _ => None,
    }
}

/// Shape positional tokens (`class [id [name [value]]]`) into a command
fn build(verb: &str, tokens: Vec<String>) -> Command {
    let mut iter = tokens.into_iter();
    let class_name = iter.next().map(|t| plain(&t));

    match verb {
        "create" => Command::Create {
            class_name,
            params: iter.collect(),
        },
        "all" => Command::All { class_name },
        "count" => Command::Count { class_name },
        "show" => Command::Show {
            class_name,
            id: iter.next().map(|t| plain(&t)),
        },
        "destroy" => Command::Destroy {
            class_name,
            id: iter.next().map(|t| plain(&t)),
        },
        _ => {
            let id = iter.next().map(|t| plain(&t));
            let payload = update_payload(iter.next(), iter.next());
            Command::Update {
                class_name,
                id,
                payload,
            }
        }
    }
}

fn update_payload(name: Option<String>, value: Option<String>) -> UpdatePayload {
    let Some(name) = name else {
        return UpdatePayload::Missing;
    };

    if name.starts_with('{') {
        match parse_dict_literal(&name) {
            Ok(pairs) => return UpdatePayload::Dict(pairs),
            Err(e) => tracing::debug!(error = %e, "dictionary literal dropped"),
        }
    }

    match value {
        Some(raw) => UpdatePayload::Pair {
            name: plain(&name),
            value: coerce_token(&raw),
        },
        None => UpdatePayload::Name(plain(&name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn test_empty_and_unknown() {
        assert_eq!(parse_line("   "), Command::Empty);
        assert!(matches!(parse_line("frobnicate x"), Command::Unknown { .. }));
    }

    #[test]
    fn test_create_collects_params() {
        assert_eq!(
            parse_line(r#"create Place name="Loft" number_rooms=3"#),
            Command::Create {
                class_name: s("Place"),
                params: vec![r#"name="Loft""#.to_string(), "number_rooms=3".to_string()],
            }
        );
        assert_eq!(
            parse_line("create"),
            Command::Create {
                class_name: None,
                params: vec![],
            }
        );
    }

    #[test]
    fn test_show_and_destroy() {
        assert_eq!(
            parse_line("show User 1234"),
            Command::Show {
                class_name: s("User"),
                id: s("1234"),
            }
        );
        assert_eq!(
            parse_line("destroy User"),
            Command::Destroy {
                class_name: s("User"),
                id: None,
            }
        );
    }

    #[test]
    fn test_update_pair_coerces_value() {
        assert_eq!(
            parse_line(r#"update User 1 first_name "John""#),
            Command::Update {
                class_name: s("User"),
                id: s("1"),
                payload: UpdatePayload::Pair {
                    name: "first_name".to_string(),
                    value: json!("John"),
                },
            }
        );
        assert_eq!(
            parse_line("update User 1 age 3"),
            Command::Update {
                class_name: s("User"),
                id: s("1"),
                payload: UpdatePayload::Pair {
                    name: "age".to_string(),
                    value: json!(3),
                },
            }
        );
    }

    #[test]
    fn test_update_missing_parts() {
        assert!(matches!(
            parse_line("update User 1"),
            Command::Update {
                payload: UpdatePayload::Missing,
                ..
            }
        ));
        assert!(matches!(
            parse_line("update User 1 name"),
            Command::Update {
                payload: UpdatePayload::Name(_),
                ..
            }
        ));
    }

    #[test]
    fn test_update_dict_plain_form() {
        assert_eq!(
            parse_line(r#"update User 1 {"first_name": "John", "age": 89}"#),
            Command::Update {
                class_name: s("User"),
                id: s("1"),
                payload: UpdatePayload::Dict(vec![
                    ("first_name".to_string(), json!("John")),
                    ("age".to_string(), json!(89)),
                ]),
            }
        );
    }

    #[test]
    fn test_malformed_dict_falls_back_to_positional() {
        match parse_line("update User 1 {oops}") {
            Command::Update { payload, .. } => {
                assert_eq!(payload, UpdatePayload::Name("{oops}".to_string()))
            }
            other => panic!("Wrong command variant: {:?}", other),
        }
    }

    #[test]
    fn test_dotted_forms() {
        assert_eq!(
            parse_line("User.all()"),
            Command::All {
                class_name: s("User")
            }
        );
        assert_eq!(
            parse_line("User.count()"),
            Command::Count {
                class_name: s("User")
            }
        );
        assert_eq!(
            parse_line(r#"User.show("1234")"#),
            Command::Show {
                class_name: s("User"),
                id: s("1234"),
            }
        );
        assert_eq!(
            parse_line(r#"User.update("1234", "first_name", "John")"#),
            Command::Update {
                class_name: s("User"),
                id: s("1234"),
                payload: UpdatePayload::Pair {
                    name: "first_name".to_string(),
                    value: json!("John"),
                },
            }
        );
        assert_eq!(
            parse_line(r#"User.update("1234", {'first_name': "John", 'age': 89})"#),
            Command::Update {
                class_name: s("User"),
                id: s("1234"),
                payload: UpdatePayload::Dict(vec![
                    ("first_name".to_string(), json!("John")),
                    ("age".to_string(), json!(89)),
                ]),
            }
        );
    }

    #[test]
    fn test_unrecognised_dotted_is_unknown() {
        assert!(matches!(parse_line("User.fly()"), Command::Unknown { .. }));
        assert!(matches!(parse_line("Ghost.all()"), Command::Unknown { .. }));
        assert!(matches!(parse_line("User.all("), Command::Unknown { .. }));
    }

    #[test]
    fn test_quit_eof_help() {
        assert_eq!(parse_line("quit"), Command::Quit);
        assert_eq!(parse_line("EOF"), Command::Eof);
        assert_eq!(
            parse_line("help show"),
            Command::Help { topic: s("show") }
        );
        assert_eq!(parse_line("airbnb"), Command::Airbnb);
    }
}
