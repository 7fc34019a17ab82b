//! Help topics and banners

/// Prompt shown by default
pub const DEFAULT_PROMPT: &str = "(hbnb) ";

/// Prompt after `airbnb` toggles it
pub const ALTERNATE_PROMPT: &str = " /_ /_ _  /_\n/ //_// //_/ ";

pub const WELCOME_BANNER: &[&str] = &[
    ".----------------------------.",
    "|    Welcome to hbnb CLI!    |",
    "|   for help, input 'help'   |",
    "|   for quit, input 'quit'   |",
    ".----------------------------.",
];

pub const FAREWELL_BANNER: &[&str] = &[
    ".----------------------------.",
    "|  Well, that sure was fun!  |",
    ".----------------------------.",
];

pub const AIRBNB_BANNER: &[&str] = &[
    "                      __ ___                        ",
    "    _     _  _ _||\\ |/  \\ | _  _  _|_|_     _  _ _| ",
    "|_||_)\\)/(_|| (_|| \\|\\__/ || )(_)| |_| )\\)/(_|| (_| ",
    "   |                                                ",
];

/// Documented verbs and their usage text, in listing order
const TOPICS: &[(&str, &str)] = &[
    (
        "EOF",
        "EOF: end of input\nUSAGE: Ctrl-D quits the program",
    ),
    (
        "airbnb",
        "airbnb: airbnb\nSYNOPSIS: prints a banner and toggles the prompt string",
    ),
    (
        "all",
        "all: all [CLASS]\n       <CLASS>.all()\nSYNOPSIS: prints every instance, or every instance of CLASS",
    ),
    (
        "count",
        "count: count CLASS\n       <CLASS>.count()\nSYNOPSIS: prints the number of instances of CLASS",
    ),
    (
        "create",
        "create: create CLASS [KEY=VALUE ...]\nSYNOPSIS: creates an instance of CLASS, sets the given attributes and prints its id\nQuoted values are strings (_ reads as a space); others are numbers when they parse",
    ),
    (
        "destroy",
        "destroy: destroy CLASS ID\n         <CLASS>.destroy(ID)\nSYNOPSIS: deletes the instance of CLASS with ID, and everything that depends on it",
    ),
    ("help", "help: help [VERB]\nSYNOPSIS: lists verbs, or describes one"),
    ("quit", "quit: quit\nUSAGE: Command to quit the program"),
    (
        "show",
        "show: show CLASS ID\n      <CLASS>.show(ID)\nSYNOPSIS: prints the instance of CLASS with ID",
    ),
    (
        "update",
        "update: update CLASS ID NAME VALUE\n        <CLASS>.update(ID, NAME, VALUE)\n        <CLASS>.update(ID, {NAME: VALUE, ...})\nSYNOPSIS: sets attributes on the instance of CLASS with ID",
    ),
];

/// Listing printed by a bare `help`
pub fn overview() -> String {
    let verbs: Vec<&str> = TOPICS.iter().map(|(verb, _)| *verb).collect();
    format!(
        "\nDocumented commands (type help <topic>):\n========================================\n{}\n",
        verbs.join("  ")
    )
}

/// Usage text for one verb, if documented
pub fn topic(verb: &str) -> Option<&'static str> {
    TOPICS
        .iter()
        .find(|(name, _)| *name == verb)
        .map(|(_, text)| *text)
}
