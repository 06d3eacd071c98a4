//! Message catalog for prompts and alerts.
//!
//! Keys may carry a namespace (`groups:groupDeleteError`). Lookups try the full
//! key first and then the bare key. When a `count` argument is present the
//! plural form `key_one` / `key_other` wins over `key`.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::Arc;

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("placeholder pattern");
    static ref GLOBAL_MESSAGES: Arc<Messages> = Arc::new(Messages::english());
}

const ENGLISH: &[(&str, &str)] = &[
    ("cancel", "Cancel"),
    ("delete", "Delete"),
    ("common:delete", "Delete"),
    ("deleteConfirmTitle_one", "Delete group?"),
    ("deleteConfirmTitle_other", "Delete groups?"),
    ("deleteConfirmGroup_one", "Are you sure you want to delete this group {{groupName}}."),
    ("deleteConfirmGroup_other", "Are you sure you want to delete these groups."),
    ("groupDeleted_one", "Group deleted"),
    ("groupDeleted_other", "{{count}} groups deleted"),
    ("groupDeleteError", "Error deleting group {{error}}"),
    ("import", "Import"),
    ("importKey", "Import key"),
    ("importSuccess", "New key pair has been imported"),
    ("importError", "Could not import certificate {{error}}"),
];

/// Named values substituted into a message.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: Vec<(String, String)>,
    count: Option<usize>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `count`, which also selects the plural form.
    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self.values.push(("count".to_string(), count.to_string()));
        self
    }

    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.values.push((name.to_string(), value.to_string()));
        self
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Key → template table
#[derive(Debug, Clone, Default)]
pub struct Messages {
    templates: HashMap<String, String>,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in English strings used by the console workflows
    pub fn english() -> Self {
        let mut messages = Self::new();
        for (key, template) in ENGLISH {
            messages.insert(key, template);
        }
        messages
    }

    /// Shared English catalog
    pub fn global() -> &'static Arc<Messages> {
        &GLOBAL_MESSAGES
    }

    pub fn insert(&mut self, key: &str, template: &str) {
        self.templates.insert(key.to_string(), template.to_string());
    }

    /// Resolves `key` and fills its placeholders. Unknown keys come back as-is.
    pub fn t(&self, key: &str, args: &Args) -> String {
        match self.lookup(key, args.count) {
            Some(template) => Self::interpolate(template, args),
            None => key.to_string(),
        }
    }

    /// Resolves a key that takes no arguments.
    pub fn text(&self, key: &str) -> String {
        self.t(key, &Args::new())
    }

    fn lookup(&self, key: &str, count: Option<usize>) -> Option<&str> {
        let bare = key.split_once(':').map(|(_, bare)| bare);

        std::iter::once(key).chain(bare).find_map(|candidate| {
            let plural = count.and_then(|count| {
                let suffix = if count == 1 { "one" } else { "other" };
                self.templates.get(&format!("{}_{}", candidate, suffix))
            });
            plural.or_else(|| self.templates.get(candidate)).map(String::as_str)
        })
    }

    fn interpolate(template: &str, args: &Args) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| match args.get(&caps[1]) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}
