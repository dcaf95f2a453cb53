use serde::{Deserialize, Serialize};
use std::fmt;

/// Native locale categories the binder can set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocaleCategory {
    #[serde(rename = "LC_ALL")]
    All,
    #[serde(rename = "LC_COLLATE")]
    Collate,
    #[serde(rename = "LC_CTYPE")]
    CType,
    #[serde(rename = "LC_MONETARY")]
    Monetary,
    #[serde(rename = "LC_NUMERIC")]
    Numeric,
    #[serde(rename = "LC_TIME")]
    Time,
    #[serde(rename = "LC_MESSAGES")]
    Messages,
}

impl LocaleCategory {
    pub const DEFAULTS: [LocaleCategory; 6] = [
        LocaleCategory::Collate,
        LocaleCategory::CType,
        LocaleCategory::Monetary,
        LocaleCategory::Numeric,
        LocaleCategory::Time,
        LocaleCategory::Messages,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LocaleCategory::All => "LC_ALL",
            LocaleCategory::Collate => "LC_COLLATE",
            LocaleCategory::CType => "LC_CTYPE",
            LocaleCategory::Monetary => "LC_MONETARY",
            LocaleCategory::Numeric => "LC_NUMERIC",
            LocaleCategory::Time => "LC_TIME",
            LocaleCategory::Messages => "LC_MESSAGES",
        }
    }

    /// Whether setting this category changes message lookup.
    pub fn affects_messages(self) -> bool {
        matches!(self, LocaleCategory::All | LocaleCategory::Messages)
    }
}

impl fmt::Display for LocaleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of a PO catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub context: Option<String>,
    pub msgid: String,
    pub msgid_plural: Option<String>,
    pub msgstr: Vec<String>,
    pub flags: Vec<String>,
    pub comments: Vec<String>,
}

impl Message {
    pub fn new(msgid: impl Into<String>, msgstr: impl Into<String>) -> Self {
        Self {
            msgid: msgid.into(),
            msgstr: vec![msgstr.into()],
            ..Self::default()
        }
    }

    pub fn is_header(&self) -> bool {
        self.msgid.is_empty() && self.context.is_none()
    }

    pub fn is_fuzzy(&self) -> bool {
        self.flags.iter().any(|flag| flag == "fuzzy")
    }

    pub fn is_translated(&self) -> bool {
        !self.msgstr.is_empty() && self.msgstr.iter().all(|form| !form.is_empty())
    }

    /// Key under which the entry is stored in a compiled MO file.
    pub fn mo_key(&self) -> String {
        let mut key = String::new();
        if let Some(context) = &self.context {
            key.push_str(context);
            key.push('\u{4}');
        }
        key.push_str(&self.msgid);
        if let Some(plural) = &self.msgid_plural {
            key.push('\0');
            key.push_str(plural);
        }
        key
    }

    pub fn mo_value(&self) -> String {
        self.msgstr.join("\0")
    }
}
