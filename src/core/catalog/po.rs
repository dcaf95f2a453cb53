use crate::domain::model::Message;
use crate::utils::error::{GettextError, Result};
use std::path::Path;

/// A parsed PO file: the header entry plus the messages in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub header: Message,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Context,
    Msgid,
    Plural,
    Msgstr(usize),
}

#[derive(Debug, Default)]
struct Pending {
    message: Message,
    has_msgid: bool,
    field: Option<Field>,
}

impl Pending {
    fn is_empty(&self) -> bool {
        !self.has_msgid
            && self.message.context.is_none()
            && self.message.comments.is_empty()
            && self.message.flags.is_empty()
    }

    fn append(&mut self, field: Field, text: &str) {
        match field {
            Field::Context => self
                .message
                .context
                .get_or_insert_with(String::new)
                .push_str(text),
            Field::Msgid => self.message.msgid.push_str(text),
            Field::Plural => self
                .message
                .msgid_plural
                .get_or_insert_with(String::new)
                .push_str(text),
            Field::Msgstr(index) => {
                if self.message.msgstr.len() <= index {
                    self.message.msgstr.resize(index + 1, String::new());
                }
                self.message.msgstr[index].push_str(text);
            }
        }
    }
}

impl Catalog {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut catalog = Catalog::default();
        let mut pending = Pending::default();

        for (index, raw) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();

            if line.is_empty() {
                catalog.flush(&mut pending);
                continue;
            }

            if line.starts_with("#~") {
                continue;
            }

            if let Some(flags) = line.strip_prefix("#,") {
                if pending.has_msgid {
                    catalog.flush(&mut pending);
                }
                pending.message.flags.extend(
                    flags
                        .split(',')
                        .map(str::trim)
                        .filter(|flag| !flag.is_empty())
                        .map(String::from),
                );
                continue;
            }

            if line.starts_with('#') {
                if pending.has_msgid {
                    catalog.flush(&mut pending);
                }
                pending.message.comments.push(line.to_string());
                continue;
            }

            if line.starts_with('"') {
                let field = pending.field.ok_or_else(|| GettextError::CatalogParse {
                    line: line_no,
                    message: "string continuation without a keyword".to_string(),
                })?;
                pending.append(field, &unquote(line, line_no)?);
                continue;
            }

            let (keyword, rest) = line
                .split_once(char::is_whitespace)
                .ok_or_else(|| GettextError::CatalogParse {
                    line: line_no,
                    message: format!("unexpected line '{}'", line),
                })?;
            let value = unquote(rest.trim(), line_no)?;

            let field = match keyword {
                "msgctxt" => {
                    if pending.has_msgid {
                        catalog.flush(&mut pending);
                    }
                    Field::Context
                }
                "msgid" => {
                    if pending.has_msgid {
                        catalog.flush(&mut pending);
                    }
                    pending.has_msgid = true;
                    Field::Msgid
                }
                "msgid_plural" => Field::Plural,
                "msgstr" => Field::Msgstr(0),
                other => match other
                    .strip_prefix("msgstr[")
                    .and_then(|rest| rest.strip_suffix(']'))
                    .and_then(|n| n.parse::<usize>().ok())
                {
                    Some(n) => Field::Msgstr(n),
                    None => {
                        return Err(GettextError::CatalogParse {
                            line: line_no,
                            message: format!("unknown keyword '{}'", other),
                        })
                    }
                },
            };

            if matches!(field, Field::Plural | Field::Msgstr(_)) && !pending.has_msgid {
                return Err(GettextError::CatalogParse {
                    line: line_no,
                    message: format!("'{}' before msgid", keyword),
                });
            }

            pending.field = Some(field);
            pending.append(field, &value);
        }

        catalog.flush(&mut pending);
        Ok(catalog)
    }

    fn flush(&mut self, pending: &mut Pending) {
        let done = std::mem::take(pending);
        if done.is_empty() || !done.has_msgid {
            return;
        }

        let mut message = done.message;
        if message.msgstr.is_empty() {
            message.msgstr.push(String::new());
        }

        if message.is_header() {
            self.header = message;
        } else {
            self.messages.push(message);
        }
    }

    /// Header fields in order.
    pub fn headers(&self) -> Vec<(String, String)> {
        self.header
            .msgstr
            .first()
            .map(|text| {
                text.lines()
                    .filter_map(|line| line.split_once(':'))
                    .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn header_value(&self, key: &str) -> Option<String> {
        self.headers()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Replaces all header fields.
    pub fn set_headers(&mut self, headers: &[(String, String)]) {
        let text: String = headers
            .iter()
            .map(|(k, v)| format!("{}: {}\n", k, v))
            .collect();
        self.header.msgstr = vec![text];
    }

    pub fn find(&self, msgid: &str) -> Option<&Message> {
        self.messages
            .iter()
            .find(|m| m.context.is_none() && m.msgid == msgid)
    }

    pub fn to_po(&self) -> String {
        let mut out = String::new();

        write_entry(&mut out, &self.header);
        for message in &self.messages {
            out.push('\n');
            write_entry(&mut out, message);
        }

        out
    }

    pub fn write_po<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_po())?;
        Ok(())
    }
}

fn write_entry(out: &mut String, message: &Message) {
    for comment in &message.comments {
        out.push_str(comment);
        out.push('\n');
    }
    if !message.flags.is_empty() {
        out.push_str("#, ");
        out.push_str(&message.flags.join(", "));
        out.push('\n');
    }
    if let Some(context) = &message.context {
        write_field(out, "msgctxt", context);
    }
    write_field(out, "msgid", &message.msgid);
    if let Some(plural) = &message.msgid_plural {
        write_field(out, "msgid_plural", plural);
        for (index, form) in message.msgstr.iter().enumerate() {
            write_field(out, &format!("msgstr[{}]", index), form);
        }
    } else {
        let msgstr = message.msgstr.first().map(String::as_str).unwrap_or("");
        write_field(out, "msgstr", msgstr);
    }
}

/// Values with inner newlines are split one line per segment, as msgmerge does.
fn write_field(out: &mut String, keyword: &str, value: &str) {
    let inner_newline = value
        .find('\n')
        .is_some_and(|pos| pos + 1 < value.len());

    if !inner_newline {
        out.push_str(&format!("{} \"{}\"\n", keyword, escape(value)));
        return;
    }

    out.push_str(&format!("{} \"\"\n", keyword));
    for segment in value.split_inclusive('\n') {
        out.push_str(&format!("\"{}\"\n", escape(segment)));
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn unquote(token: &str, line: usize) -> Result<String> {
    let inner = token
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .filter(|_| token.len() >= 2)
        .ok_or_else(|| GettextError::CatalogParse {
            line,
            message: format!("expected a quoted string, found '{}'", token),
        })?;

    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('"') => value.push('"'),
            Some('\\') => value.push('\\'),
            Some(other) => {
                return Err(GettextError::CatalogParse {
                    line,
                    message: format!("unknown escape sequence '\\{}'", other),
                })
            }
            None => {
                return Err(GettextError::CatalogParse {
                    line,
                    message: "dangling backslash".to_string(),
                })
            }
        }
    }

    Ok(value)
}
