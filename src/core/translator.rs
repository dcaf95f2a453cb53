use crate::core::gettext::Gettext;
use crate::domain::ports::{FrameworkAdapter, SessionHandler, TextDomainRuntime};
use crate::utils::error::Result;
use std::fmt;

/// Entry point for application code.
pub struct Translator<S, A, R>
where
    S: SessionHandler,
    A: FrameworkAdapter,
    R: TextDomainRuntime,
{
    gettext: Gettext<S, A, R>,
}

impl<S, A, R> Translator<S, A, R>
where
    S: SessionHandler,
    A: FrameworkAdapter,
    R: TextDomainRuntime,
{
    pub fn new(gettext: Gettext<S, A, R>) -> Self {
        Self { gettext }
    }

    pub fn gettext(&self) -> &Gettext<S, A, R> {
        &self.gettext
    }

    pub fn into_inner(self) -> Gettext<S, A, R> {
        self.gettext
    }

    pub fn set_locale(&mut self, locale: &str) -> Result<&mut Self> {
        self.gettext.set_locale(locale)?;
        Ok(self)
    }

    pub fn locale(&self) -> &str {
        self.gettext.locale()
    }

    pub fn is_locale_supported(&self, locale: &str) -> bool {
        self.gettext.is_locale_supported(locale)
    }

    pub fn supported_locales(&self) -> &[String] {
        &self.gettext.config().supported_locales
    }

    /// Language part of the locale: `es` for `es_AR`.
    pub fn locale_language(&self) -> &str {
        let locale = self.locale();
        locale.split(['_', '.', '@']).next().unwrap_or(locale)
    }

    pub fn set_domain(&mut self, domain: &str) -> Result<&mut Self> {
        self.gettext.with_default_domain(domain)?;
        Ok(self)
    }

    pub fn domain(&self) -> &str {
        self.gettext.domain()
    }

    pub fn encoding(&self) -> &str {
        self.gettext.encoding()
    }

    pub fn set_encoding(&mut self, encoding: impl Into<String>) -> &mut Self {
        self.gettext.set_encoding(encoding);
        self
    }

    /// `_()`: looks `msgid` up in the default domain.
    pub fn translate(&self, msgid: &str) -> String {
        self.gettext.translate(msgid)
    }

    pub fn translate_plural(&self, msgid: &str, msgid_plural: &str, n: u32) -> String {
        self.gettext.translate_plural(msgid, msgid_plural, n)
    }

    pub fn translate_in(&self, domain: &str, msgid: &str) -> String {
        self.gettext.translate_in(domain, msgid)
    }

    /// Translates, then fills `%s`/`%d` placeholders from `args` in order.
    pub fn translate_fmt(&self, msgid: &str, args: &[&dyn fmt::Display]) -> String {
        format_placeholders(&self.translate(msgid), args)
    }
}

impl<S, A, R> fmt::Display for Translator<S, A, R>
where
    S: SessionHandler,
    A: FrameworkAdapter,
    R: TextDomainRuntime,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.locale())
    }
}

impl<S, A, R> fmt::Debug for Translator<S, A, R>
where
    S: SessionHandler,
    A: FrameworkAdapter,
    R: TextDomainRuntime,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("gettext", &self.gettext)
            .finish()
    }
}

/// printf-style substitution for `%s`, `%d` and `%%`. Placeholders without
/// a matching argument are left as they are.
pub fn format_placeholders(template: &str, args: &[&dyn fmt::Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(spec @ ('s' | 'd')) => {
                chars.next();
                match args.next() {
                    Some(arg) => out.push_str(&arg.to_string()),
                    None => {
                        out.push('%');
                        out.push(spec);
                    }
                }
            }
            _ => out.push('%'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_placeholders() {
        assert_eq!(
            format_placeholders("%s has %d new messages", &[&"Ana", &3]),
            "Ana has 3 new messages"
        );
        assert_eq!(format_placeholders("100%% of %s", &[&"it"]), "100% of it");
        assert_eq!(format_placeholders("%s and %s", &[&"one"]), "one and %s");
        assert_eq!(format_placeholders("50% off", &[]), "50% off");
    }
}
