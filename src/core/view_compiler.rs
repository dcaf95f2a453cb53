use regex::Regex;
use std::sync::OnceLock;

fn template_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?s)(?P<comment>\{\{--.*?--\}\})|(?P<literal>@\{\{.*?\}\})|\{!!(?P<raw>.*?)!!\}|\{\{(?P<echo>.*?)\}\}|@(?P<directive>lang|choice)\s*\(",
        )
        .expect("valid template pattern")
    })
}

/// Turns view templates into plain statements an extractor can scan.
///
/// Every echo expression (`{{ … }}`, `{!! … !!}`) becomes `expr;`, `@lang(…)`
/// becomes `__(…);` and `@choice(…)` becomes `_n(…);`. Markup and template
/// comments are dropped. Each statement stays on the line it started on, so
/// extractor references point at the template.
#[derive(Debug, Default, Clone, Copy)]
pub struct ViewCompiler;

impl ViewCompiler {
    pub fn new() -> Self {
        Self
    }

    pub fn compile(&self, source: &str) -> String {
        let pattern = template_pattern();
        let mut out = String::new();
        let mut out_line = 0usize;
        let mut pos = 0usize;

        while let Some(caps) = pattern.captures_at(source, pos) {
            let Some(whole) = caps.get(0) else {
                break;
            };
            let line = line_of(source, whole.start());

            let skipped = caps.name("comment").is_some() || caps.name("literal").is_some();
            let (statement, end) = if skipped {
                (None, whole.end())
            } else if let Some(expr) = caps.name("raw").or_else(|| caps.name("echo")) {
                (Some(expr.as_str().trim().to_string()), whole.end())
            } else if let Some(directive) = caps.name("directive") {
                match balanced_args(source, whole.end()) {
                    Some((args, end)) => {
                        let function = if directive.as_str() == "lang" { "__" } else { "_n" };
                        (Some(format!("{}({})", function, args)), end)
                    }
                    // unbalanced: leave the rest of the line alone
                    None => (None, whole.end()),
                }
            } else {
                (None, whole.end())
            };

            if let Some(statement) = statement.filter(|s| !s.is_empty()) {
                while out_line < line {
                    out.push('\n');
                    out_line += 1;
                }
                out.push_str(&statement);
                out.push_str("; ");
                out_line += statement.matches('\n').count();
            }

            pos = end;
        }

        let total_lines = source.matches('\n').count();
        while out_line < total_lines {
            out.push('\n');
            out_line += 1;
        }
        out
    }
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count()
}

/// Reads up to the parenthesis closing the one just before `start`, skipping
/// quoted strings. Returns the inner text and the offset after the `)`.
fn balanced_args(source: &str, start: usize) -> Option<(&str, usize)> {
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, c) in source[start..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset;
                    return Some((&source[start..end], end + 1));
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_echo_expressions_keep_their_line() {
        let source = "<h1>\n  {{ _('Frontend string with php echo') }}\n</h1>\n<p>{!! __('Raw') !!}</p>\n";
        let compiled = ViewCompiler::new().compile(source);

        assert_eq!(
            compiled,
            "\n_('Frontend string with php echo'); \n\n__('Raw'); \n"
        );
        assert_eq!(compiled.lines().count(), source.lines().count());
    }

    #[test]
    fn test_directives_and_comments() {
        let source = "{{-- {{ _('hidden') }} --}}\n@lang('Welcome (back)')\n@choice('apple|apples', 3)\n@{{ literal }}\n";
        let compiled = ViewCompiler::new().compile(source);

        assert_eq!(
            compiled,
            "\n__('Welcome (back)'); \n_n('apple|apples', 3); \n\n"
        );
    }

    #[test]
    fn test_unbalanced_directive_is_skipped() {
        let compiled = ViewCompiler::new().compile("@lang('open\n{{ $title }}\n");
        assert_eq!(compiled, "\n$title; \n");
    }

    #[test]
    fn test_plain_markup_compiles_to_blank_lines() {
        assert_eq!(ViewCompiler::new().compile("<div>\n</div>\n"), "\n\n");
    }
}
