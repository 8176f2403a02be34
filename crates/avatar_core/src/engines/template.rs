//! Command template substitution.
//!
//! Templates are argument vectors containing `{name}` placeholders. Each
//! token is substituted independently; tokens that end up empty are
//! dropped so optional values disappear from the command line.

/// Placeholder values for one command.
#[derive(Debug, Clone, Default)]
pub struct Placeholders {
    values: Vec<(String, String)>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a placeholder; `name` is given without braces.
    pub fn set(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.push((format!("{{{}}}", name), value.into()));
        self
    }

    /// Add a placeholder whose value may be absent (substitutes as empty).
    pub fn set_opt(self, name: &str, value: Option<String>) -> Self {
        self.set(name, value.unwrap_or_default())
    }

    /// Substitute every placeholder in one token.
    ///
    /// Single pass: substituted values are never scanned again, so a script
    /// containing `{out_path}` stays literal.
    pub fn apply(&self, token: &str) -> String {
        let mut out = String::with_capacity(token.len());
        let mut rest = token;

        'scan: while let Some(pos) = rest.find('{') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            for (key, value) in &self.values {
                if tail.starts_with(key.as_str()) {
                    out.push_str(value);
                    rest = &tail[key.len()..];
                    continue 'scan;
                }
            }
            out.push('{');
            rest = &tail[1..];
        }

        out.push_str(rest);
        out
    }

    /// Substitute a whole template, dropping tokens that become empty.
    pub fn render(&self, template: &[String]) -> Vec<String> {
        template
            .iter()
            .map(|token| self.apply(token))
            .filter(|token| !token.is_empty())
            .collect()
    }
}
