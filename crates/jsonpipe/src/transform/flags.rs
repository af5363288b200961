//! Named regex flags.

use std::borrow::Cow;

use regex::{Regex, RegexBuilder};

use crate::error::{JsonPipeError, Result};

/// A set of regex flags, OR-combined from flag names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexFlags(u8);

impl RegexFlags {
    pub const IGNORECASE: RegexFlags = RegexFlags(1);
    pub const MULTILINE: RegexFlags = RegexFlags(1 << 1);
    pub const DOTALL: RegexFlags = RegexFlags(1 << 2);
    pub const VERBOSE: RegexFlags = RegexFlags(1 << 3);
    pub const UNICODE: RegexFlags = RegexFlags(1 << 4);
    pub const ASCII: RegexFlags = RegexFlags(1 << 5);

    /// An empty flag set.
    pub fn empty() -> Self {
        Self(0)
    }

    /// Look up a single flag by name, ignoring case.
    ///
    /// Accepts the one-letter and the long spelling (`I` / `IGNORECASE`).
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "I" | "IGNORECASE" => Ok(Self::IGNORECASE),
            "M" | "MULTILINE" => Ok(Self::MULTILINE),
            "S" | "DOTALL" => Ok(Self::DOTALL),
            "X" | "VERBOSE" => Ok(Self::VERBOSE),
            "U" | "UNICODE" => Ok(Self::UNICODE),
            "A" | "ASCII" => Ok(Self::ASCII),
            _ => Err(JsonPipeError::UnknownRegexFlag(name.to_string())),
        }
    }

    /// OR-combine a list of flag names.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        names
            .iter()
            .try_fold(Self::empty(), |acc, name| Ok(acc | Self::from_name(name.as_ref())?))
    }

    /// Whether every flag in `other` is set.
    pub fn contains(self, other: RegexFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Compile a pattern with these flags.
    ///
    /// With `ASCII`, `\w`, `\d`, `\s` and `\b` (and their negations) only
    /// know ASCII. `\B` has no ASCII form on text and is rejected.
    pub fn compile(self, pattern: &str) -> Result<Regex> {
        let pattern = if self.contains(Self::ASCII) {
            Cow::Owned(ascii_classes(pattern)?)
        } else {
            Cow::Borrowed(pattern)
        };

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(self.contains(Self::IGNORECASE))
            .multi_line(self.contains(Self::MULTILINE))
            .dot_matches_new_line(self.contains(Self::DOTALL))
            .ignore_whitespace(self.contains(Self::VERBOSE))
            .build()?;
        Ok(regex)
    }
}

/// Rewrite Perl classes and word boundaries to their ASCII-only forms.
///
/// Inside a bracket class the POSIX item (`[:word:]`) is used, outside it
/// the bracketed form (`[[:word:]]`).
fn ascii_classes(pattern: &str) -> Result<String> {
    let mut out = String::with_capacity(pattern.len() + 16);
    let mut chars = pattern.chars().peekable();
    let mut class_depth = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('B') if class_depth == 0 => {
                    return Err(JsonPipeError::Config(format!(
                        "'\\B' is not supported with the ASCII flag in '{}'",
                        pattern
                    )));
                }
                Some(escaped) => match ascii_escape(escaped, class_depth > 0) {
                    Some(replacement) => out.push_str(replacement),
                    None => {
                        out.push('\\');
                        out.push(escaped);
                    }
                },
                None => out.push('\\'),
            },
            '[' => {
                class_depth += 1;
                out.push('[');
                if chars.peek() == Some(&'^') {
                    out.push('^');
                    chars.next();
                }
                if chars.peek() == Some(&']') {
                    out.push(']');
                    chars.next();
                }
            }
            ']' if class_depth > 0 => {
                class_depth -= 1;
                out.push(']');
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

fn ascii_escape(escaped: char, in_class: bool) -> Option<&'static str> {
    let replacement = match (escaped, in_class) {
        ('w', false) => "[[:word:]]",
        ('W', false) => "[[:^word:]]",
        ('d', false) => "[[:digit:]]",
        ('D', false) => "[[:^digit:]]",
        ('s', false) => "[[:space:]]",
        ('S', false) => "[[:^space:]]",
        ('b', false) => r"(?-u:\b)",
        ('w', true) => "[:word:]",
        ('W', true) => "[:^word:]",
        ('d', true) => "[:digit:]",
        ('D', true) => "[:^digit:]",
        ('s', true) => "[:space:]",
        ('S', true) => "[:^space:]",
        _ => return None,
    };
    Some(replacement)
}

impl std::ops::BitOr for RegexFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_names_case_insensitive() {
        assert_eq!(RegexFlags::from_name("i").unwrap(), RegexFlags::IGNORECASE);
        assert_eq!(
            RegexFlags::from_name("IgnoreCase").unwrap(),
            RegexFlags::IGNORECASE
        );
        assert_eq!(RegexFlags::from_name("dotall").unwrap(), RegexFlags::DOTALL);
    }

    #[test]
    fn test_flags_are_or_combined() {
        let flags = RegexFlags::from_names(&["I", "M"]).unwrap();
        assert!(flags.contains(RegexFlags::IGNORECASE));
        assert!(flags.contains(RegexFlags::MULTILINE));
        assert!(!flags.contains(RegexFlags::DOTALL));
    }

    #[test]
    fn test_empty_flag_list() {
        let names: Vec<String> = Vec::new();
        assert_eq!(RegexFlags::from_names(&names).unwrap(), RegexFlags::empty());
    }

    #[test]
    fn test_unknown_flag() {
        let err = RegexFlags::from_names(&["I", "Q"]).unwrap_err();
        assert!(matches!(err, JsonPipeError::UnknownRegexFlag(name) if name == "Q"));
    }

    #[test]
    fn test_compile_case_insensitive() {
        let re = RegexFlags::IGNORECASE.compile(r"office_\d+").unwrap();
        assert!(re.is_match("Office_1"));
        assert!(!RegexFlags::empty().compile(r"office_\d+").unwrap().is_match("Office_1"));
    }

    #[test]
    fn test_compile_multiline() {
        let re = RegexFlags::MULTILINE.compile(r"^b$").unwrap();
        assert!(re.is_match("a\nb\nc"));
    }

    #[test]
    fn test_compile_verbose() {
        let re = RegexFlags::VERBOSE.compile(r"office _ \d+  # suffix").unwrap();
        assert!(re.is_match("office_42"));
    }

    #[test]
    fn test_compile_ascii() {
        assert!(RegexFlags::empty().compile(r"^\w+$").unwrap().is_match("café"));
        assert!(!RegexFlags::ASCII.compile(r"^\w+$").unwrap().is_match("café"));
        assert!(!RegexFlags::ASCII.compile(r"^\w.$").unwrap().is_match("éa"));
        assert!(RegexFlags::ASCII.compile(r"^\w.$").unwrap().is_match("aé"));
    }

    #[test]
    fn test_compile_ascii_classes_and_boundaries() {
        let re = RegexFlags::ASCII.compile(r"^[\w-]+\s\d+$").unwrap();
        assert!(re.is_match("st-john 12"));
        assert!(!re.is_match("saint-jérôme 12"));
        assert!(!re.is_match("office\u{3000}12"));
        assert!(!re.is_match("office ١٢"));

        let re = RegexFlags::ASCII.compile(r"\bwork\b").unwrap();
        assert!(re.is_match("at work today"));
        assert!(RegexFlags::ASCII.compile(r"[^\W]").unwrap().is_match("é_"));
        assert!(RegexFlags::ASCII.compile(r"\\w").unwrap().is_match(r"\w"));
    }

    #[test]
    fn test_ascii_rewrite() {
        assert_eq!(ascii_classes(r"\w.[\d]").unwrap(), "[[:word:]].[[:digit:]]");
        assert_eq!(ascii_classes(r"[]\s]").unwrap(), "[][:space:]]");
        assert_eq!(ascii_classes(r"\\d\.").unwrap(), r"\\d\.");
        assert!(matches!(
            ascii_classes(r"a\Bb"),
            Err(JsonPipeError::Config(_))
        ));
    }

    #[test]
    fn test_compile_error() {
        assert!(matches!(
            RegexFlags::empty().compile("(unclosed"),
            Err(JsonPipeError::Regex(_))
        ));
    }
}
