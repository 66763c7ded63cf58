//! Built-in comment syntaxes.

use super::source::{RuleDescriptor, RuleMapping};

enum Builtin {
    Single(&'static str),
    Multi(&'static str, &'static str),
}

use Builtin::{Multi, Single};

const C_STYLE: &[Builtin] = &[Single(r"//.*"), Multi(r"/\*", r"\*/")];
const HASH: &[Builtin] = &[Single(r"#.*")];
const MARKUP: &[Builtin] = &[Multi(r"<!--", r"-->")];
const CSS: &[Builtin] = &[Multi(r"/\*", r"\*/")];
const PYTHON: &[Builtin] = &[
    Single(r"#.*"),
    Multi(r#"""""#, r#"""""#),
    Multi(r"'''", r"'''"),
];
const PHP: &[Builtin] = &[Single(r"//.*"), Single(r"#.*"), Multi(r"/\*", r"\*/")];

/// (extension, language name, rules)
const LANGUAGES: &[(&str, &str, &[Builtin])] = &[
    ("py", "Python", PYTHON),
    ("js", "JavaScript", C_STYLE),
    ("ts", "TypeScript", C_STYLE),
    ("tsx", "TypeScript JSX", C_STYLE),
    ("java", "Java", C_STYLE),
    ("c", "C", C_STYLE),
    ("h", "C/C++ Header", C_STYLE),
    ("cpp", "C++", C_STYLE),
    ("hpp", "C++ Header", C_STYLE),
    ("cc", "C++", C_STYLE),
    ("cxx", "C++", C_STYLE),
    ("hxx", "C++ Header", C_STYLE),
    ("cs", "C#", C_STYLE),
    ("go", "Go", C_STYLE),
    ("rs", "Rust", C_STYLE),
    ("php", "PHP", PHP),
    ("rb", "Ruby", HASH),
    ("swift", "Swift", C_STYLE),
    ("kt", "Kotlin", C_STYLE),
    ("kts", "Kotlin Script", C_STYLE),
    ("html", "HTML", MARKUP),
    ("htm", "HTML", MARKUP),
    ("xml", "XML", MARKUP),
    ("css", "CSS", CSS),
    ("sh", "Shell", HASH),
    ("bash", "Bash", HASH),
    ("md", "Markdown", MARKUP),
];

/// Rule descriptors for every built-in language.
pub fn builtin_mapping() -> RuleMapping {
    LANGUAGES
        .iter()
        .map(|(ext, _, rules)| {
            let descriptors = rules
                .iter()
                .map(|rule| match rule {
                    Single(pattern) => RuleDescriptor::Single {
                        pattern: pattern.to_string(),
                    },
                    Multi(start, end) => RuleDescriptor::Multi {
                        start: start.to_string(),
                        end: end.to_string(),
                    },
                })
                .collect();
            (ext.to_string(), descriptors)
        })
        .collect()
}

/// Human-readable language name for a built-in extension.
pub fn language_name(extension: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(ext, _, _)| *ext == extension)
        .map(|(_, name, _)| *name)
}
