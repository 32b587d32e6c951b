use glob::Pattern;

/// Match `text` against a wildcard pattern where `*` is the only wildcard.
///
/// The whole string must match. Every other character, including `?`, `[`
/// and `]`, is taken literally.
pub fn glob_match(text: &str, pattern: &str) -> bool {
    compile(pattern).map_or(false, |compiled| compiled.matches(text))
}

fn compile(pattern: &str) -> Option<Pattern> {
    let mut source = pattern
        .split('*')
        .map(Pattern::escape)
        .collect::<Vec<_>>()
        .join("*");

    // glob treats `**` as a recursive wildcard that must be its own path
    // component; a run of stars means the same thing as one here.
    while source.contains("**") {
        source = source.replace("**", "*");
    }

    Pattern::new(&source).ok()
}

/// Compiled package-name exclusion list
#[derive(Debug, Default)]
pub struct ExcludeSet {
    patterns: Vec<(String, Option<Pattern>)>,
}

impl ExcludeSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let patterns = patterns
            .iter()
            .map(|p| (p.as_ref().to_string(), compile(p.as_ref())))
            .collect();
        Self { patterns }
    }

    /// Returns the first pattern that matches `name`
    pub fn find_match(&self, name: &str) -> Option<&str> {
        self.patterns.iter().find_map(|(source, compiled)| {
            match compiled {
                Some(pattern) if pattern.matches(name) => Some(source.as_str()),
                _ => None,
            }
        })
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.find_match(name).is_some()
    }
}
