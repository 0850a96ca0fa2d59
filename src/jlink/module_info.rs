//! Extract required modules from a `module-info.java` source

/// Modules named by `requires` directives, in declaration order
///
/// `requires transitive` counts; `requires static` is compile-time only and
/// is left out.
pub fn parse_module_info(source: &str) -> Vec<String> {
    let code = strip_comments(source);
    let mut modules: Vec<String> = Vec::new();

    for statement in code.split(&[';', '{', '}'][..]) {
        let tokens: Vec<&str> = statement.split_whitespace().collect();
        let name = match tokens.as_slice() {
            [.., "requires", name] => *name,
            [.., "requires", "transitive", name] => *name,
            _ => continue,
        };
        if is_module_name(name) && !modules.iter().any(|m| m == name) {
            modules.push(name.to_string());
        }
    }

    modules
}

fn is_module_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    loop {
        let line = rest.find("//");
        let block = rest.find("/*");
        let (start, terminator) = match (line, block) {
            (Some(l), Some(b)) if l < b => (l, "\n"),
            (Some(l), None) => (l, "\n"),
            (_, Some(b)) => (b, "*/"),
            (None, None) => {
                out.push_str(rest);
                return out;
            }
        };

        out.push_str(&rest[..start]);
        out.push(' ');
        let after = &rest[start + 2..];
        match after.find(terminator) {
            Some(end) => rest = &after[end + terminator.len()..],
            None => return out,
        }
    }
}
