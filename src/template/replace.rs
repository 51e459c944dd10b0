use std::fs;
use std::path::Path;

use log::{debug, error, info};

use crate::error::SubmitterError;
use crate::template::vars::VariableStore;
use crate::template::VAR_PREFIX;

/// Result of substituting every token of a text
struct Rendered {
    text: String,
    found: usize,
    missing: Vec<String>,
}

/// Byte ranges of the `VAR_` tokens of a line. Comment lines (`//`) have none.
fn tokens(line: &str) -> Vec<(usize, usize)> {
    if line.starts_with("//") {
        return Vec::new();
    }
    let bytes = line.as_bytes();
    let mut ranges = Vec::new();
    let mut from = 0;
    while let Some(pos) = line[from..].find(VAR_PREFIX) {
        let start = from + pos;
        let mut end = start + VAR_PREFIX.len();
        while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
            end += 1;
        }
        ranges.push((start, end));
        from = end;
    }
    ranges
}

/// Unique variable names of a text, in order of first appearance
pub fn variables_in(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for line in text.lines() {
        for (start, end) in tokens(line) {
            let name = &line[start..end];
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Find the variables used in a file
pub fn get_variables(path: &Path) -> Result<Vec<String>, SubmitterError> {
    let text = fs::read_to_string(path)?;
    Ok(variables_in(&text))
}

/// Whether the file contains variables that have to be substituted
pub fn has_vars(path: &Path) -> Result<bool, SubmitterError> {
    let text = fs::read_to_string(path)?;
    Ok(text.lines().any(|line| !tokens(line).is_empty()))
}

fn render(text: &str, store: &VariableStore) -> Rendered {
    let mut out = String::with_capacity(text.len());
    let mut found = 0;
    let mut missing: Vec<String> = Vec::new();

    for line in text.lines() {
        let mut last = 0;
        for (start, end) in tokens(line) {
            found += 1;
            let name = &line[start..end];
            out.push_str(&line[last..start]);
            match store.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    out.push_str(name);
                    if !missing.iter().any(|m| m == name) {
                        missing.push(name.to_string());
                    }
                }
            }
            last = end;
        }
        out.push_str(&line[last..]);
        out.push('\n');
    }

    Rendered { text: out, found, missing }
}

/// Substitute every variable of a text, failing if any has no value
pub fn substitute(text: &str, store: &VariableStore) -> Result<String, Vec<String>> {
    let rendered = render(text, store);
    match rendered.missing.is_empty() {
        true => Ok(rendered.text),
        false => Err(rendered.missing),
    }
}

/// Replace the variables found in a file, in place
///
/// The file is only rewritten when it contains at least one variable and every variable has a
/// value. Returns the number of substituted tokens.
pub fn replace_vars(path: &Path, store: &VariableStore) -> Result<usize, SubmitterError> {
    let text = fs::read_to_string(path)?;
    let rendered = render(&text, store);

    if rendered.found == 0 {
        debug!("No variables in {}", path.display());
        return Ok(0);
    }

    if !rendered.missing.is_empty() {
        error!(
            "{}: found {} variables, {} unresolved",
            path.display(),
            rendered.found,
            rendered.missing.len()
        );
        return Err(SubmitterError::UnresolvedVariables {
            file: path.to_path_buf(),
            missing: rendered.missing,
        });
    }

    info!("Replacing {} variables in {}", rendered.found, path.display());
    fs::write(path, rendered.text)?;
    Ok(rendered.found)
}
