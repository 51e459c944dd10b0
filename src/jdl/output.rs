use std::fmt::Write;

/// Accumulates `key = value;` entries of a JDL document
///
/// A single value is written bare when it is an integer and quoted otherwise. Several values
/// are written as a brace delimited list, one quoted value per line.
#[derive(Debug, Default)]
pub struct JdlWriter {
    content: String,
}

impl JdlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the document with already rendered text, e.g. a comment header
    pub fn with_header(header: &str) -> Self {
        JdlWriter { content: header.to_string() }
    }

    pub fn output<S: AsRef<str>>(&mut self, key: &str, values: &[S]) -> &mut Self {
        let values: Vec<&str> = values
            .iter()
            .map(|v| v.as_ref())
            .filter(|v| !v.is_empty())
            .collect();

        // writing into a String can't fail
        let _ = write!(self.content, "{key} = ");
        match values.as_slice() {
            [] => self.content.push_str("\"\""),
            [single] => self.content.push_str(&format_scalar(single)),
            many => {
                self.content.push_str("{\n");
                let last = many.len() - 1;
                for (i, v) in many.iter().enumerate() {
                    let _ = write!(self.content, "\t\"{v}\"");
                    if i != last {
                        self.content.push(',');
                    }
                    self.content.push('\n');
                }
                self.content.push('}');
            }
        }
        self.content.push_str(";\n");
        self
    }

    pub fn output_one(&mut self, key: &str, value: &str) -> &mut Self {
        self.output(key, &[value])
    }

    pub fn finish(self) -> String {
        self.content
    }
}

/// Integers are bare (without leading zeros), anything else is a quoted string
fn format_scalar(value: &str) -> String {
    if value.bytes().all(|b| b.is_ascii_digit()) {
        let trimmed = value.trim_start_matches('0');
        match trimmed.is_empty() {
            true => "0".to_string(),
            false => trimmed.to_string(),
        }
    } else {
        format!("\"{value}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_value_is_bare() {
        let mut jdl = JdlWriter::new();
        jdl.output_one("TTL", "72000").output_one("Price", "007");
        assert_eq!(jdl.finish(), "TTL = 72000;\nPrice = 7;\n");
    }

    #[test]
    fn test_string_value_is_quoted() {
        let mut jdl = JdlWriter::new();
        jdl.output_one("Workdirectorysize", "5000MB");
        assert_eq!(jdl.finish(), "Workdirectorysize = \"5000MB\";\n");
    }

    #[test]
    fn test_multiple_values_are_a_list() {
        let mut jdl = JdlWriter::new();
        jdl.output("JDLVariables", &["Packages", "OutputDir"]);
        assert_eq!(
            jdl.finish(),
            "JDLVariables = {\n\t\"Packages\",\n\t\"OutputDir\"\n};\n"
        );
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let mut jdl = JdlWriter::new();
        jdl.output("Packages", &["VO_ALICE@AliRoot::v5-03-Rev-18", "", ""]);
        jdl.output("Nothing", &[""]);
        assert_eq!(
            jdl.finish(),
            "Packages = \"VO_ALICE@AliRoot::v5-03-Rev-18\";\nNothing = \"\";\n"
        );
    }
}
