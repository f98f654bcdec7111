use std::collections::BTreeMap;

use bases_core::Value;

/// Outcome of looking for a leading YAML block in a note.
#[derive(Debug)]
pub enum Frontmatter {
    /// No `---` block at the top of the document.
    Absent,
    Parsed(BTreeMap<String, Value>),
    /// A block was present but was not a YAML mapping.
    Invalid(String),
}

impl Frontmatter {
    /// Attributes to attach to a record; absent and invalid blocks give an empty map.
    pub fn into_attributes(self) -> BTreeMap<String, Value> {
        match self {
            Frontmatter::Parsed(map) => map,
            Frontmatter::Absent | Frontmatter::Invalid(_) => BTreeMap::new(),
        }
    }
}

/// Extract the YAML front-matter block of a markdown document.
///
/// The first line must be `---` (a BOM is tolerated); the block ends at the
/// next `---` or `...` line. An unterminated block is treated as absent.
pub fn extract_frontmatter(input: &str) -> Frontmatter {
    let mut lines = input.lines();
    let Some(first) = lines.next() else {
        return Frontmatter::Absent;
    };
    if first.trim_start_matches('\u{feff}').trim_end() != "---" {
        return Frontmatter::Absent;
    }

    let mut yaml_lines: Vec<&str> = Vec::new();
    let mut closed = false;
    for line in lines {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            closed = true;
            break;
        }
        yaml_lines.push(line);
    }
    if !closed {
        return Frontmatter::Absent;
    }
    if yaml_lines.iter().all(|l| l.trim().is_empty()) {
        return Frontmatter::Parsed(BTreeMap::new());
    }

    match parse_yaml_mapping(&yaml_lines.join("\n")) {
        Ok(map) => Frontmatter::Parsed(map),
        Err(message) => Frontmatter::Invalid(message),
    }
}

/// Document body after the front-matter block.
pub fn strip_frontmatter(input: &str) -> &str {
    let body = input.trim_start_matches('\u{feff}');
    let Some(rest) = body.strip_prefix("---") else {
        return input;
    };
    let Some(rest) = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")) else {
        return input;
    };
    let mut offset = 0usize;
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            return &rest[offset..];
        }
    }
    input
}

fn parse_yaml_mapping(yaml: &str) -> Result<BTreeMap<String, Value>, String> {
    let yaml_value: serde_yaml::Value = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;
    let json_value: serde_json::Value =
        serde_json::to_value(yaml_value).map_err(|e| e.to_string())?;

    match json_value {
        serde_json::Value::Object(map) => Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), Value::from_json(v)))
            .collect()),
        serde_json::Value::Null => Ok(BTreeMap::new()),
        other => Err(format!("front-matter is not a mapping (found {other})")),
    }
}
