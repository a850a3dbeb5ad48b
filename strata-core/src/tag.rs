use crate::{NamingStyle, Result, StrataError, parse_bool, split_alias};

/// Parsed member annotation.
///
/// The raw form is a `;` separated list of `key:value` entries:
/// `col:name`, `extend:table as alias`, `use_alias:false`, `update_zero:true`.
/// The whole tag `-` (or `ignore`) excludes the member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub ignore: bool,
    /// The member is a joined table mapped recursively.
    pub extend: bool,
    pub extend_table: Option<String>,
    pub extend_alias: Option<String>,
    pub column: Option<String>,
    /// Prefix the column with the table alias.
    pub use_alias: bool,
    /// Write the member on update even when it holds its zero value.
    pub update_zero: bool,
}

impl Default for Tag {
    fn default() -> Self {
        Self {
            ignore: false,
            extend: false,
            extend_table: None,
            extend_alias: None,
            column: None,
            use_alias: true,
            update_zero: false,
        }
    }
}

impl Tag {
    pub fn parse(raw: &str) -> Result<Tag> {
        let raw = raw.trim();
        let mut tag = Tag::default();
        if raw == "-" || raw == "ignore" {
            tag.ignore = true;
            return Ok(tag);
        }
        let invalid = |reason: String| StrataError::InvalidTag {
            tag: raw.to_string(),
            reason,
        };
        for entry in raw.split(';') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (key, value) = entry
                .split_once(':')
                .map(|(k, v)| (k.trim(), v.trim()))
                .unwrap_or((entry, ""));
            match key {
                "col" => {
                    if value.is_empty() {
                        return Err(invalid("`col` requires a column name".into()).into());
                    }
                    tag.column = Some(value.to_string());
                }
                "extend" => {
                    tag.extend = true;
                    if !value.is_empty() {
                        let (table, alias) = split_alias(value);
                        tag.extend_table = Some(table);
                        tag.extend_alias = (!alias.is_empty()).then_some(alias);
                    }
                }
                "use_alias" => {
                    tag.use_alias = parse_bool(value).ok_or_else(|| {
                        invalid(format!("`{value}` is not a boolean for `use_alias`"))
                    })?;
                }
                "update_zero" => {
                    tag.update_zero = parse_bool(value).ok_or_else(|| {
                        invalid(format!("`{value}` is not a boolean for `update_zero`"))
                    })?;
                }
                "ignore" | "-" => tag.ignore = true,
                _ => return Err(invalid(format!("unknown attribute `{key}`")).into()),
            }
        }
        Ok(tag)
    }

    /// Column of a leaf member, before any alias prefix.
    pub fn column_name(&self, member: &str, naming: &dyn NamingStyle) -> String {
        match &self.column {
            Some(column) => column.clone(),
            None => naming.column(member),
        }
    }
}
