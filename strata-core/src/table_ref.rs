use std::fmt::{self, Display};

/// Table name with its optional alias, empty strings mean absent.
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub name: String,
    pub alias: String,
}

impl TableRef {
    pub fn new(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Name used to qualify columns: the alias when present, the table name otherwise.
    pub fn full_name(&self) -> &str {
        if self.alias.is_empty() {
            &self.name
        } else {
            &self.alias
        }
    }
}

impl Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.alias.is_empty() {
            write!(f, " as {}", self.alias)?;
        }
        Ok(())
    }
}
