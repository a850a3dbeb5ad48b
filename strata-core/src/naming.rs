use crate::{Error, Result};
use convert_case::{Case, Casing};
use std::{str::FromStr, sync::Arc};

/// Turns type and member names into database identifiers.
pub trait NamingStyle: Send + Sync {
    fn table(&self, type_name: &str) -> String;
    fn column(&self, field_name: &str) -> String;
}

/// `UserProfile` -> `user_profile`
#[derive(Default, Debug, Clone, Copy)]
pub struct SnakeCase;

impl NamingStyle for SnakeCase {
    fn table(&self, type_name: &str) -> String {
        type_name.to_case(Case::Snake)
    }
    fn column(&self, field_name: &str) -> String {
        field_name.to_case(Case::Snake)
    }
}

/// `user_profile` -> `UserProfile`
#[derive(Default, Debug, Clone, Copy)]
pub struct PascalCase;

impl NamingStyle for PascalCase {
    fn table(&self, type_name: &str) -> String {
        type_name.to_case(Case::Pascal)
    }
    fn column(&self, field_name: &str) -> String {
        field_name.to_case(Case::Pascal)
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Naming {
    #[default]
    Snake,
    Pascal,
}

impl Naming {
    pub fn style(&self) -> Arc<dyn NamingStyle> {
        match self {
            Naming::Snake => Arc::new(SnakeCase),
            Naming::Pascal => Arc::new(PascalCase),
        }
    }
}

impl FromStr for Naming {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "snake" | "underline" => Ok(Naming::Snake),
            "pascal" | "camel" => Ok(Naming::Pascal),
            _ => Err(Error::msg(format!(
                "Unknown naming style `{s}`, expected `snake` or `pascal`"
            ))),
        }
    }
}
