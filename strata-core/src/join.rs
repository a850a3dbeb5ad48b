use crate::{Builder, Logic, TableRef};
use std::{
    fmt::{self, Display},
    ops::{Deref, DerefMut},
};

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
}

impl Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JoinType::Inner => "inner join",
            JoinType::Left => "left join",
            JoinType::Right => "right join",
        })
    }
}

/// `first operator second` between two columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinCondition {
    pub logic: Logic,
    pub first: String,
    pub operator: String,
    pub second: String,
}

/// One joined table: its conditions plus join local where predicates, reachable through `Deref`.
#[derive(Clone)]
pub struct Join {
    pub join: JoinType,
    pub table: TableRef,
    pub conditions: Vec<JoinCondition>,
    builder: Builder,
}

impl Join {
    pub(crate) fn new(join: JoinType, table: TableRef, builder: Builder) -> Self {
        Self {
            join,
            table,
            conditions: Vec::new(),
            builder,
        }
    }

    pub fn on(&mut self, first: &str, operator: &str, second: &str) -> &mut Self {
        self.condition(Logic::And, first, operator, second)
    }

    pub fn or_on(&mut self, first: &str, operator: &str, second: &str) -> &mut Self {
        self.condition(Logic::Or, first, operator, second)
    }

    fn condition(&mut self, logic: Logic, first: &str, operator: &str, second: &str) -> &mut Self {
        self.conditions.push(JoinCondition {
            logic,
            first: first.into(),
            operator: if operator.is_empty() { "=" } else { operator }.into(),
            second: second.into(),
        });
        self
    }

    pub fn builder(&self) -> &Builder {
        &self.builder
    }
}

impl Deref for Join {
    type Target = Builder;

    fn deref(&self) -> &Self::Target {
        &self.builder
    }
}

impl DerefMut for Join {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.builder
    }
}
