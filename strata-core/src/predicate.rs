use crate::{Builder, Value};
use std::fmt::{self, Display};

/// Connective written before a predicate.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Logic::And => "and",
            Logic::Or => "or",
        })
    }
}

#[derive(Clone)]
pub enum Predicate {
    /// `column operator ?`
    Basic {
        logic: Logic,
        column: String,
        operator: String,
        value: Value,
    },
    /// `column [not] in (?,?,..)`, `values` is a list.
    In {
        logic: Logic,
        column: String,
        values: Value,
        not: bool,
    },
    /// `column [not] between ? and ?`
    Between {
        logic: Logic,
        column: String,
        not: bool,
    },
    /// `column is [not] null`
    Null {
        logic: Logic,
        column: String,
        not: bool,
    },
    /// `column operator (select ..)`
    Sub {
        logic: Logic,
        column: String,
        operator: String,
        builder: Box<Builder>,
    },
}

impl Predicate {
    pub fn logic(&self) -> Logic {
        match self {
            Predicate::Basic { logic, .. }
            | Predicate::In { logic, .. }
            | Predicate::Between { logic, .. }
            | Predicate::Null { logic, .. }
            | Predicate::Sub { logic, .. } => *logic,
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Predicate::Basic { column, .. }
            | Predicate::In { column, .. }
            | Predicate::Between { column, .. }
            | Predicate::Null { column, .. }
            | Predicate::Sub { column, .. } => column,
        }
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Anything but `desc` (in any case) sorts ascending.
    pub fn parse(value: &str) -> Direction {
        if value.trim().eq_ignore_ascii_case("desc") {
            Direction::Desc
        } else {
            Direction::Asc
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        })
    }
}
