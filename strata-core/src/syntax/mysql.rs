use crate::Syntax;

/// MySQL dialect, backtick quoted identifiers.
#[derive(Default, Debug, Clone, Copy)]
pub struct MySqlSyntax;

impl Syntax for MySqlSyntax {
    fn as_dyn(&self) -> &dyn Syntax {
        self
    }

    fn where_operators(&self) -> &'static [&'static str] {
        &[
            "=",
            "<",
            ">",
            "<=",
            ">=",
            "<>",
            "!=",
            "<=>",
            "like",
            "like binary",
            "not like",
            "ilike",
            "&",
            "|",
            "^",
            "<<",
            ">>",
            "rlike",
            "regexp",
            "not regexp",
            "~",
            "~*",
            "!~",
            "!~*",
            "similar to",
            "not similar to",
            "not ilike",
            "~~*",
            "!~~*",
        ]
    }

    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('`');
        self.write_escaped(out, value, '`', "``");
        out.push('`');
    }
}
