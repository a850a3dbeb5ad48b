use crate::{
    Access, AccessMut, Field, FieldKind, Mapped, NamingStyle, Result, StrataError, Syntax,
    TableRef, Tag, Value, split_alias,
};
use indexmap::IndexMap;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Select,
    Insert,
    Update,
}

/// One leaf member resolved to its column.
#[derive(Debug, Clone)]
pub struct MappedField {
    /// Column name, prefixed with the table alias when it applies.
    pub column: String,
    pub kind: FieldKind,
    pub tag: Tag,
    /// Value of the member when it was parsed.
    pub value: Value,
    pub zero: bool,
    /// Scan target, a typed empty value until a row is scanned into it.
    pub buffer: Value,
    scanned: bool,
    /// Member indexes leading from the root object to this member.
    path: Vec<usize>,
}

impl MappedField {
    fn insert_value(&self) -> Value {
        match self.kind {
            FieldKind::Null => Value::Null,
            FieldKind::Time | FieldKind::Codec if self.zero && !self.tag.update_zero => {
                Value::Null
            }
            _ => self.value.clone(),
        }
    }

    fn update_value(&self) -> Option<Value> {
        if self.zero && !self.tag.update_zero {
            return None;
        }
        Some(match self.kind {
            FieldKind::Null => Value::Null,
            _ => self.value.clone(),
        })
    }
}

/// Resolves the table, the columns and the values of one mapped object.
///
/// The table is discovered first: the explicit table, then the one declared by the type,
/// then the one derived from the type name and finally the first extension member.
/// The members are walked afterwards with the alias of their table.
pub struct Mapper<'a> {
    syntax: &'a dyn Syntax,
    naming: &'a dyn NamingStyle,
    join_map: Option<&'a HashMap<String, String>>,
    table: TableRef,
    table_set: bool,
    primary_key: String,
    mode: ParseMode,
    fields: IndexMap<String, MappedField>,
}

impl<'a> Mapper<'a> {
    pub fn new(syntax: &'a dyn Syntax, naming: &'a dyn NamingStyle) -> Self {
        Self {
            syntax,
            naming,
            join_map: None,
            table: TableRef::default(),
            table_set: false,
            primary_key: "id".into(),
            mode: ParseMode::Select,
            fields: IndexMap::new(),
        }
    }

    /// Overrides the table of the object, an empty table is ignored.
    pub fn set_table(&mut self, table: TableRef) {
        if !table.is_empty() {
            self.table = table;
            self.table_set = true;
        }
    }

    /// Aliases of the joined tables, used by extension members without an explicit alias.
    pub fn set_join_map(&mut self, join_map: &'a HashMap<String, String>) {
        self.join_map = Some(join_map);
    }

    pub fn parse(&mut self, object: &dyn Mapped, mode: ParseMode) -> Result<()> {
        if object.members().is_empty() {
            return Err(StrataError::ObjectNoFields.into());
        }
        self.mode = mode;
        self.fields.clear();
        if !self.table_set {
            self.table = self.resolve_table(object)?;
        }
        self.primary_key = object.primary_key().to_string();
        let alias = if mode == ParseMode::Insert {
            String::new()
        } else {
            self.table.alias.clone()
        };
        self.walk(object, &alias, &mut Vec::new())
    }

    /// Parses for a select, absent optional members are filled first so every column has a target.
    pub fn parse_select(&mut self, object: &mut dyn Mapped) -> Result<()> {
        allocate(object)?;
        self.parse(object, ParseMode::Select)
    }

    fn resolve_table(&self, object: &dyn Mapped) -> Result<TableRef> {
        let declared = object.table();
        if !declared.is_empty() {
            return Ok(self.syntax.parse_table(declared));
        }
        let name = object.type_name();
        if !name.is_empty() {
            return Ok(TableRef::new(self.naming.table(name), ""));
        }
        Ok(self.first_extension(object)?.unwrap_or_default())
    }

    /// Table of the first extension member, depth first.
    fn first_extension(&self, object: &dyn Mapped) -> Result<Option<TableRef>> {
        for member in object.members() {
            let tag = Tag::parse(member.tag)?;
            if tag.ignore {
                continue;
            }
            let Access::Field(field) = member.access else {
                continue;
            };
            if field.kind() != FieldKind::Nested {
                continue;
            }
            let nested = field.as_mapped();
            if tag.extend {
                return Ok(Some(self.extension_table(member.name, &tag, nested)));
            }
            if let Some(nested) = nested {
                if let Some(table) = self.first_extension(nested)? {
                    return Ok(Some(table));
                }
            }
        }
        Ok(None)
    }

    fn lookup_alias(&self, table: &str) -> String {
        match self.join_map {
            Some(join_map) => join_map.get(table).cloned().unwrap_or_default(),
            None => table.to_string(),
        }
    }

    /// Table and alias of an extension member: from its tag, from the table declared by
    /// its type, or derived from the member name.
    fn extension_table(&self, member: &str, tag: &Tag, nested: Option<&dyn Mapped>) -> TableRef {
        if let Some(table) = &tag.extend_table {
            let alias = match &tag.extend_alias {
                Some(alias) => alias.clone(),
                None => self.lookup_alias(table),
            };
            return TableRef::new(table.clone(), alias);
        }
        let declared = nested.map(|v| v.table()).unwrap_or_default();
        if !declared.is_empty() {
            let mut table = self.syntax.parse_table(declared);
            if table.alias.is_empty() {
                table.alias = self.lookup_alias(&table.name);
            }
            return table;
        }
        let name = self.naming.table(member);
        let alias = self.lookup_alias(&name);
        TableRef::new(name, alias)
    }

    fn walk(&mut self, object: &dyn Mapped, alias: &str, path: &mut Vec<usize>) -> Result<()> {
        for (i, member) in object.members().into_iter().enumerate() {
            let tag = Tag::parse(member.tag)?;
            if tag.ignore {
                continue;
            }
            let field = match member.access {
                Access::Field(field) => field,
                Access::Unsupported(kind) => {
                    return Err(kind.into_error(member.name).into());
                }
            };
            path.push(i);
            if field.kind() == FieldKind::Nested {
                match field.as_mapped() {
                    Some(nested) => {
                        let nested_alias = if tag.extend {
                            self.extension_table(member.name, &tag, Some(nested)).alias
                        } else {
                            alias.to_string()
                        };
                        self.walk(nested, &nested_alias, path)?;
                    }
                    None if self.mode == ParseMode::Select => {
                        return Err(StrataError::NullFieldUnassignable {
                            field: member.name.into(),
                        }
                        .into());
                    }
                    None => {}
                }
            } else {
                if field.is_null() && self.mode == ParseMode::Select {
                    return Err(StrataError::NullFieldUnassignable {
                        field: member.name.into(),
                    }
                    .into());
                }
                let mut column = tag.column_name(member.name, self.naming);
                if tag.use_alias && !alias.is_empty() {
                    column = format!("{alias}.{column}");
                }
                self.fields.insert(
                    column.clone(),
                    MappedField {
                        column,
                        kind: field.kind(),
                        value: field.to_value(),
                        zero: field.is_zero(),
                        buffer: field.scan_buffer(),
                        scanned: false,
                        path: path.clone(),
                        tag,
                    },
                );
            }
            path.pop();
        }
        Ok(())
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn alias(&self) -> &str {
        &self.table.alias
    }

    /// Primary key column, qualified with the table alias when there is one.
    pub fn primary_key(&self) -> String {
        if self.table.alias.is_empty() {
            self.primary_key.clone()
        } else {
            format!("{}.{}", self.table.alias, self.primary_key)
        }
    }

    /// Columns in member declaration order.
    pub fn columns(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    pub fn fields(&self) -> impl Iterator<Item = &MappedField> {
        self.fields.values()
    }

    pub fn field(&self, column: &str) -> Option<&MappedField> {
        self.fields.get(column)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Every column with its scan target.
    pub fn get_column_and_address(&mut self) -> (Vec<String>, Vec<&mut Value>) {
        let columns = self.columns();
        let addresses = self
            .fields
            .values_mut()
            .map(|v| {
                v.scanned = true;
                &mut v.buffer
            })
            .collect();
        (columns, addresses)
    }

    /// Scan targets of the requested columns, `None` when a column is not mapped.
    /// A column written as `name as alias` is looked up by `name`.
    pub fn get_address_by_column(&mut self, columns: &[String]) -> Vec<Option<&mut Value>> {
        let indexes = columns
            .iter()
            .map(|column| {
                let (column, _) = split_alias(column);
                self.fields.get_index_of(&column)
            })
            .collect::<Vec<_>>();
        let mut fields = self.fields.values_mut().map(Some).collect::<Vec<_>>();
        indexes
            .into_iter()
            .map(|index| {
                let field = fields.get_mut(index?)?.take()?;
                field.scanned = true;
                Some(&mut field.buffer)
            })
            .collect()
    }

    pub fn get_insert_column_and_values(&self) -> (Vec<String>, Vec<Value>) {
        self.fields
            .values()
            .map(|v| (v.column.clone(), v.insert_value()))
            .unzip()
    }

    /// Like [`Mapper::get_insert_column_and_values`], zero members are left out unless
    /// their tag asks for `update_zero`.
    pub fn get_update_column_and_values(&self) -> (Vec<String>, Vec<Value>) {
        self.fields
            .values()
            .filter_map(|v| Some((v.column.clone(), v.update_value()?)))
            .unzip()
    }

    /// Insert values of `columns`, `NULL` for a column this object doesn't map.
    pub fn get_values_by_columns(&self, columns: &[String]) -> Vec<Value> {
        columns
            .iter()
            .map(|c| {
                self.fields
                    .get(c)
                    .map(MappedField::insert_value)
                    .unwrap_or(Value::Null)
            })
            .collect()
    }

    /// Copies every scanned buffer into the matching member of `object`.
    pub fn assign_address_value(&self, object: &mut dyn Mapped) -> Result<()> {
        for field in self.fields.values().filter(|v| v.scanned) {
            let Some(target) = member_at(object, &field.path) else {
                return Err(StrataError::NullFieldUnassignable {
                    field: field.column.clone(),
                }
                .into());
            };
            target.assign(field.buffer.clone()).map_err(|e| {
                e.context(format!("While assigning the column `{}`", field.column))
            })?;
        }
        Ok(())
    }
}

fn member_at<'o>(object: &'o mut dyn Mapped, path: &[usize]) -> Option<&'o mut dyn Field> {
    let (first, rest) = path.split_first()?;
    let member = object.members_mut().into_iter().nth(*first)?;
    let AccessMut::Field(field) = member.access else {
        return None;
    };
    if rest.is_empty() {
        Some(field)
    } else {
        member_at(field.as_mapped_mut()?, rest)
    }
}

/// Fills absent optional members, recursively, failing on the first one that can't be filled.
pub fn allocate(object: &mut dyn Mapped) -> Result<()> {
    for member in object.members_mut() {
        if Tag::parse(member.tag)?.ignore {
            continue;
        }
        let AccessMut::Field(field) = member.access else {
            continue;
        };
        if !field.allocate() {
            return Err(StrataError::NullFieldUnassignable {
                field: member.name.into(),
            }
            .into());
        }
        if let Some(nested) = field.as_mapped_mut() {
            allocate(nested)?;
        }
    }
    Ok(())
}
