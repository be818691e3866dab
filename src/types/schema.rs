use crate::common::constants::{MAX_INT_DIGITS, MAX_STRING_LENGTH};
use crate::common::{ConstraintViolation, Result};
use crate::errschema;
use crate::types::field::Field;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The closed set of column types.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Copy, Serialize, Deserialize)]
pub enum DataType {
    Bool,
    Int,
    Float,
    Text,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Bool => write!(f, "bool"),
            DataType::Int => write!(f, "int"),
            DataType::Float => write!(f, "float"),
            DataType::Text => write!(f, "varchar"),
        }
    }
}

#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct Column {
    /// Column name. Can't be empty, and must be unique within a table.
    name: String,
    /// Column datatype.
    data_type: DataType,
    /// Whether the column allows null values.
    nullable: bool,
    /// The column's default value. If None, the user must specify an explicit
    /// value. Must match the column datatype. Nullable columns get an implicit
    /// Null default, and Null is only a valid default when nullable.
    default: Option<Field>,
    /// An optional size bound: maximum length in chars for varchar columns,
    /// maximum decimal-digit width for int columns.
    max_size: Option<u16>,
    /// Whether the table generates this column's value from its row counter.
    /// Only valid for non-nullable int columns without a default.
    auto_increment: bool,
}

impl Column {
    pub fn new(
        column_name: &str,
        dt: DataType,
        nullable: bool,
        default: Option<Field>,
        max_size: Option<u16>,
    ) -> Column {
        Column {
            name: column_name.to_string(),
            data_type: dt,
            nullable,
            default: match default {
                Some(field) => Some(field),
                None if nullable => Some(Field::Null),
                None => None,
            },
            max_size,
            auto_increment: false,
        }
    }

    pub fn builder() -> ColumnBuilder {
        ColumnBuilder::new()
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    pub fn get_data_type(&self) -> DataType {
        self.data_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default(&self) -> Option<&Field> {
        self.default.as_ref()
    }

    pub fn get_max_size(&self) -> Option<u16> {
        self.max_size
    }

    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }

    pub fn to_string(&self) -> String {
        let base = format!("{}:{}", self.name, self.data_type);
        match self.max_size {
            Some(size) => format!("{}({})", base, size),
            None => base,
        }
    }

    /// Validates a value against this column's type, size, and nullability
    /// constraints. The violated rule is identified in the error.
    pub fn validate(&self, value: &Field) -> Result<()> {
        let Some(value_type) = value.get_type() else {
            // A null value; acceptable exactly when the column is nullable.
            if self.nullable {
                return Ok(());
            }
            return ConstraintViolation::NotNull {
                column: self.name.clone(),
            }
            .into();
        };

        if value_type != self.data_type {
            return ConstraintViolation::TypeMismatch {
                column: self.name.clone(),
                expected: self.data_type,
                actual: value_type,
            }
            .into();
        }

        if let Some(max_size) = self.max_size {
            let actual = match value {
                Field::String(s) => s.chars().count() as u16,
                Field::Integer(i) => i.unsigned_abs().to_string().len() as u16,
                _ => 0,
            };
            if actual > max_size {
                return ConstraintViolation::SizeExceeded {
                    column: self.name.clone(),
                    max_size,
                    actual,
                }
                .into();
            }
        }
        Ok(())
    }

    /// Validates the column definition itself.
    fn validate_definition(&self) -> Result<()> {
        if self.name.is_empty() {
            return errschema!("column name can't be empty");
        }
        if let Some(default) = &self.default {
            match default.get_type() {
                None if !self.nullable => {
                    return errschema!(
                        "NULL default on non-nullable column {}",
                        self.name
                    )
                }
                Some(dt) if dt != self.data_type => {
                    return errschema!(
                        "default value {default} does not match type {} of column {}",
                        self.data_type,
                        self.name
                    )
                }
                _ => {}
            }
        }
        if self.auto_increment {
            if self.data_type != DataType::Int {
                return errschema!(
                    "auto-increment column {} must be an int, not {}",
                    self.name,
                    self.data_type
                );
            }
            if self.nullable {
                return errschema!("auto-increment column {} can't be nullable", self.name);
            }
            if self.default.is_some() {
                return errschema!("auto-increment column {} can't have a default", self.name);
            }
        }
        match (self.max_size, self.data_type) {
            (Some(0), _) => return errschema!("size bound of column {} must be positive", self.name),
            (Some(size), DataType::Text) if size > MAX_STRING_LENGTH => {
                return errschema!(
                    "size bound {size} of column {} exceeds maximum {MAX_STRING_LENGTH}",
                    self.name
                )
            }
            (Some(size), DataType::Int) if size > MAX_INT_DIGITS => {
                return errschema!(
                    "digit bound {size} of column {} exceeds maximum {MAX_INT_DIGITS}",
                    self.name
                )
            }
            (Some(_), DataType::Bool | DataType::Float) => {
                return errschema!(
                    "column {} of type {} can't have a size bound",
                    self.name,
                    self.data_type
                )
            }
            _ => {}
        }
        Ok(())
    }
}

pub struct ColumnBuilder {
    name: Option<String>,
    data_type: Option<DataType>,
    nullable: Option<bool>,
    default: Option<Field>,
    max_size: Option<u16>,
    auto_increment: bool,
}

impl ColumnBuilder {
    fn new() -> Self {
        Self {
            name: None,
            data_type: None,
            nullable: None,
            default: None,
            max_size: None,
            auto_increment: false,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn default(mut self, default: Field) -> Self {
        self.default = Some(default);
        self
    }

    pub fn max_size(mut self, max_size: u16) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn build(self) -> Column {
        let nullable = self.nullable.unwrap_or(false);
        Column {
            name: self.name.expect("name must be specified before building."),
            data_type: self
                .data_type
                .expect("data_type must be specified before building."),
            nullable,
            default: match self.default {
                Some(field) => Some(field),
                None if nullable && !self.auto_increment => Some(Field::Null),
                None => None,
            },
            max_size: self.max_size,
            auto_increment: self.auto_increment,
        }
    }
}

/// A table schema: the table name and its ordered column definitions. The
/// column order is the canonical row order. Carries a name→index lookup
/// built once, so value resolution and scope binding don't rescan columns.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct Schema {
    /// The name of the table.
    name: String,
    /// The column definitions of the table, in canonical order.
    columns: Vec<Column>,
    /// Column name → position in `columns`.
    column_index: HashMap<String, usize>,
}

impl Schema {
    pub fn new(table_name: &str) -> Schema {
        Schema {
            name: table_name.to_string(),
            columns: Vec::new(),
            column_index: HashMap::new(),
        }
    }

    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_column(&mut self, column: &Column) {
        self.column_index
            .insert(column.get_name(), self.columns.len());
        self.columns.push(column.clone());
    }

    pub fn columns(&self) -> &Vec<Column> {
        &self.columns
    }

    pub fn get_column(&self, index: usize) -> &Column {
        &self.columns[index]
    }

    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    pub fn get_column_name(&self, index: usize) -> String {
        self.columns[index].get_name()
    }

    /// If a column exists, returns its position in the schema.
    pub fn column_position(&self, column_name: &str) -> Option<usize> {
        self.column_index.get(column_name).copied()
    }

    /// The position of the auto-increment column, if the table has one.
    pub fn auto_increment_position(&self) -> Option<usize> {
        self.columns.iter().position(|c| c.is_auto_increment())
    }

    pub fn to_string(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", self.name, columns)
    }

    /// Validates the whole table definition. Called by the database on table
    /// creation; a schema that fails here never reaches the row store.
    pub fn validate_definition(&self) -> Result<()> {
        if self.name.is_empty() {
            return errschema!("table name can't be empty");
        }
        if self.columns.is_empty() {
            return errschema!("table {} must have at least one column", self.name);
        }
        for (i, column) in self.columns.iter().enumerate() {
            column.validate_definition()?;
            if self.column_index.get(&column.get_name()) != Some(&i) {
                return errschema!(
                    "duplicate column {} in table {}",
                    column.get_name(),
                    self.name
                );
            }
        }
        if self.columns.iter().filter(|c| c.is_auto_increment()).count() > 1 {
            return errschema!(
                "table {} can have at most one auto-increment column",
                self.name
            );
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct SchemaBuilder {
    name: Option<String>,
    columns: Vec<Column>,
}

impl SchemaBuilder {
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn column(
        mut self,
        column_name: &str,
        dt: DataType,
        nullable: bool,
        default: Option<Field>,
        max_size: Option<u16>,
    ) -> Self {
        self.columns
            .push(Column::new(column_name, dt, nullable, default, max_size));
        self
    }

    pub fn column_from_definition(mut self, column_definition: Column) -> Self {
        self.columns.push(column_definition);
        self
    }

    pub fn build(self) -> Schema {
        let name = self.name.expect("Cannot build a Schema without a `name`.");
        let mut schema = Schema::new(&name);
        self.columns
            .iter()
            .for_each(|column| schema.add_column(column));
        schema
    }
}
