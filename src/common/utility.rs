use crate::storage::{Row, RowId, Table};
use crate::types::field::Field;
use crate::types::{Column, DataType, Schema};
use rand::{random, Rng};
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

/// Inserts n random rows into the table, returning them with their row ids.
/// Panics on insert failure; intended for test setup against schemas without
/// constraints the generated values could violate.
pub fn create_n_rows(n: usize, table: &mut Table, seed: Option<u64>) -> Vec<(RowId, Row)> {
    let mut local_seed = seed.unwrap_or_else(random);
    (0..n)
        .map(|_| {
            let row = create_random_row(table.schema(), Some(local_seed));
            local_seed += 1; // makes each row different
            let values = row.iter().cloned().map(Some).collect();
            let id = table.insert(values).unwrap();
            (id, row)
        })
        .collect()
}

pub fn create_random_fields(schema: &Schema, seed_in: Option<u64>) -> Vec<Field> {
    let seed = seed_in.unwrap_or_else(random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut fields = Vec::with_capacity(schema.col_count());

    for i in 0..schema.col_count() {
        match schema.get_column(i).get_data_type() {
            DataType::Bool => {
                let b = rng.gen_range(0..2);
                fields.push(Field::from(b == 1));
            }
            DataType::Int => {
                let i_field: i32 = rng.gen_range(0..1000);
                fields.push(Field::from(i_field));
            }
            DataType::Float => {
                let f: f32 = rng.gen_range(0.0..100000.0);
                fields.push(Field::from(f));
            }
            DataType::Text => {
                let size = schema.get_column(i).get_max_size().unwrap_or(32);
                let len = rng.gen_range(0..size);
                let mut s = String::new();
                for _j in 0..len {
                    s.push(rng.gen_range(33..123) as u8 as char); // limiting it to printable chars
                }
                fields.push(Field::from(s));
            }
        }
    }

    fields
}

pub fn create_random_row(schema: &Schema, seed: Option<u64>) -> Row {
    Row::from(create_random_fields(schema, seed))
}

/// Creates a schema of `num_columns` integer columns named `{table_name}{i}`.
pub fn create_table_definition(num_columns: usize, table_name: &str) -> Schema {
    let mut schema = Schema::new(table_name);
    (0..num_columns).for_each(|i| {
        let column_name = format!("{}{}", table_name, i);
        schema.add_column(
            &Column::builder()
                .name(&column_name)
                .data_type(DataType::Int)
                .build(),
        );
    });
    schema
}

/// Creates a schema of `count` columns of the given type. Text columns get a
/// random size bound.
pub fn create_table_definition_by_data_type(count: usize, data_type: DataType) -> Schema {
    let mut schema = Schema::new("test_table");
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let column_name = format!("column{}", i);
        let mut builder = Column::builder().name(&column_name).data_type(data_type);
        if data_type == DataType::Text {
            builder = builder.max_size(rng.gen_range(1..=255));
        }
        schema.add_column(&builder.build());
    }
    schema
}
