pub mod csv_sink;
pub mod postgres_sink;

pub use csv_sink::CsvTableSink;
pub use postgres_sink::PostgresTableSink;
