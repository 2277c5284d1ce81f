pub mod aggregator;
pub mod cleaner;
pub mod extractor;
pub mod frame;
pub mod generator;
pub mod loader;
pub mod pipeline;
pub mod quality;
pub mod report;
pub mod sources;
pub mod spreadsheet;

pub use extractor::Extractor;
pub use generator::{GeneratorSettings, SourceGenerator};
pub use loader::{LoadReport, LoadStatus, Loader};
pub use pipeline::Pipeline;
pub use report::RunReport;
