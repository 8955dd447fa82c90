pub mod sheet;

pub use sheet::SheetFetcher;
