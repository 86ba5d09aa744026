pub mod html;

pub use html::{write_catalog, ReportWriter};
