//! Built-in research tools

pub mod export_json;
pub mod save_file;
pub mod web_search;
pub mod wiki_lookup;

pub use export_json::{ExportJsonTool, ExportJsonToolFactory};
pub use save_file::{SaveFileTool, SaveFileToolFactory};
pub use web_search::{WebSearchTool, WebSearchToolFactory};
pub use wiki_lookup::{WikiLookupTool, WikiLookupToolFactory};
