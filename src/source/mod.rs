//! TypeScript source editing.
//!
//! Files are parsed with tree-sitter to find where things are, then edited
//! as text so that formatting outside the edits is untouched.

pub mod edit;
pub mod imports;
pub mod ng_module;
pub mod parser;

pub use edit::{apply_edits, Edit};
pub use imports::{add_import, is_imported};
pub use ng_module::{find_bootstrap_module, find_module_imports, BootstrapModule, ModuleImports};
pub use parser::SourceFile;
