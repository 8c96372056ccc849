mod reader;
mod validator;
mod writer;

pub use reader::{SmpReader, SmpResource};
pub use validator::{validate_path, validate_path_with, BasicStyleValidator, StyleValidator, ValidationReport};
pub use writer::SmpWriter;
