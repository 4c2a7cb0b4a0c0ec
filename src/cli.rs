use crate::config::GeneratorConfig;
use crate::errors::SchemaError;
use crate::schema::SchemaGenerator;
use crate::source::SourceSchema;
use serde_json::{Value, json};
use std::io::Write;
use std::path::{Path, PathBuf};

pub enum Command {
    Strict { declaration: PathBuf },
    Query { declaration: PathBuf },
    Both { declaration: PathBuf },
    ValidateDocument { declaration: PathBuf, document: PathBuf },
    ValidateFilter { declaration: PathBuf, filter: PathBuf },
}

fn read_json(path: &Path) -> Result<Value, SchemaError> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| SchemaError::Io(format!("{}: {e}", path.display())))?;
    Ok(serde_json::from_str(&s)?)
}

fn print_json(out: &mut dyn Write, v: &Value) -> Result<(), SchemaError> {
    serde_json::to_writer_pretty(&mut *out, v)?;
    writeln!(out)?;
    Ok(())
}

/// Run one command, writing results to `out`.
///
/// # Errors
/// Declaration, I/O and validation failures; `ValidationFailed` means the instance was
/// rejected and carries the violations.
pub fn run(config: GeneratorConfig, cmd: Command, out: &mut dyn Write) -> Result<(), SchemaError> {
    let generator = SchemaGenerator::new(config);
    match cmd {
        Command::Strict { declaration } => {
            let schemas = generator.generate(&SourceSchema::load(&declaration)?)?;
            print_json(out, &schemas.strict_value())
        }
        Command::Query { declaration } => {
            let schemas = generator.generate(&SourceSchema::load(&declaration)?)?;
            print_json(out, &schemas.query_value())
        }
        Command::Both { declaration } => {
            let schemas = generator.generate(&SourceSchema::load(&declaration)?)?;
            print_json(out, &json!({ "strict": schemas.strict_value(), "query": schemas.query_value() }))
        }
        Command::ValidateDocument { declaration, document } => {
            let schemas = generator.generate(&SourceSchema::load(&declaration)?)?;
            schemas.validate_document(&read_json(&document)?)?;
            writeln!(out, "valid document={}", document.display())?;
            Ok(())
        }
        Command::ValidateFilter { declaration, filter } => {
            let schemas = generator.generate(&SourceSchema::load(&declaration)?)?;
            schemas.validate_filter(&read_json(&filter)?)?;
            writeln!(out, "valid filter={}", filter.display())?;
            Ok(())
        }
    }
}
