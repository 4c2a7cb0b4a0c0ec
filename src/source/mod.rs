// Declarations go in through parse, come out as the typed schema in types.
mod parse;
mod types;

pub use parse::{FieldDeclSerde, IndexDeclSerde, NestedDeclSerde, SchemaDeclSerde, TypeDeclSerde};
pub use types::{
    BaseType, FieldDecl, FieldKind, FieldOptions, IndexDecl, IndexDirection, IndexOptions,
    IndexSelector, SourceSchema,
};
