// CSV column mapping: canonical fields, header normalisation, mapping
// suggestion, per-row typing and the submission gate.
// Everything here is pure; nothing touches the store.

pub mod fields;
pub mod normalize;
pub mod row;
pub mod suggest;
pub mod validation;

pub use fields::FieldMapping;
pub use row::{map_row, MappedRow, RawRow};
pub use suggest::{suggest_mapping, SynonymTable};
pub use validation::{validate, MappingValidation};
