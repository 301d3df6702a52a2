//! Enum detection.

use crate::model::ParsedClass;
use crate::types::translate_type;

/// A class is rendered as an enum when it is nothing but numeric data:
/// at least one data field, every one translating to `number`, and no
/// methods, index signatures or parents.
///
/// Purely numeric data tables that are not conceptually enums are caught
/// too; that is accepted.
pub fn is_enum_like(class: &ParsedClass) -> bool {
    !class.data_fields.is_empty()
        && class.fields.is_empty()
        && class.index_signatures.is_empty()
        && class.parents.is_empty()
        && class
            .data_fields
            .iter()
            .all(|f| translate_type(&f.type_expression) == "number")
}
