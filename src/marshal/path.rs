//! Dotted attribute paths (`"college.name"`) resolved against [`Reflect`] records.

use crate::error::{ErrorCause, MarshalError, MarshalResult};
use crate::record::{AttributeMut, AttributeRef, Reflect, ScalarSlot};
use crate::types::Value;

use super::coerce;

/// Read the value at `path`.
///
/// An absent nested record along the path yields [`Value::Null`] rather than an error.
pub fn resolve(path: &str, record: &dyn Reflect) -> MarshalResult<Value> {
    let (head, rest) = split_head(path);
    let attr = record
        .attribute(head)
        .ok_or_else(|| not_found(record.type_name(), head))?;

    match (attr, rest) {
        (AttributeRef::Value(v), None) => Ok(v),
        (AttributeRef::Value(_), Some(rest)) => Err(MarshalError::new(ErrorCause::NotNested {
            type_name: record.type_name(),
            attribute: head.to_string(),
            rest: rest.to_string(),
        })),
        (AttributeRef::Nested(_), None) => Err(MarshalError::new(ErrorCause::NotScalar {
            type_name: record.type_name(),
            attribute: head.to_string(),
        })),
        (AttributeRef::Nested(None), Some(_)) => Ok(Value::Null),
        (AttributeRef::Nested(Some(inner)), Some(rest)) => resolve(rest, inner),
    }
}

/// Coerce `text` to the declared type of the attribute at `path` and store it.
///
/// Nested records along the path must already exist; they are never created here.
pub fn assign(path: &str, record: &mut dyn Reflect, text: &str) -> MarshalResult<()> {
    let (type_name, slot) = locate(path, path, record)?;
    if let Some(value) = coerce::from_text(text, slot.value_type(), slot.is_nullable())? {
        slot.assign(value).map_err(|reason| {
            MarshalError::new(ErrorCause::Rejected {
                type_name,
                raw: text.to_string(),
                reason,
            })
        })?;
    }
    Ok(())
}

/// Find the writable leaf of `path`, with the name of the record type that owns it.
fn locate<'a>(
    full: &str,
    path: &str,
    record: &'a mut dyn Reflect,
) -> MarshalResult<(&'static str, ScalarSlot<'a>)> {
    let type_name = record.type_name();
    let (head, rest) = split_head(path);
    let attr = record
        .attribute_mut(head)
        .ok_or_else(|| not_found(type_name, head))?;

    match (attr, rest) {
        (AttributeMut::Scalar(slot), None) => Ok((type_name, slot)),
        (AttributeMut::Scalar(_), Some(rest)) => Err(MarshalError::new(ErrorCause::NotNested {
            type_name,
            attribute: head.to_string(),
            rest: rest.to_string(),
        })),
        (AttributeMut::Nested(Some(inner)), Some(rest)) => locate(full, rest, inner),
        (AttributeMut::Nested(None), Some(_)) => Err(MarshalError::new(ErrorCause::UnsupportedPath {
            path: full.to_string(),
            type_name,
            attribute: head.to_string(),
        })),
        (AttributeMut::Nested(_), None) => Err(MarshalError::new(ErrorCause::NotScalar {
            type_name,
            attribute: head.to_string(),
        })),
    }
}

fn split_head(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

fn not_found(type_name: &'static str, attribute: &str) -> MarshalError {
    MarshalError::new(ErrorCause::AttributeNotFound {
        type_name,
        attribute: attribute.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use super::*;
    use crate::record::{AttributeTable, Record};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct College {
        name: String,
        rank: i32,
    }

    impl Record for College {
        fn attributes() -> &'static AttributeTable<Self> {
            static TABLE: OnceLock<AttributeTable<College>> = OnceLock::new();
            TABLE.get_or_init(|| {
                AttributeTable::builder("College")
                    .field("name", |c: &College| &c.name, |c: &mut College| &mut c.name)
                    .field("rank", |c: &College| &c.rank, |c: &mut College| &mut c.rank)
                    .build()
            })
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Student {
        id: i64,
        college: Option<College>,
    }

    impl Record for Student {
        fn attributes() -> &'static AttributeTable<Self> {
            static TABLE: OnceLock<AttributeTable<Student>> = OnceLock::new();
            TABLE.get_or_init(|| {
                AttributeTable::builder("Student")
                    .field("id", |s: &Student| &s.id, |s: &mut Student| &mut s.id)
                    .nested(
                        "college",
                        |s: &Student| s.college.as_ref(),
                        |s: &mut Student| s.college.as_mut(),
                    )
                    .default_constructible()
                    .build()
            })
        }
    }

    fn enrolled() -> Student {
        Student {
            id: 7,
            college: Some(College {
                name: "Arts".to_string(),
                rank: 3,
            }),
        }
    }

    #[test]
    fn resolves_single_and_nested_paths() {
        let s = enrolled();
        assert_eq!(resolve("id", &s).unwrap(), Value::Int64(7));
        assert_eq!(resolve("college.name", &s).unwrap(), Value::Text("Arts".to_string()));
    }

    #[test]
    fn absent_intermediate_reads_as_null() {
        let s = Student::default();
        assert_eq!(resolve("college.name", &s).unwrap(), Value::Null);
        assert_eq!(resolve("college.anything", &s).unwrap(), Value::Null);
    }

    #[test]
    fn unknown_attribute_names_type_and_attribute() {
        let s = enrolled();
        let err = resolve("nickname", &s).unwrap_err();
        assert_eq!(err.to_string(), "type Student has no attribute 'nickname'");

        let err = resolve("college.dean", &s).unwrap_err();
        assert_eq!(err.to_string(), "type College has no attribute 'dean'");
    }

    #[test]
    fn descending_into_value_or_reading_record_fails() {
        let s = enrolled();
        let err = resolve("id.x", &s).unwrap_err();
        assert!(err.to_string().contains("is a value"));

        let err = resolve("college", &s).unwrap_err();
        assert!(err.to_string().contains("is a nested record"));
    }

    #[test]
    fn reading_absent_record_itself_fails_like_present_one() {
        let err = resolve("college", &Student::default()).unwrap_err();
        assert!(err.to_string().contains("is a nested record"));
    }

    #[test]
    fn assign_writes_nested_attribute() {
        let mut s = enrolled();
        assign("college.rank", &mut s, "12").unwrap();
        assign("id", &mut s, "99").unwrap();
        assert_eq!(s.college.as_ref().unwrap().rank, 12);
        assert_eq!(s.id, 99);
    }

    #[test]
    fn assign_through_absent_intermediate_is_unsupported() {
        let mut s = Student::default();
        let err = assign("college.name", &mut s, "Arts").unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot assign 'college.name': nested attribute 'college' of type Student is empty"
        );
        assert!(s.college.is_none());
    }

    #[test]
    fn assign_reports_coercion_failure() {
        let mut s = enrolled();
        let err = assign("college.rank", &mut s, "high").unwrap_err();
        assert!(err.to_string().starts_with("invalid numeric value 'high' for i32"));
    }
}
