#![allow(dead_code)]

use std::str::FromStr;
use std::sync::OnceLock;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use tabular_marshal::record::{AttributeTable, Record};
use tabular_marshal::types::FieldMap;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Student {
    pub id: i32,
    pub name: String,
    pub score: i32,
}

impl Student {
    pub fn new(id: i32, name: &str, score: i32) -> Self {
        Self {
            id,
            name: name.to_string(),
            score,
        }
    }
}

impl Record for Student {
    fn attributes() -> &'static AttributeTable<Self> {
        static TABLE: OnceLock<AttributeTable<Student>> = OnceLock::new();
        TABLE.get_or_init(|| {
            AttributeTable::builder("Student")
                .field("id", |s: &Student| &s.id, |s: &mut Student| &mut s.id)
                .field("name", |s: &Student| &s.name, |s: &mut Student| &mut s.name)
                .field("score", |s: &Student| &s.score, |s: &mut Student| &mut s.score)
                .default_constructible()
                .build()
        })
    }
}

pub fn student_map() -> FieldMap {
    FieldMap::from_pairs([("id", "ID"), ("name", "Name"), ("score", "Score")]).unwrap()
}

pub fn tom_and_hanks() -> Vec<Student> {
    vec![Student::new(1, "Tom", 78), Student::new(2, "Hanks", 56)]
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct College {
    pub name: String,
    pub city: String,
}

impl Record for College {
    fn attributes() -> &'static AttributeTable<Self> {
        static TABLE: OnceLock<AttributeTable<College>> = OnceLock::new();
        TABLE.get_or_init(|| {
            AttributeTable::builder("College")
                .field("name", |c: &College| &c.name, |c: &mut College| &mut c.name)
                .field("city", |c: &College| &c.city, |c: &mut College| &mut c.city)
                .default_constructible()
                .build()
        })
    }
}

/// A student with an optional college. New instances already hold an empty college so nested
/// columns can be imported.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub student_id: i64,
    pub college: Option<College>,
}

impl Default for Enrollment {
    fn default() -> Self {
        Self {
            student_id: 0,
            college: Some(College::default()),
        }
    }
}

impl Record for Enrollment {
    fn attributes() -> &'static AttributeTable<Self> {
        static TABLE: OnceLock<AttributeTable<Enrollment>> = OnceLock::new();
        TABLE.get_or_init(|| {
            AttributeTable::builder("Enrollment")
                .field(
                    "student_id",
                    |e: &Enrollment| &e.student_id,
                    |e: &mut Enrollment| &mut e.student_id,
                )
                .nested(
                    "college",
                    |e: &Enrollment| e.college.as_ref(),
                    |e: &mut Enrollment| e.college.as_mut(),
                )
                .default_constructible()
                .build()
        })
    }
}

pub fn enrollment_map() -> FieldMap {
    FieldMap::from_pairs([
        ("student_id", "Student"),
        ("college.name", "College"),
        ("college.city", "City"),
    ])
    .unwrap()
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: Option<i32>,
}

impl Record for Person {
    fn attributes() -> &'static AttributeTable<Self> {
        static TABLE: OnceLock<AttributeTable<Person>> = OnceLock::new();
        TABLE.get_or_init(|| {
            AttributeTable::builder("Person")
                .field("name", |p: &Person| &p.name, |p: &mut Person| &mut p.name)
                .field("age", |p: &Person| &p.age, |p: &mut Person| &mut p.age)
                .default_constructible()
                .build()
        })
    }
}

/// Inherits `name` and `age` from [`Person`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Employee {
    pub person: Person,
    pub department: String,
}

impl Record for Employee {
    fn attributes() -> &'static AttributeTable<Self> {
        static TABLE: OnceLock<AttributeTable<Employee>> = OnceLock::new();
        TABLE.get_or_init(|| {
            AttributeTable::builder("Employee")
                .extends(|e: &Employee| &e.person, |e: &mut Employee| &mut e.person)
                .field(
                    "department",
                    |e: &Employee| &e.department,
                    |e: &mut Employee| &mut e.department,
                )
                .default_constructible()
                .build()
        })
    }
}

/// One attribute of every supported value type.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Measurement {
    pub label: String,
    pub small: i16,
    pub medium: i32,
    pub large: i64,
    pub ratio: f32,
    pub precise: f64,
    pub grade: char,
    pub amount: BigDecimal,
    pub taken_at: NaiveDateTime,
    pub note: Option<String>,
    pub retries: Option<i32>,
}

impl Record for Measurement {
    fn attributes() -> &'static AttributeTable<Self> {
        static TABLE: OnceLock<AttributeTable<Measurement>> = OnceLock::new();
        TABLE.get_or_init(|| {
            AttributeTable::builder("Measurement")
                .field("label", |m: &Measurement| &m.label, |m: &mut Measurement| &mut m.label)
                .field("small", |m: &Measurement| &m.small, |m: &mut Measurement| &mut m.small)
                .field("medium", |m: &Measurement| &m.medium, |m: &mut Measurement| &mut m.medium)
                .field("large", |m: &Measurement| &m.large, |m: &mut Measurement| &mut m.large)
                .field("ratio", |m: &Measurement| &m.ratio, |m: &mut Measurement| &mut m.ratio)
                .field("precise", |m: &Measurement| &m.precise, |m: &mut Measurement| &mut m.precise)
                .field("grade", |m: &Measurement| &m.grade, |m: &mut Measurement| &mut m.grade)
                .field("amount", |m: &Measurement| &m.amount, |m: &mut Measurement| &mut m.amount)
                .field("taken_at", |m: &Measurement| &m.taken_at, |m: &mut Measurement| &mut m.taken_at)
                .field("note", |m: &Measurement| &m.note, |m: &mut Measurement| &mut m.note)
                .field("retries", |m: &Measurement| &m.retries, |m: &mut Measurement| &mut m.retries)
                .default_constructible()
                .build()
        })
    }
}

pub fn measurement_map() -> FieldMap {
    FieldMap::from_pairs([
        ("label", "Label"),
        ("small", "Small"),
        ("medium", "Medium"),
        ("large", "Large"),
        ("ratio", "Ratio"),
        ("precise", "Precise"),
        ("grade", "Grade"),
        ("amount", "Amount"),
        ("taken_at", "Taken At"),
        ("note", "Note"),
        ("retries", "Retries"),
    ])
    .unwrap()
}

pub fn measurements() -> Vec<Measurement> {
    let at = |d: u32, h: u32, m: u32| {
        NaiveDate::from_ymd_opt(2015, 6, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    };
    vec![
        Measurement {
            label: "north gauge".to_string(),
            small: -12,
            medium: 70_000,
            large: 9_000_000_000,
            ratio: 0.1,
            precise: 98.765_432_1,
            grade: 'A',
            amount: BigDecimal::from_str("12345678901234567890.000000001").unwrap(),
            taken_at: at(24, 18, 30),
            note: Some("calibrated".to_string()),
            retries: Some(3),
        },
        Measurement {
            label: "south gauge".to_string(),
            small: i16::MAX,
            medium: -1,
            large: 0,
            ratio: 1e-7,
            precise: -0.5,
            grade: 'z',
            amount: BigDecimal::from_str("-0.25").unwrap(),
            taken_at: at(1, 0, 5),
            note: None,
            retries: None,
        },
    ]
}

/// A record type without a registered constructor: it can be exported but not imported.
#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub code: String,
}

impl Record for Badge {
    fn attributes() -> &'static AttributeTable<Self> {
        static TABLE: OnceLock<AttributeTable<Badge>> = OnceLock::new();
        TABLE.get_or_init(|| {
            AttributeTable::builder("Badge")
                .field("code", |b: &Badge| &b.code, |b: &mut Badge| &mut b.code)
                .build()
        })
    }
}
