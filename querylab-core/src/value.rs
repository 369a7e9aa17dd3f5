//! Result tables returned by the mock engine.
//!
//! A [`ResultSet`] stores its column names once and every row as a value
//! vector of the same length, so all rows share the same columns in the same
//! order.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::{PlaygroundError, PlaygroundResult};

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(n) => Some(*n as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Right-align numbers when rendered in a table
    pub fn is_numeric(&self) -> bool {
        matches!(self, Scalar::Int(_) | Scalar::Float(_))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "NULL"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Text(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Scalar::Null => serializer.serialize_none(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(n) => serializer.serialize_i64(*n),
            Scalar::Float(v) => serializer.serialize_f64(*v),
            Scalar::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Int(n as i64)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Scalar::Null)
    }
}

/// An ordered table of rows sharing one column list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<Scalar>>,
}

impl ResultSet {
    /// Build a result set from literal data.
    ///
    /// # Panics
    ///
    /// Panics if any row does not have exactly one value per column. Use
    /// [`ResultSet::try_new`] for data that is not known to be rectangular.
    pub fn new(columns: &[&str], rows: Vec<Vec<Scalar>>) -> Self {
        match Self::try_new(columns.iter().map(|c| c.to_string()).collect(), rows) {
            Ok(set) => set,
            Err(e) => panic!("{}", e),
        }
    }

    /// Build a result set, rejecting rows whose width differs from the column count.
    pub fn try_new(columns: Vec<String>, rows: Vec<Vec<Scalar>>) -> PlaygroundResult<Self> {
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != columns.len())
        {
            return Err(PlaygroundError::ShapeMismatch {
                row,
                expected: columns.len(),
                found: values.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<ResultRow<'_>> {
        self.rows.get(index).map(|values| ResultRow {
            columns: &self.columns,
            values,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = ResultRow<'_>> {
        self.rows.iter().map(move |values| ResultRow {
            columns: &self.columns,
            values,
        })
    }

    /// Values of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&Scalar>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|values| &values[idx]).collect())
    }
}

impl Serialize for ResultSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in self.rows() {
            seq.serialize_element(&row)?;
        }
        seq.end()
    }
}

/// Borrowed view of one row: an ordered column -> value mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultRow<'a> {
    columns: &'a [String],
    values: &'a [Scalar],
}

impl<'a> ResultRow<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Scalar> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }

    pub fn values(&self) -> &'a [Scalar] {
        self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Scalar)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl Serialize for ResultRow<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultSet {
        ResultSet::new(
            &["id", "name", "gpa"],
            vec![
                vec![1.into(), "Alice".into(), 3.8.into()],
                vec![2.into(), "Bob".into(), Scalar::Null],
            ],
        )
    }

    #[test]
    fn test_row_access() {
        let set = sample();
        assert_eq!(set.len(), 2);
        assert_eq!(set.columns(), &["id", "name", "gpa"]);

        let row = set.row(0).unwrap();
        assert_eq!(row.get("name"), Some(&Scalar::Text("Alice".into())));
        assert_eq!(row.get("missing"), None);

        let cols: Vec<&str> = row.iter().map(|(c, _)| c).collect();
        assert_eq!(cols, vec!["id", "name", "gpa"]);
        assert!(set.row(2).is_none());
    }

    #[test]
    fn test_try_new_rejects_ragged_rows() {
        let err = ResultSet::try_new(
            vec!["a".into(), "b".into()],
            vec![vec![1.into(), 2.into()], vec![3.into()]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            PlaygroundError::ShapeMismatch {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    #[should_panic(expected = "Result shape mismatch")]
    fn test_new_panics_on_ragged_literal() {
        ResultSet::new(&["a", "b"], vec![vec![1.into()]]);
    }

    #[test]
    fn test_serialize_keeps_column_order() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"[{"id":1,"name":"Alice","gpa":3.8},{"id":2,"name":"Bob","gpa":null}]"#
        );
    }

    #[test]
    fn test_scalar_display_and_conversions() {
        assert_eq!(Scalar::Null.to_string(), "NULL");
        assert_eq!(Scalar::from(true).to_string(), "true");
        assert_eq!(Scalar::from(None::<i64>), Scalar::Null);
        assert_eq!(Scalar::from(Some("x")), Scalar::Text("x".into()));
        assert_eq!(Scalar::from(7).as_f64(), Some(7.0));
        assert!(Scalar::from(1.5).is_numeric());
        assert!(!Scalar::from("1.5").is_numeric());
    }

    #[test]
    fn test_column_values() {
        let set = sample();
        let names: Vec<String> = set
            .column("name")
            .unwrap()
            .into_iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
        assert!(set.column("nope").is_none());
    }
}
