//! Typed access to DataFrame columns

use crate::{Error, Result};
use polars::prelude::*;

pub(crate) fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| Error::InvalidColumn(name.to_string()))
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::Int16
            | DataType::Int8
            | DataType::UInt64
            | DataType::UInt32
            | DataType::UInt16
            | DataType::UInt8
    )
}

/// Values of a numeric column as `f64`; nulls stay `None`
pub(crate) fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = column(df, name)?;
    let floats = match column.dtype() {
        DataType::Float64 => column.clone(),
        // An all-empty CSV column is read as Null
        dt if is_numeric(dt) || *dt == DataType::Null => column.cast(&DataType::Float64)?,
        dt => {
            return Err(Error::TypeMismatch {
                column: name.to_string(),
                expected: "numeric".to_string(),
                got: format!("{dt:?}"),
            });
        }
    };
    Ok(floats.f64()?.into_iter().collect())
}

/// Values of any column rendered as strings; nulls stay `None`
pub(crate) fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = column(df, name)?;
    let strings = column.cast(&DataType::String)?;
    Ok(strings
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Names of all numeric columns, in frame order
pub(crate) fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| is_numeric(c.dtype()))
        .map(|c| c.name().to_string())
        .collect()
}
