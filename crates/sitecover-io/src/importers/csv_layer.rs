//! CSV point layers.
//!
//! ```csv
//! id,x,y,weight
//! W01001234,318250.0,176420.5,1532
//! ```
//!
//! Demand: `id,x,y[,weight]`. Candidates: `x,y[,label]`. Supply: `x,y`.
//! Coordinates are in the layer CRS (EPSG:27700 unless overridden).

use super::{LayerOptions, DEFAULT_DEMAND_ID_FIELD, DEFAULT_WEIGHT_FIELD};
use crate::error::ImportError;
use csv::{ReaderBuilder, StringRecord};
use sitecover_core::{
    CandidateSet, Crs, DemandSet, DemandUnit, Point, SiteCoverError, SiteCoverResult, SupplySet,
};
use std::io::Read;

struct Table {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl Table {
    fn read<R: Read>(reader: R) -> SiteCoverResult<Self> {
        let mut reader = ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = reader
            .headers()
            .map_err(|e| SiteCoverError::Parse(e.to_string()))?
            .clone();
        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SiteCoverError::Parse(e.to_string()))?;
        Ok(Self { headers, rows })
    }

    /// Index of the first of `names` present in the header (case-insensitive).
    fn column(&self, names: &[&str]) -> Option<usize> {
        names.iter().find_map(|name| {
            self.headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
        })
    }

    fn require(&self, name: &str) -> SiteCoverResult<usize> {
        self.column(&[name])
            .ok_or_else(|| ImportError::MissingColumn(name.to_string()).into())
    }

    fn xy(&self) -> SiteCoverResult<(usize, usize)> {
        Ok((self.require("x")?, self.require("y")?))
    }
}

fn field<'r>(record: &'r StringRecord, col: usize, row: usize) -> SiteCoverResult<&'r str> {
    record.get(col).ok_or_else(|| {
        ImportError::BadRow {
            row,
            message: format!("missing field {}", col + 1),
        }
        .into()
    })
}

fn number(record: &StringRecord, col: usize, row: usize, name: &str) -> SiteCoverResult<f64> {
    let raw = field(record, col, row)?;
    raw.parse::<f64>().map_err(|_| {
        ImportError::BadRow {
            row,
            message: format!("{name} '{raw}' is not a number"),
        }
        .into()
    })
}

fn point(record: &StringRecord, (x, y): (usize, usize), row: usize) -> SiteCoverResult<Point> {
    Ok(Point::new(
        number(record, x, row, "x")?,
        number(record, y, row, "y")?,
    ))
}

fn layer_crs(options: &LayerOptions) -> SiteCoverResult<Crs> {
    options.resolve_crs(None, Crs::default_planar())
}

pub fn read_demand<R: Read>(reader: R, options: &LayerOptions) -> SiteCoverResult<DemandSet> {
    let table = Table::read(reader)?;
    let xy = table.xy()?;
    let id_col = match &options.id_field {
        Some(name) => table.require(name)?,
        None => table
            .column(&["id", DEFAULT_DEMAND_ID_FIELD])
            .ok_or_else(|| ImportError::MissingColumn("id".into()))?,
    };
    let weight_col = match &options.weight_field {
        Some(name) => Some(table.require(name)?),
        None => table.column(&["weight", DEFAULT_WEIGHT_FIELD]),
    };

    let units = table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let row = idx + 1;
            let mut unit = DemandUnit::new(field(record, id_col, row)?, point(record, xy, row)?);
            if let Some(col) = weight_col {
                unit = unit.with_weight(number(record, col, row, "weight")?);
            }
            Ok(unit)
        })
        .collect::<SiteCoverResult<Vec<_>>>()?;

    Ok(DemandSet::new(layer_crs(options)?, units))
}

pub fn read_candidates<R: Read>(
    reader: R,
    options: &LayerOptions,
) -> SiteCoverResult<CandidateSet> {
    let table = Table::read(reader)?;
    let xy = table.xy()?;
    let label_col = match &options.id_field {
        Some(name) => Some(table.require(name)?),
        None => table.column(&["label"]),
    };

    let entries = table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let row = idx + 1;
            let label = match label_col {
                Some(col) => Some(field(record, col, row)?.to_string()),
                None => None,
            };
            Ok((point(record, xy, row)?, label))
        })
        .collect::<SiteCoverResult<Vec<_>>>()?;

    Ok(CandidateSet::from_labelled(layer_crs(options)?, entries))
}

pub fn read_supply<R: Read>(reader: R, options: &LayerOptions) -> SiteCoverResult<SupplySet> {
    let table = Table::read(reader)?;
    let xy = table.xy()?;
    let points = table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, record)| point(record, xy, idx + 1))
        .collect::<SiteCoverResult<Vec<_>>>()?;
    Ok(SupplySet::new(layer_crs(options)?, points))
}
