//  Copyright (C) 2023 IBM Corp.
//
//  This library is free software; you can redistribute it and/or
//  modify it under the terms of the GNU Lesser General Public
//  License as published by the Free Software Foundation; either
//  version 2.1 of the License, or (at your option) any later version.
//
//  This library is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
//  Lesser General Public License for more details.
//
//  You should have received a copy of the GNU Lesser General Public
//  License along with this library; if not, write to the Free Software
//  Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA  02110-1301
//  USA

//! Column-based rendering shared by list commands.

use std::cmp::Ordering;
use std::str::FromStr;

use prettytable::format::consts::FORMAT_CLEAN;
use prettytable::{Cell, Row, Table};

use crate::error::Error;

pub struct Column<T> {
    pub label: &'static str,
    pub key: &'static str,
    value: fn(&T) -> String,
    style: Option<fn(&str) -> &'static str>,
    numeric: bool,
}

impl<T> Column<T> {
    pub fn new(label: &'static str, key: &'static str, value: fn(&T) -> String) -> Self {
        Self {
            label,
            key,
            value,
            style: None,
            numeric: false,
        }
    }

    /// Pick a prettytable style spec (e.g. `"Fg"`) for each printed value.
    pub fn styled(mut self, style: fn(&str) -> &'static str) -> Self {
        self.style = Some(style);
        self
    }

    /// Sort by numeric value, ignoring thousands separators. Values that are
    /// not numbers sort first, by text.
    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    fn matches(&self, name: &str) -> bool {
        self.key.eq_ignore_ascii_case(name) || self.label.eq_ignore_ascii_case(name)
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        if self.numeric {
            let num = |s: &str| s.replace(',', "").parse::<u64>().ok();
            (num(a), a).cmp(&(num(b), b))
        } else {
            a.cmp(b)
        }
    }

    fn cell(&self, value: &str) -> Cell {
        match self.style {
            Some(style) => Cell::new(value).style_spec(style(value)),
            None => Cell::new(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((column, value)) if !column.is_empty() => Ok(Self {
                column: column.to_string(),
                value: value.to_string(),
            }),
            _ => Err(format!("expected COLUMN=VALUE, got '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub sort_by: Option<String>,
    pub filters: Vec<Filter>,
}

pub struct Listing<T> {
    columns: Vec<Column<T>>,
    default_sort: &'static str,
}

impl<T> Listing<T> {
    pub fn new(columns: Vec<Column<T>>, default_sort: &'static str) -> Self {
        Self {
            columns,
            default_sort,
        }
    }

    fn column_index(&self, name: &str) -> Result<usize, Error> {
        self.columns.iter().position(|c| c.matches(name)).ok_or_else(|| {
            let keys: Vec<_> = self.columns.iter().map(|c| c.key).collect();
            format!("unknown column '{}', expected one of: {}", name, keys.join(", ")).into()
        })
    }

    /// Plain cell values, filtered and sorted.
    pub fn rows(&self, items: &[T], opts: &ListOptions) -> Result<Vec<Vec<String>>, Error> {
        let mut filters = Vec::new();
        for f in &opts.filters {
            filters.push((self.column_index(&f.column)?, f.value.as_str()));
        }

        let sort = self.column_index(opts.sort_by.as_deref().unwrap_or(self.default_sort))?;
        let column = &self.columns[sort];

        let mut rows: Vec<Vec<String>> = items
            .iter()
            .map(|item| self.columns.iter().map(|c| (c.value)(item)).collect())
            .filter(|row: &Vec<String>| filters.iter().all(|(i, v)| row[*i] == *v))
            .collect();

        rows.sort_by(|a, b| column.compare(&a[sort], &b[sort]));

        Ok(rows)
    }

    /// Table with a title row, ready for `printstd`.
    pub fn table(&self, items: &[T], opts: &ListOptions) -> Result<Table, Error> {
        let mut table = Table::new();
        table.set_format(*FORMAT_CLEAN);
        table.set_titles(Row::new(self.columns.iter().map(|c| Cell::new(c.label)).collect()));

        for row in self.rows(items, opts)? {
            table.add_row(Row::new(
                self.columns.iter().zip(&row).map(|(c, v)| c.cell(v)).collect(),
            ));
        }

        Ok(table)
    }
}
