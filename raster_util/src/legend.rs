/*
This file is part of the Land Cover Cross Tabulation Tool
Copyright (C) 2023 the Land Cover Cross Tabulation Tool authors

The Land Cover Cross Tabulation Tool is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/
use std::collections::{BTreeMap, HashMap};
use std::fs::read_to_string;
use std::path::Path;

use itertools::Itertools;

use crate::errors::{GeoError, Result};

/// Class code -> human readable name, loaded once from a legend text file.
///
/// Codes are unique; names may repeat when several raw codes alias the
/// same class (the MODIS legends do this a lot).
#[derive(Debug, Clone)]
pub struct ClassLegend {
    codes: BTreeMap<u16, String>,
}

impl ClassLegend {
    /// Parses the line oriented `"<code>. <name>"` legend format.
    /// A line without the `". "` separator, a non-integer code or a
    /// duplicated code is a fatal parse error.
    pub fn parse(text: &str) -> Result<ClassLegend> {
        let mut codes = BTreeMap::new();

        for (line_idx, line) in text.lines().enumerate() {
            let line_no = line_idx + 1;

            if line.trim().is_empty() {
                continue;
            }

            let (code, name) = line.split_once(". ").ok_or_else(|| GeoError::Parse {
                line: line_no,
                message: format!("missing '. ' separator in {:?}", line),
            })?;

            let code: u16 = code.trim().parse().map_err(|_| GeoError::Parse {
                line: line_no,
                message: format!("class code {:?} is not an integer", code),
            })?;

            if codes.insert(code, name.trim().to_string()).is_some() {
                return Err(GeoError::Parse {
                    line: line_no,
                    message: format!("class code {} appears twice", code),
                });
            }
        }

        Ok(ClassLegend { codes })
    }

    pub fn from_file(path: &Path) -> Result<ClassLegend> {
        Self::parse(&read_to_string(path)?)
    }

    pub fn name_of(&self, code: u16) -> Option<&str> {
        self.codes.get(&code).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Collapses aliased class codes onto one canonical code per class name.
///
/// For each name in `canonical_names`, the codes present in `data` whose
/// legend entry equals that name form a group, ordered by first
/// appearance in the scan; every pixel holding a non-first code of a
/// group is rewritten to the group's first seen code.
///
/// Pure: returns a new buffer. Code 0 is background and never touched.
/// Codes whose name is absent from `canonical_names` pass through
/// unchanged (observed source policy, not an error). Idempotent.
pub fn canonicalize_classes(
    data: &[u16],
    legend: &ClassLegend,
    canonical_names: &[String],
) -> Vec<u16> {
    // distinct nonzero codes, in first seen scan order
    let present: Vec<u16> = data.iter().copied().filter(|&c| c != 0).unique().collect();

    let mut rewrite: HashMap<u16, u16> = HashMap::new();

    for name in canonical_names {
        let group: Vec<u16> = present
            .iter()
            .copied()
            .filter(|&c| legend.name_of(c) == Some(name.as_str()))
            .collect();

        if let Some((&canonical, aliases)) = group.split_first() {
            for &alias in aliases {
                rewrite.insert(alias, canonical);
            }
        }
    }

    data.iter()
        .map(|code| *rewrite.get(code).unwrap_or(code))
        .collect()
}
