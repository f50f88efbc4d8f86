use std::fmt;

use crate::error::{Error, Result};

/// The number of tokens at the start of an atoms header that do not name a column
/// (`ITEM:` and `ATOMS`).
const MARKER_TOKENS: usize = 2;

/// A per-atom quantity we need from every atom line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    PosX,
    PosY,
    PosZ,
    VelX,
    VelY,
    VelZ,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::PosX,
        Field::PosY,
        Field::PosZ,
        Field::VelX,
        Field::VelY,
        Field::VelZ,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The lammps column name for this field.
    pub const fn canonical(self) -> &'static str {
        match self {
            Field::PosX => "xu",
            Field::PosY => "yu",
            Field::PosZ => "zu",
            Field::VelX => "vx",
            Field::VelY => "vy",
            Field::VelZ => "vz",
        }
    }

    /// Column names that are accepted for this field, most preferred first.
    ///
    /// Wrapped coordinates are accepted as a fallback. Since every position is shifted by the box
    /// minimum anyway, they end up in the same frame as the unwrapped ones.
    pub const fn synonyms(self) -> &'static [&'static str] {
        match self {
            Field::PosX => &["xu", "x"],
            Field::PosY => &["yu", "y"],
            Field::PosZ => &["zu", "z"],
            Field::VelX => &["vx"],
            Field::VelY => &["vy"],
            Field::VelZ => &["vz"],
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical())
    }
}

/// How header tokens are matched against the [`Field`]s.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// A token must equal one of the field's [synonyms](Field::synonyms).
    ///
    /// The most preferred synonym that is present wins. If it is present more than once, the
    /// header is ambiguous and rejected.
    #[default]
    Exact,
    /// A token binds a field if its first two characters equal those of the field's canonical
    /// name. When several tokens match, the last one wins.
    Prefix,
}

/// The column index of each [`Field`] within an atom line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSchema {
    columns: [usize; 6],
}

impl ColumnSchema {
    /// Resolve the schema from an atoms header line, such as `ITEM: ATOMS id type xu yu zu vx vy vz`.
    ///
    /// Column indices are counted from the first token after the marker, which makes them
    /// directly usable as indices into the atom lines that follow.
    pub fn from_header(line: &str, policy: MatchPolicy) -> Result<Self> {
        let names: Vec<&str> = line.split_whitespace().skip(MARKER_TOKENS).collect();
        Self::from_names(&names, policy)
    }

    /// Resolve the schema from the column names alone.
    pub fn from_names(names: &[&str], policy: MatchPolicy) -> Result<Self> {
        let mut columns = [0; 6];
        for field in Field::ALL {
            let column = match policy {
                MatchPolicy::Exact => bind_exact(field, names)?,
                MatchPolicy::Prefix => bind_prefix(field, names),
            };
            columns[field.index()] = column.ok_or(Error::MissingColumn(field))?;
        }

        log::debug!("column indices found:");
        for field in Field::ALL {
            log::debug!("{field} {}", columns[field.index()]);
        }

        Ok(Self { columns })
    }

    pub fn column(&self, field: Field) -> usize {
        self.columns[field.index()]
    }

    /// The minimum number of tokens an atom line must have.
    pub fn width(&self) -> usize {
        self.columns.iter().max().copied().unwrap_or_default() + 1
    }

    /// Read the value of every [`Field`] from an atom line.
    ///
    /// Returns a description of the problem if the line is too short or a value is not a number.
    pub fn extract(&self, line: &str) -> std::result::Result<[f32; 6], String> {
        let width = self.width();
        let mut values = [0.0; 6];
        let mut ntokens = 0;
        for (column, token) in line.split_whitespace().take(width).enumerate() {
            ntokens += 1;
            for field in Field::ALL {
                if self.columns[field.index()] != column {
                    continue;
                }
                values[field.index()] = token
                    .parse()
                    .map_err(|_| format!("could not read '{token}' as a number for {field}"))?;
            }
        }

        if ntokens < width {
            return Err(format!(
                "atom line has {ntokens} columns, but at least {width} are needed"
            ));
        }

        Ok(values)
    }
}

fn bind_exact(field: Field, names: &[&str]) -> Result<Option<usize>> {
    for &synonym in field.synonyms() {
        let mut hits = names
            .iter()
            .enumerate()
            .filter(|(_, name)| **name == synonym)
            .map(|(column, _)| column);
        if let Some(column) = hits.next() {
            if hits.next().is_some() {
                return Err(Error::AmbiguousColumn {
                    field,
                    name: synonym.to_string(),
                });
            }
            return Ok(Some(column));
        }
    }
    Ok(None)
}

fn bind_prefix(field: Field, names: &[&str]) -> Option<usize> {
    let prefix = &field.canonical().as_bytes()[..2];
    names
        .iter()
        .rposition(|name| name.as_bytes().get(..2) == Some(prefix))
}
