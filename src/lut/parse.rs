use crate::foundation::error::{StoryError, StoryResult};

/// Largest accepted `LUT_3D_SIZE`.
pub const MAX_LUT_SIZE: usize = 256;

/// How an entry-count mismatch is treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LutStrictness {
    /// Log, then truncate or zero-pad to `N³` entries.
    #[default]
    Lenient,
    /// Reject the file.
    Strict,
}

/// A non-fatal problem found while parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LutWarning {
    /// The number of data triples differed from `N³`.
    EntryCountMismatch {
        /// Triples required by the declared size.
        expected: usize,
        /// Triples found in the file.
        actual: usize,
    },
    /// A data line did not hold three floats and was skipped.
    MalformedLine {
        /// 1-based line number.
        line: usize,
    },
}

/// A parsed 3D LUT, flattened red-fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedLut {
    /// Optional `TITLE` string.
    pub title: Option<String>,
    /// Grid size `N`.
    pub size: usize,
    /// `DOMAIN_MIN` (defaults to zero).
    pub domain_min: [f32; 3],
    /// `DOMAIN_MAX` (defaults to one).
    pub domain_max: [f32; 3],
    /// `N³ * 3` floats; entry `r + g*N + b*N²` holds one RGB triple.
    pub table: Vec<f32>,
    /// Soft failures encountered while parsing.
    pub warnings: Vec<LutWarning>,
}

impl ParsedLut {
    /// RGB triple at grid coordinate `(r, g, b)`.
    pub fn entry(&self, r: usize, g: usize, b: usize) -> [f32; 3] {
        let n = self.size;
        let i = (r + g * n + b * n * n) * 3;
        [self.table[i], self.table[i + 1], self.table[i + 2]]
    }

    /// Number of RGB entries (`N³`).
    pub fn entry_count(&self) -> usize {
        self.size * self.size * self.size
    }
}

/// Parse `.cube` text with lenient entry-count handling.
pub fn parse_cube(text: &str) -> StoryResult<ParsedLut> {
    parse_cube_with(text, LutStrictness::Lenient)
}

/// Parse `.cube` text.
///
/// Directives are case-sensitive. `#` lines and blank lines are skipped, unknown keyword lines
/// are ignored, and everything else is read as an RGB triple in file order.
#[tracing::instrument(skip(text), fields(bytes = text.len()))]
pub fn parse_cube_with(text: &str, strictness: LutStrictness) -> StoryResult<ParsedLut> {
    let mut title = None;
    let mut size: Option<usize> = None;
    let mut domain_min = [0.0f32; 3];
    let mut domain_max = [1.0f32; 3];
    let mut table = Vec::<f32>::new();
    let mut warnings = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("TITLE") {
            title = Some(rest.trim().trim_matches('"').to_owned());
            continue;
        }
        if let Some(rest) = line.strip_prefix("LUT_3D_SIZE") {
            let n = rest.trim().parse::<usize>().map_err(|_| {
                StoryError::lut(format!("line {line_no}: invalid LUT_3D_SIZE '{}'", rest.trim()))
            })?;
            if !(2..=MAX_LUT_SIZE).contains(&n) {
                return Err(StoryError::lut(format!(
                    "line {line_no}: LUT_3D_SIZE {n} outside 2..={MAX_LUT_SIZE}"
                )));
            }
            size = Some(n);
            continue;
        }
        if let Some(rest) = line.strip_prefix("DOMAIN_MIN") {
            domain_min = parse_triple(rest)
                .ok_or_else(|| StoryError::lut(format!("line {line_no}: invalid DOMAIN_MIN")))?;
            continue;
        }
        if let Some(rest) = line.strip_prefix("DOMAIN_MAX") {
            domain_max = parse_triple(rest)
                .ok_or_else(|| StoryError::lut(format!("line {line_no}: invalid DOMAIN_MAX")))?;
            continue;
        }
        if line.starts_with(|c: char| c.is_ascii_alphabetic()) {
            // Other directives (LUT_1D_SIZE, LUT_3D_INPUT_RANGE, vendor keys) are not used.
            continue;
        }

        match parse_triple(line) {
            Some(rgb) => table.extend_from_slice(&rgb),
            None => {
                tracing::warn!(line = line_no, "skipping malformed lut data line");
                warnings.push(LutWarning::MalformedLine { line: line_no });
            }
        }
    }

    let size = size.ok_or_else(|| StoryError::lut("missing LUT_3D_SIZE directive"))?;
    let expected = size * size * size;
    let actual = table.len() / 3;
    if actual != expected {
        if strictness == LutStrictness::Strict {
            return Err(StoryError::lut(format!(
                "LUT_3D_SIZE {size} expects {expected} entries, found {actual}"
            )));
        }
        tracing::warn!(
            size,
            expected,
            actual,
            "lut entry count mismatch; truncating or zero-padding"
        );
        warnings.push(LutWarning::EntryCountMismatch { expected, actual });
        table.resize(expected * 3, 0.0);
    }

    Ok(ParsedLut {
        title,
        size,
        domain_min,
        domain_max,
        table,
        warnings,
    })
}

fn parse_triple(s: &str) -> Option<[f32; 3]> {
    let mut it = s.split_whitespace();
    let r = it.next()?.parse::<f32>().ok()?;
    let g = it.next()?.parse::<f32>().ok()?;
    let b = it.next()?.parse::<f32>().ok()?;
    if it.next().is_some() || !(r.is_finite() && g.is_finite() && b.is_finite()) {
        return None;
    }
    Some([r, g, b])
}

#[cfg(test)]
#[path = "../../tests/unit/lut/parse.rs"]
mod tests;
