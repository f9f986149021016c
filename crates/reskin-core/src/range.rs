//! Version range expressions
//!
//! Supported forms:
//! - `1.0` soft pin (recommended version, anything matches)
//! - `[1.0]` exact pin
//! - `[1.0,2.0)`, `(,1.3)`, `[1.5,)` and other bounded/half-open ranges
//! - `(,1.0],[1.2,)` comma-joined sets of ranges

use std::fmt;

use crate::error::{CoreError, Result};
use crate::version::ArtifactVersion;

/// One contiguous interval of versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restriction {
    pub lower: Option<ArtifactVersion>,
    pub lower_inclusive: bool,
    pub upper: Option<ArtifactVersion>,
    pub upper_inclusive: bool,
}

impl Restriction {
    /// The unbounded restriction
    pub fn everything() -> Self {
        Self {
            lower: None,
            lower_inclusive: false,
            upper: None,
            upper_inclusive: false,
        }
    }

    /// Check if a version falls within this restriction
    pub fn contains(&self, version: &ArtifactVersion) -> bool {
        if let Some(lower) = &self.lower {
            match version.cmp(lower) {
                std::cmp::Ordering::Less => return false,
                std::cmp::Ordering::Equal if !self.lower_inclusive => return false,
                _ => {}
            }
        }
        if let Some(upper) = &self.upper {
            match version.cmp(upper) {
                std::cmp::Ordering::Greater => return false,
                std::cmp::Ordering::Equal if !self.upper_inclusive => return false,
                _ => {}
            }
        }
        true
    }

    /// `[v]` style restriction
    fn is_exact(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Some(lower), Some(upper)) => {
                self.lower_inclusive && self.upper_inclusive && lower == upper
            }
            _ => false,
        }
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_exact()
            && let Some(version) = &self.lower
        {
            return write!(f, "[{}]", version);
        }
        f.write_str(if self.lower_inclusive { "[" } else { "(" })?;
        if let Some(lower) = &self.lower {
            write!(f, "{}", lower)?;
        }
        f.write_str(",")?;
        if let Some(upper) = &self.upper {
            write!(f, "{}", upper)?;
        }
        f.write_str(if self.upper_inclusive { "]" } else { ")" })
    }
}

/// A parsed version range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    recommended: Option<ArtifactVersion>,
    restrictions: Vec<Restriction>,
}

impl VersionRange {
    /// Parse a range expression. Malformed expressions are rejected here,
    /// before anything touches the network or the disk.
    pub fn parse(spec: &str) -> Result<Self> {
        let original = spec;
        let mut rest = spec.trim();
        if rest.is_empty() {
            return Err(CoreError::range(original, "empty version specification"));
        }

        let mut restrictions: Vec<Restriction> = Vec::new();
        let mut upper_bound: Option<ArtifactVersion> = None;

        while rest.starts_with('[') || rest.starts_with('(') {
            let close = rest
                .find([']', ')'])
                .ok_or_else(|| CoreError::range(original, "unbounded range"))?;

            let restriction = parse_restriction(original, &rest[..=close])?;

            if let (Some(previous_upper), Some(lower)) = (&upper_bound, &restriction.lower)
                && lower < previous_upper
            {
                return Err(CoreError::range(original, "ranges overlap"));
            }
            upper_bound = restriction.upper.clone();
            restrictions.push(restriction);

            rest = rest[close + 1..].trim();
            if let Some(stripped) = rest.strip_prefix(',') {
                rest = stripped.trim();
            }
        }

        if !rest.is_empty() {
            if !restrictions.is_empty() {
                return Err(CoreError::range(
                    original,
                    "only fully-qualified sets allowed in multiple set scenario",
                ));
            }
            return Ok(Self {
                recommended: Some(ArtifactVersion::new(rest)),
                restrictions: vec![Restriction::everything()],
            });
        }

        Ok(Self {
            recommended: None,
            restrictions,
        })
    }

    /// The "strictly below `version`" range, `(,version)`
    pub fn below(version: &str) -> Result<Self> {
        Self::parse(&format!("(,{})", version))
    }

    pub fn restrictions(&self) -> &[Restriction] {
        &self.restrictions
    }

    pub fn recommended(&self) -> Option<&ArtifactVersion> {
        self.recommended.as_ref()
    }

    /// The version this range already selects without consulting any
    /// repository: a soft pin `1.0` or an exact pin `[1.0]`.
    pub fn pinned_version(&self) -> Option<&ArtifactVersion> {
        if let Some(recommended) = &self.recommended {
            return Some(recommended);
        }
        match self.restrictions.as_slice() {
            [only] if only.is_exact() => only.lower.as_ref(),
            _ => None,
        }
    }

    /// Check if a version satisfies any restriction of this range
    pub fn contains(&self, version: &ArtifactVersion) -> bool {
        self.restrictions.iter().any(|r| r.contains(version))
    }

    /// Highest version of `versions` that satisfies the range
    pub fn match_version<'a, I>(&self, versions: I) -> Option<&'a ArtifactVersion>
    where
        I: IntoIterator<Item = &'a ArtifactVersion>,
    {
        versions.into_iter().filter(|v| self.contains(v)).max()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(recommended) = &self.recommended {
            return write!(f, "{}", recommended);
        }
        let parts: Vec<String> = self.restrictions.iter().map(|r| r.to_string()).collect();
        f.write_str(&parts.join(","))
    }
}

impl std::str::FromStr for VersionRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_restriction(original: &str, spec: &str) -> Result<Restriction> {
    let lower_inclusive = spec.starts_with('[');
    let upper_inclusive = spec.ends_with(']');
    let inner = spec[1..spec.len() - 1].trim();

    let Some((lower, upper)) = inner.split_once(',') else {
        if !lower_inclusive || !upper_inclusive {
            return Err(CoreError::range(
                original,
                "single version must be surrounded by []",
            ));
        }
        if inner.is_empty() {
            return Err(CoreError::range(original, "empty version in []"));
        }
        let version = ArtifactVersion::new(inner);
        return Ok(Restriction {
            lower: Some(version.clone()),
            lower_inclusive: true,
            upper: Some(version),
            upper_inclusive: true,
        });
    };

    let lower = lower.trim();
    let upper = upper.trim();

    if upper.contains(',') {
        return Err(CoreError::range(original, "too many bounds in range"));
    }
    if !lower.is_empty() && lower == upper {
        return Err(CoreError::range(
            original,
            "range cannot have identical boundaries",
        ));
    }

    let lower_version = (!lower.is_empty()).then(|| ArtifactVersion::new(lower));
    let upper_version = (!upper.is_empty()).then(|| ArtifactVersion::new(upper));

    if let (Some(l), Some(u)) = (&lower_version, &upper_version)
        && u < l
    {
        return Err(CoreError::range(original, "range defies version ordering"));
    }

    Ok(Restriction {
        lower: lower_version,
        lower_inclusive,
        upper: upper_version,
        upper_inclusive,
    })
}
