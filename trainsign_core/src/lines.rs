//! Fixed registry of selectable lines.

use crate::error::SignError;

/// Everything the sign needs to show one line at one station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDescriptor {
    pub id: String,
    pub stop_id: String,
    pub station: String,
    pub north_label: String,
    pub south_label: String,
    pub logo: String,
}

impl LineDescriptor {
    pub fn new(
        id: impl Into<String>,
        stop_id: impl Into<String>,
        station: impl Into<String>,
        north_label: impl Into<String>,
        south_label: impl Into<String>,
        logo: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            stop_id: stop_id.into(),
            station: station.into(),
            north_label: north_label.into(),
            south_label: south_label.into(),
            logo: logo.into(),
        }
    }
}

/// Immutable after construction; validated once at startup.
#[derive(Debug, Clone)]
pub struct LineRegistry {
    lines: Vec<LineDescriptor>,
}

impl LineRegistry {
    pub fn new(lines: Vec<LineDescriptor>) -> Result<Self, SignError> {
        if lines.is_empty() {
            return Err(SignError::Config("line registry is empty".into()));
        }
        for (i, line) in lines.iter().enumerate() {
            if line.id.is_empty() {
                return Err(SignError::Config(format!("line #{i} has an empty id")));
            }
            if line.stop_id.is_empty() {
                return Err(SignError::Config(format!(
                    "line {} has an empty stop id",
                    line.id
                )));
            }
            if lines[..i].iter().any(|other| other.id == line.id) {
                return Err(SignError::Config(format!("duplicate line id {}", line.id)));
            }
        }
        Ok(Self { lines })
    }

    /// The reference sign: L at Graham Av and G at Metro Av.
    pub fn builtin() -> Self {
        Self {
            lines: vec![
                LineDescriptor::new(
                    "L",
                    "L11",
                    "L-Graham Av",
                    "Manhattan",
                    "Canarsie",
                    "l-dashboard.bmp",
                ),
                LineDescriptor::new(
                    "G",
                    "G29",
                    "G-Metro Av",
                    "Queens",
                    "Church Av",
                    "g-dashboard.bmp",
                ),
            ],
        }
    }

    pub fn lookup(&self, line_id: &str) -> Result<&LineDescriptor, SignError> {
        self.lines
            .iter()
            .find(|l| l.id == line_id)
            .ok_or_else(|| SignError::UnknownLine(line_id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineDescriptor> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for LineRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup() {
        let reg = LineRegistry::builtin();
        let l = reg.lookup("L").unwrap();
        assert_eq!(l.stop_id, "L11");
        assert_eq!(l.north_label, "Manhattan");
        let g = reg.lookup("G").unwrap();
        assert_eq!(g.south_label, "Church Av");
        assert_eq!(g.logo, "g-dashboard.bmp");
    }

    #[test]
    fn unknown_line_fails() {
        let reg = LineRegistry::builtin();
        assert_eq!(
            reg.lookup("Q").unwrap_err(),
            SignError::UnknownLine("Q".into())
        );
        // Lookups are case-sensitive.
        assert!(reg.lookup("l").is_err());
    }

    #[test]
    fn supports_more_than_two_lines() {
        let mut lines: Vec<_> = LineRegistry::builtin().iter().cloned().collect();
        lines.push(LineDescriptor::new("J", "M11", "J-Myrtle", "Jamaica", "Broad St", "j.bmp"));
        let reg = LineRegistry::new(lines).unwrap();
        assert_eq!(reg.len(), 3);
        assert_eq!(reg.lookup("J").unwrap().stop_id, "M11");
    }

    #[test]
    fn rejects_bad_registries() {
        assert!(LineRegistry::new(Vec::new()).is_err());
        let dup = vec![
            LineDescriptor::new("L", "L11", "", "N", "S", "l.bmp"),
            LineDescriptor::new("L", "L12", "", "N", "S", "l.bmp"),
        ];
        assert!(matches!(LineRegistry::new(dup), Err(SignError::Config(_))));
        let no_stop = vec![LineDescriptor::new("L", "", "", "N", "S", "l.bmp")];
        assert!(LineRegistry::new(no_stop).is_err());
    }
}
