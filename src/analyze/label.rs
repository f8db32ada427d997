use std::collections::HashMap;

use tracing::debug;

use crate::analyze::ErrorKind;

/// Maps label names to the 0-based line that declares them.
#[derive(Debug, Default, Clone)]
pub struct LabelTable {
    labels: HashMap<String, usize>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, label: impl Into<String>, line: usize) -> Result<(), ErrorKind> {
        let label = label.into();
        if let Some(&first) = self.labels.get(&label) {
            return Err(ErrorKind::DuplicateLabel(label, first));
        }

        debug!(label = %label, line, "declared label");
        self.labels.insert(label, line);
        Ok(())
    }

    pub fn resolve(&self, label: &str) -> Result<usize, ErrorKind> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| ErrorKind::UnresolvedLabel(label.to_owned()))
    }

    /// Offset from the instruction after `line` to the line declaring `label`.
    ///
    /// The engine adds this to `line + 1`, so the branch lands exactly on the label.
    pub fn branch_offset(&self, line: usize, label: &str) -> Result<i16, ErrorKind> {
        let target = self.resolve(label)? as i64;
        let offset = target - (line as i64 + 1);

        i16::try_from(offset).map_err(|_| ErrorKind::ImmediateOutOfRange(offset))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(labels: &[(&str, usize)]) -> LabelTable {
        let mut table = LabelTable::new();
        for (label, line) in labels {
            table.declare(*label, *line).unwrap();
        }
        table
    }

    #[test]
    fn resolve_is_exact() {
        let table = table(&[("loop", 2), ("end", 7)]);
        assert_eq!(table.resolve("loop"), Ok(2));
        assert_eq!(table.resolve("end"), Ok(7));
        assert_eq!(
            table.resolve("Loop"),
            Err(ErrorKind::UnresolvedLabel(String::from("Loop")))
        );
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn duplicate_declaration_is_rejected() {
        let mut table = table(&[("loop", 2)]);
        assert_eq!(
            table.declare("loop", 5),
            Err(ErrorKind::DuplicateLabel(String::from("loop"), 2))
        );
        assert_eq!(table.resolve("loop"), Ok(2));
    }

    #[test]
    fn backward_branch_is_negative() {
        let table = table(&[("loop", 2)]);
        let offset = table.branch_offset(3, "loop").unwrap();
        assert_eq!(offset, -2);
        assert_eq!(3 + 1 + offset as i64, 2);
    }

    #[test]
    fn forward_branch_is_non_negative() {
        let table = table(&[("next", 4), ("skip", 6)]);

        let next = table.branch_offset(3, "next").unwrap();
        assert_eq!(next, 0);

        let skip = table.branch_offset(3, "skip").unwrap();
        assert_eq!(skip, 2);
        assert_eq!(3 + 1 + skip as i64, 6);
    }

    #[test]
    fn branch_to_self_is_minus_one() {
        let table = table(&[("spin", 0)]);
        assert_eq!(table.branch_offset(0, "spin"), Ok(-1));
    }

    #[test]
    fn offset_must_fit_16_bits() {
        let table = table(&[("far", 40_000)]);
        assert_eq!(
            table.branch_offset(0, "far"),
            Err(ErrorKind::ImmediateOutOfRange(39_999))
        );
    }

    #[test]
    fn unresolved_label_in_branch() {
        let table = LabelTable::new();
        assert!(table.is_empty());
        assert_eq!(
            table.branch_offset(0, "nowhere"),
            Err(ErrorKind::UnresolvedLabel(String::from("nowhere")))
        );
    }
}
