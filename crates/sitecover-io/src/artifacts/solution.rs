//! Solution artifact: one chosen candidate index per row.

use super::ensure_parent;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sitecover_core::CandidateId;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct SolutionRow {
    chosen_candidate_id: usize,
}

pub fn write_solution(path: &Path, chosen: &[CandidateId]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating solution {}", path.display()))?;
    if chosen.is_empty() {
        writer.write_record(["chosen_candidate_id"])?;
    }
    for id in chosen {
        writer.serialize(SolutionRow {
            chosen_candidate_id: id.value(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_solution(path: &Path) -> Result<Vec<CandidateId>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening solution {}", path.display()))?;
    reader
        .deserialize()
        .map(|row| {
            let row: SolutionRow =
                row.with_context(|| format!("parsing solution {}", path.display()))?;
            Ok(CandidateId::new(row.chosen_candidate_id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("solution.csv");
        write_solution(&path, &[CandidateId::new(3), CandidateId::new(17)]).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "chosen_candidate_id\n3\n17\n"
        );
        assert_eq!(
            read_solution(&path).unwrap(),
            vec![CandidateId::new(3), CandidateId::new(17)]
        );
    }

    #[test]
    fn test_empty_solution_keeps_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_solution(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "chosen_candidate_id\n");
        assert!(read_solution(&path).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_non_integer_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "chosen_candidate_id\n-1\n").unwrap();
        assert!(read_solution(&path).is_err());
    }
}
