//! Downloadable automaton artifacts

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::session::Automaton;

pub const DOT_FILE_NAME: &str = "automaton.dot";
pub const MATA_FILE_NAME: &str = "automaton.mata";

/// Paths of the files written by [`export_artifacts`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedArtifacts {
    pub dot: PathBuf,
    pub mata: PathBuf,
}

/// Write the diagram and machine serializations verbatim into `dir`
pub async fn export_artifacts(automaton: &Automaton, dir: &Path) -> Result<ExportedArtifacts> {
    tokio::fs::create_dir_all(dir).await?;

    let dot = dir.join(DOT_FILE_NAME);
    let mata = dir.join(MATA_FILE_NAME);
    tokio::fs::write(&dot, &automaton.dot).await?;
    tokio::fs::write(&mata, &automaton.mata).await?;

    info!(dot = %dot.display(), mata = %mata.display(), "Exported automaton");
    Ok(ExportedArtifacts { dot, mata })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_export_writes_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let automaton = Automaton {
            formula: "x = 1".to_string(),
            dot: "digraph {\n  0 -> 1 [label=\"1\"];\n}\n".to_string(),
            mata: "@NFA-explicit\n%Alphabet-auto\n".to_string(),
            num_states: 2,
            num_final_states: 1,
        };

        let target = dir.path().join("out");
        let written = export_artifacts(&automaton, &target).await.unwrap();

        assert_eq!(written.dot, target.join("automaton.dot"));
        assert_eq!(
            std::fs::read_to_string(&written.dot).unwrap(),
            automaton.dot
        );
        assert_eq!(
            std::fs::read_to_string(&written.mata).unwrap(),
            automaton.mata
        );
    }
}
