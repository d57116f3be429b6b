use std::{
    fs::{self, File},
    io::{self, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use tictactio_ai::Network;

/// Destination of a training artifact: the named file, or stdout when no
/// path was given.
#[derive(Debug)]
pub(crate) enum Output {
    Stdout,
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub(crate) fn create(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Output::Stdout);
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path: path.to_owned(),
        })
    }

    pub(crate) fn target(&self) -> String {
        match self {
            Output::Stdout => "stdout".to_owned(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    /// Writes the network in its line-oriented export form.
    pub(crate) fn write_network(self, network: &Network) -> anyhow::Result<()> {
        self.write_text("network", &network.to_export_string())
    }

    /// Writes `value` as pretty-printed JSON followed by a newline.
    pub(crate) fn write_json<T>(self, kind: &str, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut text = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize {kind}"))?;
        text.push('\n');
        self.write_text(kind, &text)
    }

    fn write_text(mut self, kind: &str, text: &str) -> anyhow::Result<()> {
        let destination = self.target();
        let written = match &mut self {
            Output::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush())
            }
            Output::File { writer, .. } => {
                writer.write_all(text.as_bytes()).and_then(|()| writer.flush())
            }
        };
        written.with_context(|| format!("Failed to write {kind} to {destination}"))?;
        tracing::debug!(kind, %destination, bytes = text.len(), "artifact written");
        Ok(())
    }
}

/// Reads and parses a JSON file, naming `kind` in every error.
pub(crate) fn read_json_file<T, P>(kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {kind}: {}", path.display()))?;
    let value = serde_json::from_str(&text)
        .with_context(|| format!("Malformed {kind} JSON: {}", path.display()))?;
    tracing::debug!(kind, path = %path.display(), "loaded");
    Ok(value)
}

#[cfg(test)]
mod tests {
    use tictactio_training::TrainerConfig;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tictactio-{name}-{}.json", std::process::id()))
    }

    #[test]
    fn test_json_file_roundtrip() {
        let path = temp_path("config");
        let config = TrainerConfig {
            population_size: 8,
            seed: Some(3),
            ..TrainerConfig::default()
        };
        Output::create(Some(&path))
            .unwrap()
            .write_json("trainer config", &config)
            .unwrap();
        let loaded: TrainerConfig = read_json_file("trainer config", &path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_target_names_destination() {
        assert_eq!(Output::create(None).unwrap().target(), "stdout");
        let path = temp_path("target");
        let output = Output::create(Some(&path)).unwrap();
        assert_eq!(output.target(), path.display().to_string());
        drop(output);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_names_kind() {
        let missing = "/nonexistent/tictactio.json";
        let err = read_json_file::<TrainerConfig, _>("trainer config", missing).unwrap_err();
        assert!(err.to_string().contains("trainer config"), "{err}");
    }

    #[test]
    fn test_malformed_file_names_kind() {
        let path = temp_path("malformed");
        fs::write(&path, "{ population_size: ").unwrap();
        let err = read_json_file::<TrainerConfig, _>("trainer config", &path).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert!(err.to_string().starts_with("Malformed trainer config"), "{err}");
    }
}
