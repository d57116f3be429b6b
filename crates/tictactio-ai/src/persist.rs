use std::{
    fmt::Write as _,
    fs, io,
    path::{Path, PathBuf},
};

use crate::{Layer, Network, Neuron};

/// Number of lines in an exported network: one per neuron.
pub const EXPORT_LINE_COUNT: usize = 10 + 9 + 9;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum NetworkFileError {
    #[display("failed to access network file {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("corrupt network file: {reason}")]
    CorruptFile {
        #[error(not(source))]
        reason: String,
    },
}

fn corrupt(reason: impl Into<String>) -> NetworkFileError {
    NetworkFileError::CorruptFile {
        reason: reason.into(),
    }
}

impl Network {
    /// Serializes every neuron as `<layer>;<bias>;<w1>,<w2>,...`, one per line,
    /// input layer first.
    ///
    /// Floats use the shortest representation that parses back to the same
    /// value, so [`Network::parse_export`] reproduces the network exactly.
    #[must_use]
    pub fn to_export_string(&self) -> String {
        let mut out = String::new();
        for neuron in self.neurons() {
            write!(out, "{};{};", neuron.layer(), neuron.bias()).unwrap();
            for (i, weight) in neuron.weights().iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write!(out, "{weight}").unwrap();
            }
            out.push('\n');
        }
        out
    }

    /// Parses the output of [`Network::to_export_string`].
    ///
    /// Lines wrapped in `<...>` are accepted as well. Fitness starts at zero.
    pub fn parse_export(text: &str) -> Result<Self, NetworkFileError> {
        let lines = text
            .lines()
            .map(str::trim)
            .enumerate()
            .filter(|(_, line)| !line.is_empty())
            .collect::<Vec<_>>();
        if lines.len() != EXPORT_LINE_COUNT {
            return Err(corrupt(format!(
                "expected {EXPORT_LINE_COUNT} neuron lines, found {}",
                lines.len()
            )));
        }

        let mut layers: [Vec<Neuron>; 3] = Default::default();
        for (line_index, line) in lines {
            let neuron = parse_neuron(line)
                .map_err(|reason| corrupt(format!("line {}: {reason}", line_index + 1)))?;
            layers[neuron.layer().index()].push(neuron);
        }
        Network::from_layers(layers).map_err(|e| corrupt(e.to_string()))
    }

    pub fn export<P>(&self, path: P) -> Result<(), NetworkFileError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        fs::write(path, self.to_export_string()).map_err(|source| NetworkFileError::Io {
            path: path.to_owned(),
            source,
        })
    }

    pub fn load<P>(path: P) -> Result<Self, NetworkFileError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| NetworkFileError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::parse_export(&text)
    }
}

fn parse_finite(value: &str) -> Result<f32, String> {
    let value = value.trim().parse::<f32>().map_err(|e| e.to_string())?;
    if !value.is_finite() {
        return Err("not a finite number".to_owned());
    }
    Ok(value)
}

fn parse_neuron(line: &str) -> Result<Neuron, String> {
    let line = line
        .strip_prefix('<')
        .and_then(|l| l.strip_suffix('>'))
        .unwrap_or(line);
    let mut fields = line.split(';');
    let (Some(tag), Some(bias), Some(weights), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err("expected `<layer>;<bias>;<weights>`".to_owned());
    };

    let layer = tag
        .trim()
        .parse::<Layer>()
        .map_err(|_| format!("unknown layer tag {tag:?}"))?;
    let bias = parse_finite(bias).map_err(|e| format!("invalid bias {bias:?}: {e}"))?;
    let weights = weights
        .split(',')
        .map(|w| parse_finite(w).map_err(|e| format!("invalid weight {w:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    Neuron::new(layer, bias, weights).map_err(|e| format!("{layer} neuron: {e}"))
}
