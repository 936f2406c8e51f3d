// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use crate::module::Module;
use crate::{MlpError, MlpResult, Tensor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredTensor {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl StoredTensor {
    fn from_tensor(tensor: &Tensor) -> StoredTensor {
        StoredTensor {
            rows: tensor.dim().0,
            cols: tensor.dim().1,
            data: tensor.iter().copied().collect(),
        }
    }

    fn into_tensor(self) -> MlpResult<Tensor> {
        let expected = self.rows * self.cols;
        if self.data.len() != expected {
            return Err(MlpError::DataLength {
                expected,
                got: self.data.len(),
            });
        }
        Tensor::from_shape_vec((self.rows, self.cols), self.data).map_err(|err| {
            MlpError::Serialization {
                message: err.to_string(),
            }
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ModuleSnapshot {
    parameters: HashMap<String, StoredTensor>,
}

fn to_snapshot<M: Module + ?Sized>(module: &M) -> MlpResult<ModuleSnapshot> {
    let state = module.state_dict()?;
    let mut parameters = HashMap::new();
    for (name, tensor) in state {
        parameters.insert(name, StoredTensor::from_tensor(&tensor));
    }
    Ok(ModuleSnapshot { parameters })
}

fn from_snapshot(snapshot: ModuleSnapshot) -> MlpResult<HashMap<String, Tensor>> {
    let mut state = HashMap::new();
    for (name, tensor) in snapshot.parameters.into_iter() {
        state.insert(name, tensor.into_tensor()?);
    }
    Ok(state)
}

fn io_error(err: std::io::Error) -> MlpError {
    MlpError::Io {
        message: err.to_string(),
    }
}

fn serde_error(err: impl ToString) -> MlpError {
    MlpError::Serialization {
        message: err.to_string(),
    }
}

/// Writes the module's state dict to `path` as pretty-printed JSON.
pub fn save_json<M: Module + ?Sized, P: AsRef<Path>>(module: &M, path: P) -> MlpResult<()> {
    let snapshot = to_snapshot(module)?;
    let file = File::create(path.as_ref()).map_err(io_error)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &snapshot).map_err(serde_error)?;
    Ok(())
}

/// Restores a module's parameters from a JSON snapshot produced by
/// [`save_json`].
pub fn load_json<M: Module + ?Sized, P: AsRef<Path>>(module: &mut M, path: P) -> MlpResult<()> {
    let file = File::open(path.as_ref()).map_err(io_error)?;
    let reader = BufReader::new(file);
    let snapshot: ModuleSnapshot = serde_json::from_reader(reader).map_err(serde_error)?;
    let state = from_snapshot(snapshot)?;
    module.load_state_dict(&state)
}
