//! Normalization of many images at once.
//!
//! Inputs are independent, so they are normalized in parallel with
//! [rayon](https://docs.rs/rayon). Each image still goes through the
//! pipeline stages strictly in order. Results come back in input order, one
//! per input, and a failure in one image never affects the others.
//!
//! Progress is reported as [`BatchEvent`]s over an optional channel so the
//! CLI can print while workers are still running.

use crate::imaging::{
    Constraints, ImageBackend, ImageBlob, NormalizeError, Normalized, create_thumbnail, normalize,
};
use log::{debug, warn};
use rayon::prelude::*;
use std::sync::mpsc::Sender;

/// One image to normalize. `name` is only used for reporting.
#[derive(Debug, Clone)]
pub struct BatchInput {
    pub name: String,
    pub blob: ImageBlob,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Also produce a thumbnail from each normalized image.
    pub thumbnails: bool,
}

/// A successfully normalized input.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub name: String,
    pub normalized: Normalized,
    pub thumbnail: Option<ImageBlob>,
}

/// Progress events sent while a batch runs.
///
/// `index` is the input's position, so events arriving out of order can
/// still be matched to their input.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        index: usize,
        name: String,
        byte_size: u64,
    },
    Finished {
        index: usize,
        name: String,
        width: u32,
        height: u32,
        byte_size: u64,
        reencoded: bool,
    },
    Failed {
        index: usize,
        name: String,
        error: String,
    },
}

/// Normalize every input, returning one result per input in input order.
pub fn normalize_all(
    backend: &impl ImageBackend,
    inputs: &[BatchInput],
    constraints: &Constraints,
    options: BatchOptions,
    events: Option<Sender<BatchEvent>>,
) -> Vec<Result<BatchItem, NormalizeError>> {
    debug!("normalize_all: {} inputs, {options:?}", inputs.len());

    inputs
        .par_iter()
        .enumerate()
        .map_with(events, |events, (index, input)| {
            let send = |event: BatchEvent| {
                if let Some(tx) = events.as_ref() {
                    // The receiver hanging up only means nobody is listening.
                    let _ = tx.send(event);
                }
            };

            send(BatchEvent::Started {
                index,
                name: input.name.clone(),
                byte_size: input.blob.byte_size(),
            });

            let result = normalize_one(backend, input, constraints, options);

            match &result {
                Ok(item) => send(BatchEvent::Finished {
                    index,
                    name: input.name.clone(),
                    width: item.normalized.dimensions.width,
                    height: item.normalized.dimensions.height,
                    byte_size: item.normalized.blob.byte_size(),
                    reencoded: !item.normalized.untouched(),
                }),
                Err(e) => {
                    warn!("{}: {e}", input.name);
                    send(BatchEvent::Failed {
                        index,
                        name: input.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
            result
        })
        .collect()
}

fn normalize_one(
    backend: &impl ImageBackend,
    input: &BatchInput,
    constraints: &Constraints,
    options: BatchOptions,
) -> Result<BatchItem, NormalizeError> {
    let normalized = normalize(backend, &input.blob, constraints)?;
    let thumbnail = if options.thumbnails {
        Some(create_thumbnail(backend, &normalized.blob, constraints)?)
    } else {
        None
    };
    Ok(BatchItem {
        name: input.name.clone(),
        normalized,
        thumbnail,
    })
}
