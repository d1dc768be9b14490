//! One search session: the image currently being prepared and its region.
//!
//! Normalization may finish after the user has already picked another image.
//! Every pipeline run is tagged with a [`RunId`] from [`Session::begin_run`];
//! starting a run supersedes the previous one, and results carrying a stale
//! id are dropped by [`Session::accept`]. The id counter belongs to the
//! session, not to the process.

use crate::region::{Region, RegionEditor, Size};
use log::warn;

/// Identifies one pipeline run within a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(u64);

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct Session {
    next_id: u64,
    current: Option<RunId>,
    editor: Option<RegionEditor>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run. The previous run (and its region) is superseded.
    pub fn begin_run(&mut self) -> RunId {
        self.next_id += 1;
        let id = RunId(self.next_id);
        self.current = Some(id);
        self.editor = None;
        id
    }

    pub fn current_run(&self) -> Option<RunId> {
        self.current
    }

    pub fn is_current(&self, id: RunId) -> bool {
        self.current == Some(id)
    }

    /// Pass `result` through if `id` is still the current run, drop it otherwise.
    pub fn accept<T>(&self, id: RunId, result: T) -> Option<T> {
        if self.is_current(id) {
            Some(result)
        } else {
            warn!(
                "discarding result of {id}, current is {}",
                self.current
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "none".to_string())
            );
            None
        }
    }

    /// Display the normalized image of run `id` and attach a region editor
    /// to it. Returns `None` for a stale run.
    pub fn show(
        &mut self,
        id: RunId,
        displayed: Size,
        original: Size,
        region: Region,
    ) -> Option<&mut RegionEditor> {
        if !self.is_current(id) {
            warn!("ignoring display of stale {id}");
            return None;
        }
        self.editor = Some(RegionEditor::new(displayed, original, region));
        self.editor.as_mut()
    }

    pub fn editor(&self) -> Option<&RegionEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut RegionEditor> {
        self.editor.as_mut()
    }
}
