//! Per-run artifact ownership.

use crate::error::Result;
use crate::narrate::AudioArtifact;
use crate::render::VideoArtifact;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};
use uuid::Uuid;

pub const NARRATION_FILE: &str = "narration.mp3";
pub const DECK_FILE: &str = "presentation.pptx";
pub const VIDEO_FILE: &str = "presentation.mp4";

/// Owns one run's scratch directory and everything written into it.
///
/// Every session gets its own uniquely named directory, so concurrent runs
/// never share files. Dropping the session deletes the directory.
#[derive(Debug)]
pub struct RunSession {
    id: Uuid,
    dir: TempDir,
    narration: Option<AudioArtifact>,
    deck: Option<PathBuf>,
    video: Option<VideoArtifact>,
}

impl RunSession {
    /// Create a session directory under `parent`.
    pub fn new(parent: &Path) -> Result<Self> {
        std::fs::create_dir_all(parent)?;
        let id = Uuid::new_v4();
        let dir = tempfile::Builder::new()
            .prefix(&format!("run-{}-", id.simple()))
            .tempdir_in(parent)?;

        debug!("Session {} in {}", id, dir.path().display());

        Ok(Self {
            id,
            dir,
            narration: None,
            deck: None,
            video: None,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Where an artifact with the given file name lives inside the session.
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.path().join(file_name)
    }

    pub fn narration(&self) -> Option<&AudioArtifact> {
        self.narration.as_ref()
    }

    pub fn video(&self) -> Option<&VideoArtifact> {
        self.video.as_ref()
    }

    pub(crate) fn set_narration(&mut self, audio: AudioArtifact) {
        self.narration = Some(audio);
    }

    pub(crate) fn set_deck(&mut self, path: PathBuf) {
        self.deck = Some(path);
    }

    pub(crate) fn set_video(&mut self, video: VideoArtifact) {
        self.video = Some(video);
    }

    /// Finished deliverables as (file name, path), in pipeline order.
    pub fn artifacts(&self) -> Vec<(&'static str, PathBuf)> {
        let mut out = Vec::new();
        if let Some(audio) = &self.narration {
            out.push((NARRATION_FILE, audio.path.clone()));
        }
        if let Some(deck) = &self.deck {
            out.push((DECK_FILE, deck.clone()));
        }
        if let Some(video) = &self.video {
            out.push((VIDEO_FILE, video.path.clone()));
        }
        out
    }

    /// Look up a finished deliverable by its file name.
    pub fn artifact(&self, file_name: &str) -> Option<PathBuf> {
        self.artifacts()
            .into_iter()
            .find(|(name, _)| *name == file_name)
            .map(|(_, path)| path)
    }

    /// Copy the deliverables into `out_dir` under their fixed names.
    pub fn deliver(&self, out_dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(out_dir)?;

        let mut delivered = Vec::new();
        for (name, path) in self.artifacts() {
            let target = out_dir.join(name);
            std::fs::copy(&path, &target)?;
            delivered.push(target);
        }

        info!("Delivered {} files to {}", delivered.len(), out_dir.display());
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_are_isolated_and_cleaned_up() {
        let parent = tempfile::tempdir().unwrap();
        let a = RunSession::new(parent.path()).unwrap();
        let b = RunSession::new(parent.path()).unwrap();

        assert_ne!(a.id(), b.id());
        assert_ne!(a.dir(), b.dir());
        assert_ne!(a.path(DECK_FILE), b.path(DECK_FILE));

        let dir = a.dir().to_path_buf();
        std::fs::write(a.path(DECK_FILE), b"deck").unwrap();
        drop(a);
        assert!(!dir.exists());
        assert!(b.dir().exists());
    }

    #[test]
    fn test_deliver_uses_fixed_names() {
        let parent = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let mut session = RunSession::new(parent.path()).unwrap();

        let audio = session.path(NARRATION_FILE);
        std::fs::write(&audio, b"mp3").unwrap();
        session.set_narration(AudioArtifact { path: audio, bytes: 3 });

        let deck = session.path(DECK_FILE);
        std::fs::write(&deck, b"pptx").unwrap();
        session.set_deck(deck);

        let delivered = session.deliver(out.path()).unwrap();
        assert_eq!(delivered.len(), 2);
        assert!(out.path().join("narration.mp3").exists());
        assert!(out.path().join("presentation.pptx").exists());
        assert!(!out.path().join("presentation.mp4").exists());

        assert!(session.artifact(VIDEO_FILE).is_none());
        assert_eq!(session.artifact(DECK_FILE), Some(session.path(DECK_FILE)));
    }
}
