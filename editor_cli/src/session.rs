//! An open document: one editor bound to one provider identifier.
//!
//! Sessions never share state. Two sessions on the same identifier edit
//! independently and whichever saves last overwrites the other.

use crate::provider::{ContentProvider, ProviderError};
use sftpad_core::{Editor, EditorConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("a save is already in progress")]
    InFlight,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// The text handed to the provider by an outstanding save.
#[derive(Debug)]
pub struct PendingSave {
    id: String,
    text: String,
}

/// Clears the in-flight flag when dropped, including when the save future
/// is cancelled before the provider answers.
struct SavingFlag<'a>(&'a mut bool);

impl Drop for SavingFlag<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

pub struct DocumentSession<P> {
    provider: P,
    id: String,
    editor: Editor,
    /// Set between `begin_save` and `finish_save`.
    saving: bool,
}

impl<P: ContentProvider> DocumentSession<P> {
    /// Fetches `id` and opens it in a fresh editor.
    pub async fn open(provider: P, id: &str, config: EditorConfig) -> Result<Self, ProviderError> {
        let text = provider.fetch(id).await?;
        let mut editor = Editor::with_config(config);
        editor.detect_language(id);
        editor.load_content(&text);
        log::info!(
            "opened {id} ({}, {} lines)",
            editor.language().name(),
            editor.buffer().len_lines()
        );
        Ok(Self {
            provider,
            id: id.to_string(),
            editor,
            saving: false,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Re-fetches the document, dropping local edits and history.
    pub async fn reload(&mut self) -> Result<(), ProviderError> {
        let text = self.provider.fetch(&self.id).await?;
        self.editor.load_content(&text);
        Ok(())
    }

    /// Captures the current text for saving. Fails while another save is
    /// outstanding.
    pub fn begin_save(&mut self) -> Result<PendingSave, SaveError> {
        if self.saving {
            return Err(SaveError::InFlight);
        }
        self.saving = true;
        Ok(PendingSave {
            id: self.id.clone(),
            text: self.editor.text(),
        })
    }

    /// Completes a save. On success the saved text becomes the clean
    /// snapshot; edits made meanwhile keep the document modified.
    pub fn finish_save(
        &mut self,
        pending: PendingSave,
        result: Result<(), ProviderError>,
    ) -> Result<(), SaveError> {
        self.saving = false;
        match result {
            Ok(()) => {
                self.editor.mark_saved_as(&pending.text);
                log::info!("saved {}", pending.id);
                Ok(())
            }
            Err(err) => {
                log::error!("failed to save {}: {err}", pending.id);
                Err(err.into())
            }
        }
    }

    /// Saves the current text through the provider.
    pub async fn save(&mut self) -> Result<(), SaveError> {
        let pending = self.begin_save()?;
        let result = {
            let _saving = SavingFlag(&mut self.saving);
            self.provider.save(&pending.id, &pending.text).await
        };
        self.finish_save(pending, result)
    }
}
