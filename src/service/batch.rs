//! Scoped batching over a document service.

use std::ops::{Deref, DerefMut};

use super::DocumentService;
use crate::error::Result;

/// Exclusive batching context over a [`DocumentService`].
///
/// Operations are staged through the batch (it dereferences to the
/// service) and made effective with [`sync`](Batch::sync). Anything still
/// staged when the batch goes out of scope is committed on drop, so an early
/// return through `?` never leaves work queued on the host.
pub struct Batch<'a, S: DocumentService + ?Sized> {
    service: &'a mut S,
}

impl<'a, S: DocumentService + ?Sized> Batch<'a, S> {
    /// Open a batch over the service.
    pub fn new(service: &'a mut S) -> Self {
        Self { service }
    }

    /// Commit everything staged so far.
    pub fn sync(&mut self) -> Result<()> {
        self.service.commit()
    }

    /// Commit remaining work and close the batch.
    pub fn finish(mut self) -> Result<()> {
        self.sync()
    }
}

impl<S: DocumentService + ?Sized> Deref for Batch<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.service
    }
}

impl<S: DocumentService + ?Sized> DerefMut for Batch<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.service
    }
}

impl<S: DocumentService + ?Sized> Drop for Batch<'_, S> {
    fn drop(&mut self) {
        if self.service.has_pending() {
            if let Err(e) = self.service.commit() {
                log::warn!("Failed to flush staged document operations: {}", e);
            }
        }
    }
}

/// Run `f` inside a batch and commit afterwards.
///
/// Staged work is flushed on every exit path. When `f` fails its error is
/// returned after the flush; a flush failure on that path is only logged.
///
/// # Example
///
/// ```
/// use wordlens::service::{run, DocumentService, MemoryDocument};
///
/// let mut doc = MemoryDocument::from_texts(["Hello world"]);
/// let paragraphs = run(&mut doc, |batch| {
///     let paragraphs = batch.paragraphs();
///     batch.sync()?;
///     paragraphs.value()
/// })?;
/// assert_eq!(paragraphs.len(), 1);
/// # Ok::<(), wordlens::Error>(())
/// ```
pub fn run<S, T, F>(service: &mut S, f: F) -> Result<T>
where
    S: DocumentService + ?Sized,
    F: FnOnce(&mut Batch<'_, S>) -> Result<T>,
{
    let mut batch = Batch::new(service);
    let value = f(&mut batch)?;
    batch.finish()?;
    Ok(value)
}
