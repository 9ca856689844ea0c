use crate::error::PageError;

/// What the harvest loop does after a page fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move on to the next page
    Skip,
    /// Move on to the next page with a fresh session
    Restart,
    /// Stop the current category
    Abort,
}

/// Decide how a page failure is handled
pub fn classify_and_handle(error: &PageError) -> Action {
    match error {
        PageError::ElementNotFound(_)
        | PageError::PageLoadTimeout { .. }
        | PageError::Unclassified(_) => Action::Skip,
        PageError::RendererFault(_) | PageError::Session(_) => Action::Restart,
        PageError::Sink(_) => Action::Abort,
    }
}
