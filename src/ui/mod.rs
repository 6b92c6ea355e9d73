/// Rendering. Every function here reads [`AppState`](crate::state::AppState)
/// and reports interactions by pushing [`UiEvent`]s; none mutate state.
pub mod panels;
pub mod plot;
pub mod report;
pub mod table;

use crate::state::UiEvent;

/// Events collected during one frame, applied after rendering.
pub type Events = Vec<UiEvent>;
