use crate::domain::SessionId;

/// Which session the detail pane is showing. The viewport size is tracked
/// separately on the model; resizing never touches this.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Navigator {
    #[default]
    NoSelection,
    SessionSelected {
        id: SessionId,
        image: String,
    },
}

impl Navigator {
    pub fn select_session(&mut self, id: SessionId, image: String) {
        *self = Self::SessionSelected { id, image };
    }

    pub fn back(&mut self) {
        *self = Self::NoSelection;
    }

    pub fn selected_id(&self) -> Option<SessionId> {
        match self {
            Self::NoSelection => None,
            Self::SessionSelected { id, .. } => Some(*id),
        }
    }

    /// Image of the selected session, empty when nothing is selected.
    pub fn image(&self) -> &str {
        match self {
            Self::NoSelection => "",
            Self::SessionSelected { image, .. } => image,
        }
    }

    pub fn has_selection(&self) -> bool {
        matches!(self, Self::SessionSelected { .. })
    }
}
