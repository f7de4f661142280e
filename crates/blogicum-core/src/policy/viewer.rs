use uuid::Uuid;

/// The identity behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    User(Uuid),
}

impl Viewer {
    pub fn id(&self) -> Option<Uuid> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(id) => Some(*id),
        }
    }

    /// True if this viewer is the given user.
    pub fn is(&self, user_id: Uuid) -> bool {
        self.id() == Some(user_id)
    }
}

impl From<Option<Uuid>> for Viewer {
    fn from(id: Option<Uuid>) -> Self {
        id.map_or(Viewer::Anonymous, Viewer::User)
    }
}
