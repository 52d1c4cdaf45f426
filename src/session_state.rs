use rocket::time::OffsetDateTime;

/// A session as the manager sees it: the data payload plus the id and
/// expiry it is (or will be) stored under.
///
/// A fresh session has no id. The manager assigns one the first time the
/// session is saved, and it never changes afterwards.
#[derive(Clone, Debug)]
pub struct SessionState<T> {
    id: Option<String>,
    data: T,
    expiry: Option<OffsetDateTime>,
}

impl<T> SessionState<T> {
    /// Create a session state holding `data`, with no id or expiry assigned
    /// yet. The manager fills in both when the state is saved.
    pub fn new(data: T) -> Self {
        Self {
            id: None,
            data,
            expiry: None,
        }
    }

    /// A state rebuilt from a stored record.
    pub(crate) fn restored(id: String, data: T, expiry: OffsetDateTime) -> Self {
        Self {
            id: Some(id),
            data,
            expiry: Some(expiry),
        }
    }

    /// The session id, or `None` if this session has never been saved.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The session data.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Mutable access to the session data.
    pub fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    /// When this session expires, if an expiry has been assigned.
    pub fn expiry(&self) -> Option<OffsetDateTime> {
        self.expiry
    }

    /// Consume the state, returning the session data.
    pub fn into_data(self) -> T {
        self.data
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    pub(crate) fn set_expiry(&mut self, expiry: OffsetDateTime) {
        self.expiry = Some(expiry);
    }
}

impl<T: Default> Default for SessionState<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
