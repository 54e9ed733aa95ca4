/// Data of one remote read plus its pending and error flags.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub pending: bool,
    pub error: Option<String>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            pending: false,
            error: None,
        }
    }
}

impl<T> QueryState<T> {
    /// Nothing to show yet and a request is out.
    pub fn is_loading(&self) -> bool {
        self.pending && self.data.is_none()
    }

    pub fn start(&mut self) {
        self.pending = true;
    }

    pub fn succeed(&mut self, data: T) {
        self.data = Some(data);
        self.pending = false;
        self.error = None;
    }

    /// Keeps the last good data around.
    pub fn fail(&mut self, error: String) {
        self.pending = false;
        self.error = Some(error);
    }
}
