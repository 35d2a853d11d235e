use super::UiError;

/// Per-widget request state: `Idle -> Pending -> Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetState {
    #[default]
    Idle,
    Pending,
}

impl WidgetState {
    /// The widget's button accepts no clicks while a request is outstanding
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn shows_spinner(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Enter `Pending`; a widget allows one outstanding request at a time
    pub fn begin(&mut self, widget: &'static str) -> Result<(), UiError> {
        if self.is_disabled() {
            return Err(UiError::Busy { widget });
        }

        *self = Self::Pending;
        Ok(())
    }

    pub fn finish(&mut self) {
        *self = Self::Idle;
    }
}
